use serde::{Deserialize, Serialize};

/// Decimal places used when displaying prices.
///
/// Both policies use 2 decimals above 1000 and 3 above 1. `Standard` shows
/// everything at or below 1 with 4 decimals; `Fine` switches to 6 decimals
/// below 0.01 so sub-cent instruments stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricePrecision {
    #[default]
    Standard,
    Fine,
}

impl PricePrecision {
    pub fn decimals(self, price: f64) -> usize {
        if price > 1000.0 {
            2
        } else if price > 1.0 {
            3
        } else if self == PricePrecision::Fine && price < 0.01 {
            6
        } else {
            4
        }
    }
}

/// Render a price for display. Targets are computed unrounded; this is only
/// applied on the way out.
pub fn format_price(price: f64, precision: PricePrecision) -> String {
    format!("{:.*}", precision.decimals(price), price)
}

/// Compact rendering for large quantities such as volume: `1.2M`, `3.4K`.
pub fn format_number(value: f64) -> String {
    if value > 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value > 1000.0 {
        format!("{:.1}K", value / 1000.0)
    } else {
        format!("{value:.0}")
    }
}
