pub mod candles;
pub mod config;
pub mod evaluator;
pub mod format;
pub mod indicators;
pub mod pipeline;
pub mod snapshot;

pub use candles::{CandleSeries, CandleStore, UpsertOutcome};
pub use config::{IndicatorConfig, SignalConfig, SignalFileConfig};
pub use evaluator::SignalEvaluator;
pub use format::{format_number, format_price, PricePrecision};
pub use indicators::macd::MacdAlignment;
pub use pipeline::{IngestSummary, SignalPipeline};
pub use snapshot::IndicatorSnapshot;
