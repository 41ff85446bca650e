//! HTML rendering of outbound Telegram messages.

use common::{Direction, Signal};
use strategy::{format_number, format_price, PricePrecision};

/// Quote assets split off when displaying a pair ("BTCUSDT" → "BTC/USDT").
const QUOTE_ASSETS: [&str; 4] = ["USDT", "USDC", "BUSD", "BTC"];

pub fn display_pair(pair: &str) -> String {
    for quote in QUOTE_ASSETS {
        if let Some(base) = pair.strip_suffix(quote) {
            if !base.is_empty() {
                return format!("{base}/{quote}");
            }
        }
    }
    pair.to_string()
}

/// Render a signal as a Telegram HTML message.
pub fn render_signal(signal: &Signal, precision: PricePrecision) -> String {
    let icon = match signal.direction {
        Direction::Long => "🟢",
        Direction::Short => "🔴",
    };
    let price = |p: f64| format_price(p, precision);
    let bollinger = if signal.bollinger_confirmed {
        "confirmed"
    } else {
        "not confirmed"
    };

    format!(
        "{icon} <b>{pair} {direction} SIGNAL</b> {icon}\n\
         \n\
         🎯 <b>Entry:</b> ${entry}\n\
         ✅ <b>Take Profit:</b> ${tp}\n\
         ❌ <b>Stop Loss:</b> ${sl}\n\
         📊 <b>Current:</b> ${current}\n\
         \n\
         ⚡ <b>Confidence:</b> {confidence:.0}%\n\
         📈 <b>RSI:</b> {rsi:.1}\n\
         📉 <b>MACD:</b> {macd:.4}\n\
         💰 <b>Volume:</b> {volume} ({ratio:.2}x average)\n\
         🎚 <b>Bollinger:</b> {bollinger}\n\
         \n\
         💡 <b>Risk Management:</b>\n\
         - Risk: 1% of capital\n\
         - Stop loss mandatory\n\
         - Take profit at 1:1.5 R:R\n\
         \n\
         <b>Time:</b> {time}",
        pair = display_pair(&signal.pair),
        direction = signal.direction,
        entry = price(signal.entry),
        tp = price(signal.take_profit),
        sl = price(signal.stop_loss),
        current = price(signal.price),
        confidence = signal.confidence,
        rsi = signal.rsi,
        macd = signal.macd,
        volume = format_number(signal.volume),
        ratio = signal.volume_ratio,
        time = signal.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn startup_message(pairs: &[String], interval: &str) -> String {
    let pairs: Vec<String> = pairs.iter().map(|p| display_pair(p)).collect();
    format!(
        "🚀 <b>Trading Signal Bot Started!</b>\n\n\
         Watching {} on {interval} candles. High-probability signals will be sent automatically.",
        pairs.join(", ")
    )
}

pub fn shutdown_message() -> String {
    "🔴 <b>Bot is shutting down for maintenance</b>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn signal(direction: Direction) -> Signal {
        Signal {
            pair: "BTCUSDT".into(),
            direction,
            price: 43_250.5,
            entry: 43_164.0,
            take_profit: 43_811.46,
            stop_loss: 42_732.36,
            confidence: 85.0,
            bollinger_confirmed: true,
            rsi: 28.44,
            macd: 12.5,
            volume_ratio: 2.5,
            volume: 1_234_567.0,
            generated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn pair_display_splits_quote() {
        assert_eq!(display_pair("BTCUSDT"), "BTC/USDT");
        assert_eq!(display_pair("ETHBTC"), "ETH/BTC");
        assert_eq!(display_pair("USDT"), "USDT");
        assert_eq!(display_pair("XYZ"), "XYZ");
    }

    #[test]
    fn long_signal_message() {
        let text = render_signal(&signal(Direction::Long), PricePrecision::Standard);
        assert!(text.starts_with("🟢 <b>BTC/USDT LONG SIGNAL</b> 🟢"));
        assert!(text.contains("<b>Entry:</b> $43164.00"));
        assert!(text.contains("<b>Take Profit:</b> $43811.46"));
        assert!(text.contains("<b>Stop Loss:</b> $42732.36"));
        assert!(text.contains("<b>Current:</b> $43250.50"));
        assert!(text.contains("<b>Confidence:</b> 85%"));
        assert!(text.contains("<b>RSI:</b> 28.4"));
        assert!(text.contains("<b>Volume:</b> 1.2M (2.50x average)"));
        assert!(text.contains("2024-03-01 12:30:00 UTC"));
    }

    #[test]
    fn short_signal_uses_red_icon() {
        let text = render_signal(&signal(Direction::Short), PricePrecision::Standard);
        assert!(text.starts_with("🔴 <b>BTC/USDT SHORT SIGNAL</b> 🔴"));
    }

    #[test]
    fn startup_lists_pairs() {
        let text = startup_message(&["BTCUSDT".into(), "SOLUSDT".into()], "15m");
        assert!(text.contains("BTC/USDT, SOL/USDT"));
        assert!(text.contains("15m"));
    }
}
