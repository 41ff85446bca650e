use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::payloads::SendMessageSetters;
use teloxide::types::ParseMode;
use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{Error, Notifier, Result, Signal};
use strategy::PricePrecision;

use crate::message::render_signal;

/// Sends HTML messages to a single Telegram chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;
        Ok(())
    }
}

/// Render and deliver every signal received on `signal_rx` until the channel
/// closes. Delivery failures are logged and the signal is dropped.
/// Call from `tokio::spawn`.
pub async fn forward_signals(
    notifier: Arc<dyn Notifier>,
    mut signal_rx: mpsc::Receiver<Signal>,
    precision: PricePrecision,
) {
    info!("Signal forwarder running");
    while let Some(signal) = signal_rx.recv().await {
        let text = render_signal(&signal, precision);
        match notifier.notify(&text).await {
            Ok(()) => info!(pair = %signal.pair, direction = %signal.direction, "Signal delivered"),
            Err(e) => warn!(pair = %signal.pair, error = %e, "Failed to deliver signal"),
        }
    }
    warn!("Signal channel closed, forwarder exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::Direction;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Notify("chat not found".into()));
            }
            self.sent.lock().await.push(text.to_string());
            Ok(())
        }
    }

    fn signal(pair: &str) -> Signal {
        Signal {
            pair: pair.into(),
            direction: Direction::Long,
            price: 2.5,
            entry: 2.495,
            take_profit: 2.532,
            stop_loss: 2.47,
            confidence: 75.0,
            bollinger_confirmed: false,
            rsi: 22.0,
            macd: 0.01,
            volume_ratio: 1.8,
            volume: 42_000.0,
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn forwards_each_signal_in_order() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (tx, rx) = mpsc::channel(4);
        tx.send(signal("SOLUSDT")).await.unwrap();
        tx.send(signal("AVAXUSDT")).await.unwrap();
        drop(tx);

        forward_signals(notifier.clone(), rx, PricePrecision::Standard).await;

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("SOL/USDT LONG SIGNAL"));
        assert!(sent[0].contains("$2.495"));
        assert!(sent[1].contains("AVAX/USDT"));
    }

    #[tokio::test]
    async fn delivery_failure_does_not_stop_forwarder() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let (tx, rx) = mpsc::channel(4);
        tx.send(signal("SOLUSDT")).await.unwrap();
        tx.send(signal("ETHUSDT")).await.unwrap();
        drop(tx);

        // Returns once the channel is drained and closed.
        forward_signals(notifier.clone(), rx, PricePrecision::Standard).await;
        assert!(notifier.sent.lock().await.is_empty());
    }
}
