use std::sync::Arc;

use anyhow::Context;
use teloxide::Bot;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, Notifier, Signal};
use engine::{BinanceClient, Engine};
use strategy::SignalFileConfig;
use telegram_ctrl::message::{shutdown_message, startup_message};
use telegram_ctrl::{forward_signals, start_bot, BotDeps, TelegramNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("invalid environment configuration")?;
    let signal_cfg = SignalFileConfig::load_or_default(&cfg.signal_config_path)
        .with_context(|| format!("invalid signal config {}", cfg.signal_config_path))?;
    info!(
        pairs = ?signal_cfg.pairs,
        interval = %signal_cfg.interval,
        port = cfg.port,
        "SignalBot starting"
    );

    // ── Market data + engine ──────────────────────────────────────────────────
    let source = Arc::new(BinanceClient::new().context("failed to build Binance client")?);
    let (signal_tx, signal_rx) = mpsc::channel::<Signal>(128);
    let (engine, engine_handle) = Engine::new(signal_cfg.clone(), source, signal_tx);

    // ── Telegram ──────────────────────────────────────────────────────────────
    let bot = Bot::new(cfg.telegram_token.clone());
    let notifier: Arc<dyn Notifier> =
        Arc::new(TelegramNotifier::new(bot.clone(), cfg.telegram_chat_id));

    let bot_deps = BotDeps {
        command_tx: engine_handle.command_sender(),
        engine_state: engine_handle.state_handle(),
        allowed_user_ids: Arc::new(cfg.telegram_allowed_user_ids.clone()),
        pairs: Arc::new(signal_cfg.pairs.clone()),
        interval: signal_cfg.interval.clone(),
    };

    if let Err(e) = notifier
        .notify(&startup_message(&signal_cfg.pairs, &signal_cfg.interval))
        .await
    {
        warn!(error = %e, "Failed to send startup message");
    }

    // ── Health API ────────────────────────────────────────────────────────────
    let api_state = api::AppState::new(engine_handle.state_handle());
    let port = cfg.port;

    let shutdown = ShutdownSignal::install()?;

    // ── Spawn all tasks ───────────────────────────────────────────────────────
    tokio::spawn(engine.run());
    tokio::spawn(forward_signals(
        notifier.clone(),
        signal_rx,
        signal_cfg.price_precision,
    ));
    tokio::spawn(start_bot(bot, bot_deps));
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "Health server failed");
        }
    });

    info!("All subsystems started. Waiting for shutdown signal.");
    let signal = shutdown.recv().await?;
    info!(signal, "Shutdown signal received");

    if let Err(e) = notifier.notify(&shutdown_message()).await {
        warn!(error = %e, "Failed to send shutdown message");
    }
    Ok(())
}

/// Process shutdown triggers: Ctrl-C everywhere, plus SIGTERM on Unix.
///
/// Handlers are registered in [`install`](Self::install), so a signal that
/// arrives before [`recv`](Self::recv) is awaited is not lost.
struct ShutdownSignal {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    fn install() -> anyhow::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let terminate =
                signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
            Ok(Self { terminate })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Name of the signal that fired.
    #[cfg_attr(not(unix), allow(unused_mut))]
    async fn recv(mut self) -> anyhow::Result<&'static str> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res.context("failed to listen for Ctrl-C")?;
                    Ok("SIGINT")
                }
                _ = self.terminate.recv() => Ok("SIGTERM"),
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            Ok("SIGINT")
        }
    }
}
