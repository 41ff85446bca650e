use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use common::{Candle, EngineCommand, EngineState, MarketDataSource, Result, Signal};
use strategy::{SignalFileConfig, SignalPipeline};

use crate::cooldown::CooldownMap;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Cloneable handle passed to other crates (Telegram, API).
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    state: Arc<RwLock<EngineState>>,
}

impl EngineHandle {
    pub async fn send(&self, cmd: EngineCommand) {
        let _ = self.command_tx.send(cmd).await;
    }

    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    /// Shared state cell, for components that only read it.
    pub fn state_handle(&self) -> Arc<RwLock<EngineState>> {
        self.state.clone()
    }

    pub fn command_sender(&self) -> mpsc::Sender<EngineCommand> {
        self.command_tx.clone()
    }
}

/// The dispatch loop: polls market data on a fixed cadence, runs the signal
/// pipeline per pair and forwards qualifying signals.
pub struct Engine {
    cfg: SignalFileConfig,
    source: Arc<dyn MarketDataSource>,
    pipeline: SignalPipeline,
    cooldown: CooldownMap,
    signal_tx: mpsc::Sender<Signal>,
    state: Arc<RwLock<EngineState>>,
    command_rx: mpsc::Receiver<EngineCommand>,
    #[allow(dead_code)] // kept to prevent channel close
    command_tx: mpsc::Sender<EngineCommand>,
}

impl Engine {
    pub fn new(
        cfg: SignalFileConfig,
        source: Arc<dyn MarketDataSource>,
        signal_tx: mpsc::Sender<Signal>,
    ) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let state = Arc::new(RwLock::new(EngineState::Stopped));

        let handle = EngineHandle {
            command_tx: command_tx.clone(),
            state: state.clone(),
        };

        let engine = Engine {
            pipeline: SignalPipeline::new(&cfg),
            cooldown: CooldownMap::new(
                Duration::from_secs(cfg.cooldown_secs),
                cfg.cooldown_max_entries,
            ),
            cfg,
            source,
            signal_tx,
            state,
            command_rx,
            command_tx,
        };

        (engine, handle)
    }

    /// Run the engine: scan immediately, then every poll interval, while
    /// handling commands. Returns when the signal channel closes.
    /// Call from `tokio::spawn`.
    pub async fn run(mut self) {
        *self.state.write().await = EngineState::Running;
        info!(
            pairs = ?self.cfg.pairs,
            interval = %self.cfg.interval,
            every_secs = self.cfg.poll_interval_secs,
            "Engine running"
        );

        let mut ticker = tokio::time::interval(Duration::from_secs(self.cfg.poll_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *self.state.read().await != EngineState::Running {
                        debug!("Engine paused, skipping scan");
                        continue;
                    }
                    if !self.scan().await {
                        break;
                    }
                }

                cmd = self.command_rx.recv() => match cmd {
                    Some(EngineCommand::Pause) => {
                        let mut state = self.state.write().await;
                        if *state == EngineState::Running {
                            info!("Engine paused, scans suppressed");
                            *state = EngineState::Paused;
                        }
                    }
                    Some(EngineCommand::Resume) => {
                        let mut state = self.state.write().await;
                        if *state == EngineState::Paused {
                            info!("Engine resumed");
                            *state = EngineState::Running;
                        }
                    }
                    Some(EngineCommand::ScanNow) => {
                        info!("Manual scan requested");
                        if !self.scan().await {
                            break;
                        }
                    }
                    None => {
                        warn!("Engine command channel closed, shutting down");
                        break;
                    }
                },
            }
        }

        *self.state.write().await = EngineState::Stopped;
        info!("Engine stopped");
    }

    /// Analyse every configured pair once. Returns `false` if the signal
    /// channel has closed and the engine should stop.
    pub async fn scan(&mut self) -> bool {
        let pairs = self.cfg.pairs.clone();
        let delay = Duration::from_millis(self.cfg.pair_delay_ms);
        let mut sent = 0usize;

        for (i, pair) in pairs.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let signal = match self.analyze_pair(pair).await {
                Ok(Some(signal)) => signal,
                Ok(None) => continue,
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Pair analysis failed, skipping");
                    continue;
                }
            };

            if !self.should_forward(&signal) {
                continue;
            }

            info!(
                pair = %signal.pair,
                direction = %signal.direction,
                confidence = signal.confidence,
                price = signal.price,
                "Signal generated"
            );
            if self.signal_tx.send(signal).await.is_err() {
                warn!("Signal channel closed, stopping engine");
                return false;
            }
            sent += 1;
        }

        if sent > 0 {
            info!(count = sent, "Signals forwarded");
        }
        true
    }

    /// Refresh one pair's candles and evaluate it.
    async fn analyze_pair(&mut self, pair: &str) -> Result<Option<Signal>> {
        let limit = if self.pipeline.is_warm(pair) {
            self.cfg.refresh_limit
        } else {
            self.cfg.history_capacity
        };

        let candles = self.fetch_with_retry(pair, limit).await?;
        self.pipeline.ingest(pair, &candles)?;

        if !self.pipeline.is_warm(pair) {
            debug!(
                pair,
                have = self.pipeline.store().len(pair),
                "Not enough history yet"
            );
            return Ok(None);
        }
        Ok(self.pipeline.evaluate(pair))
    }

    async fn fetch_with_retry(&self, pair: &str, limit: usize) -> Result<Vec<Candle>> {
        let attempts = self.cfg.fetch_retries.max(1);
        let mut backoff = Duration::from_millis(self.cfg.fetch_backoff_ms);
        let mut attempt = 1;

        loop {
            match self
                .source
                .fetch_candles(pair, &self.cfg.interval, limit)
                .await
            {
                Ok(candles) => return Ok(candles),
                Err(e) if attempt < attempts => {
                    warn!(pair, attempt, error = %e, backoff = ?backoff, "Fetch failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Minimum-confidence gate followed by the cooldown check.
    fn should_forward(&mut self, signal: &Signal) -> bool {
        if signal.confidence < self.cfg.min_confidence {
            debug!(
                pair = %signal.pair,
                confidence = signal.confidence,
                min = self.cfg.min_confidence,
                "Signal below minimum confidence"
            );
            return false;
        }
        if !self
            .cooldown
            .check_and_record(&signal.cooldown_key(), Utc::now())
        {
            debug!(key = %signal.cooldown_key(), "Signal suppressed by cooldown");
            return false;
        }
        true
    }
}
