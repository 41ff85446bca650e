pub mod binance;
pub mod cooldown;
pub mod lifecycle;

pub use binance::BinanceClient;
pub use cooldown::CooldownMap;
pub use lifecycle::{Engine, EngineHandle};
