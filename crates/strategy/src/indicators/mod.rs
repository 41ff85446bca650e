//! Pure indicator functions over close/volume series (oldest first).
//!
//! Every indicator returns `None` when the input is too short to produce its
//! latest value; callers gate on `CandleStore::has_min_history` first.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod volume;

pub use bollinger::{BollingerBands, BollingerIndicator};
pub use ema::ema;
pub use macd::MacdIndicator;
pub use rsi::RsiIndicator;
pub use volume::VolumeRatio;
