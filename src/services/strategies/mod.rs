pub mod common;
pub use common::{Candle, Side, Signal};
pub mod confluence;
pub mod spike;
pub mod timeframe;

pub use spike::{detect_spike, SpikeReport};
