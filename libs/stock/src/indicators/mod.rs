pub mod rsi;

pub use rsi::{RSI_PERIOD, compute_rsi};
