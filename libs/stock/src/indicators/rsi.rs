use ta::Next;
use ta::indicators::SimpleMovingAverage;

pub const RSI_PERIOD: usize = 14;

/// Relative Strength Index of the last close in `closes`.
///
/// Uses simple moving averages of gains and losses over the trailing
/// `period` differences. Returns `None` when fewer than `period + 1` closes
/// are available. A window without losses yields 100.0.
pub fn compute_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut gains = SimpleMovingAverage::new(period).ok()?;
    let mut losses = SimpleMovingAverage::new(period).ok()?;

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    let window = &closes[closes.len() - period - 1..];
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        avg_gain = gains.next(delta.max(0.0));
        avg_loss = losses.next((-delta).max(0.0));
    }

    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return None;
    }

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    Some(round2(rsi))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
