//! Scalar technical indicators: RSI, MACD direction signal, and a
//! simulated sentiment sample.
//!
//! RSI follows Wilder's smoothing seeded from the first `period` deltas.
//! The MACD signal is a deliberately simplified direction label computed
//! from simple tail means rather than true exponential averages. Sentiment
//! is a weighted random draw standing in for an external news/social feed;
//! the generator is injected so tests can pin the outcome.

use rand::Rng;

use crate::{validate_prices, AnalysisError, Result};

/// Default RSI lookback window
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Substituted for a zero average loss to keep the RS ratio finite.
const RS_LOSS_FLOOR: f64 = 0.01;

// ============================================================
// SIGNAL TYPES
// ============================================================

/// Direction label derived from the simplified MACD comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MacdSignal {
    Bullish,
    Bearish,
    Neutral,
}

/// Simulated market sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Fixed sampling distribution, biased toward positive sentiment.
const SENTIMENT_WEIGHTS: [(SentimentLabel, f64); 3] = [
    (SentimentLabel::Positive, 0.5),
    (SentimentLabel::Neutral, 0.3),
    (SentimentLabel::Negative, 0.2),
];

impl SentimentLabel {
    /// Draw one label from the fixed weighted distribution.
    ///
    /// Intentionally stochastic: this simulates an external sentiment
    /// source, not a computation over the series.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (label, weight) in SENTIMENT_WEIGHTS {
            cumulative += weight;
            if draw < cumulative {
                return label;
            }
        }
        SentimentLabel::Neutral
    }
}

/// Bundle of the three scalar indicators feeding a prediction
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TechnicalIndicators {
    /// Relative Strength Index in 0.0..=100.0
    pub rsi: f64,
    pub macd: MacdSignal,
    pub sentiment: SentimentLabel,
}

impl TechnicalIndicators {
    /// Compute all three indicators over an already-validated series.
    pub(crate) fn snapshot<R: Rng + ?Sized>(prices: &[f64], rng: &mut R) -> Self {
        Self {
            rsi: rsi_unchecked(prices, DEFAULT_RSI_PERIOD),
            macd: macd_signal_unchecked(prices),
            sentiment: SentimentLabel::sample(rng),
        }
    }
}

// ============================================================
// RSI
// ============================================================

/// Relative Strength Index over `prices` with the given lookback.
///
/// Returns the neutral `50.0` when fewer than `period + 1` points are
/// available. A zero-valued delta counts as a gain. The result is rounded
/// to two decimals and always lies in `[0, 100]`.
pub fn compute_rsi(prices: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(AnalysisError::InvalidValue("RSI period must be > 0"));
    }
    validate_prices(prices)?;
    Ok(rsi_unchecked(prices, period))
}

pub(crate) fn rsi_unchecked(prices: &[f64], period: usize) -> f64 {
    if prices.len() < period + 1 {
        return 50.0;
    }

    let p = period as f64;

    // Seed averages from the first `period` deltas
    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change >= 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    let mut avg_gain = gains / p;
    let mut avg_loss = losses / p;

    // Wilder smoothing across the remaining deltas
    for i in period + 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change >= 0.0 {
            avg_gain = (avg_gain * (p - 1.0) + change) / p;
            avg_loss = (avg_loss * (p - 1.0)) / p;
        } else {
            avg_gain = (avg_gain * (p - 1.0)) / p;
            avg_loss = (avg_loss * (p - 1.0) - change) / p;
        }
    }

    let loss = if avg_loss == 0.0 { RS_LOSS_FLOOR } else { avg_loss };
    let rs = avg_gain / loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);

    (rsi * 100.0).round() / 100.0
}

// ============================================================
// MACD DIRECTION
// ============================================================

/// Simplified MACD direction over the tail of `prices`.
///
/// Compares simple 12- and 26-point tail means against the same windows
/// shifted back one step. Series shorter than 26 points are `Neutral`.
pub fn compute_macd_signal(prices: &[f64]) -> Result<MacdSignal> {
    validate_prices(prices)?;
    Ok(macd_signal_unchecked(prices))
}

pub(crate) fn macd_signal_unchecked(prices: &[f64]) -> MacdSignal {
    let len = prices.len();
    if len < 26 {
        return MacdSignal::Neutral;
    }

    let fast = window_mean(prices, len - 12, len, 12.0);
    let slow = window_mean(prices, len - 26, len, 26.0);
    let macd = fast - slow;

    // Previous step. The shifted slow window clamps at the front when
    // len == 26 and keeps the 26 divisor.
    let prev_fast = window_mean(prices, len - 13, len - 1, 12.0);
    let prev_slow = window_mean(prices, len.saturating_sub(27), len - 1, 26.0);
    let prev_macd = prev_fast - prev_slow;

    if macd > 0.0 && macd > prev_macd {
        MacdSignal::Bullish
    } else if macd < 0.0 && macd < prev_macd {
        MacdSignal::Bearish
    } else {
        MacdSignal::Neutral
    }
}

#[inline]
fn window_mean(prices: &[f64], start: usize, end: usize, divisor: f64) -> f64 {
    prices[start..end].iter().sum::<f64>() / divisor
}

// ============================================================
// TESTS
// ============================================================
