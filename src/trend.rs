//! Aggregate market-trend classification.
//!
//! Combines weekly/monthly percent change, a volume-trend ratio, a
//! 14-point momentum score and an externally supplied sentiment score into
//! one normalized bullish/bearish/neutral call with supporting fact
//! strings. Downstream consumers match on the exact wording of the facts,
//! so the strings are fixed.

use crate::{validate_prices, validate_volumes, AnalysisError, Result};

/// Sentiment score used when no external source is available
pub const DEFAULT_SENTIMENT_SCORE: f64 = 50.0;

/// Points in the momentum lookback window
const MOMENTUM_WINDOW: usize = 14;

// ============================================================
// TREND TYPES
// ============================================================

/// Overall market direction call
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Bullish,
    Bearish,
    Neutral,
}

impl TrendStatus {
    /// Fixed description string for this status.
    pub fn description(self) -> &'static str {
        match self {
            TrendStatus::Bullish => {
                "The market shows strong bullish signals with positive price action and sentiment."
            }
            TrendStatus::Bearish => {
                "The market shows bearish signals with negative price action and sentiment."
            }
            TrendStatus::Neutral => {
                "The market is showing mixed signals without a clear trend direction."
            }
        }
    }
}

/// Result of a trend analysis call.
///
/// Recomputed from scratch on every call; no history is retained.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarketTrend {
    pub status: TrendStatus,
    /// 0 at the neutral midpoint, up to 100 at the extremes
    pub confidence: u8,
    /// Short textual facts in a fixed order: weekly change, monthly
    /// change, volume (only when volume data was supplied), sentiment,
    /// momentum
    pub indicators: Vec<String>,
    pub description: String,
}

// ============================================================
// ANALYSIS
// ============================================================

/// Classify the market trend over a price series.
///
/// `volumes` may be empty and `sentiment_score` defaults to
/// [`DEFAULT_SENTIMENT_SCORE`] when no external source exists. Fewer than
/// 7 price points yields the neutral insufficient-data result rather than
/// an error.
pub fn analyze_market_trend(
    prices: &[f64],
    volumes: &[f64],
    sentiment_score: f64,
) -> Result<MarketTrend> {
    validate_prices(prices)?;
    validate_volumes(volumes)?;
    if !sentiment_score.is_finite() {
        return Err(AnalysisError::InvalidValue(
            "sentiment score must be finite",
        ));
    }

    let len = prices.len();
    if len < 7 {
        return Ok(MarketTrend {
            status: TrendStatus::Neutral,
            confidence: 50,
            indicators: vec!["Insufficient data".to_string()],
            description: "Not enough price history to determine trend".to_string(),
        });
    }

    let latest = prices[len - 1];
    let weekly = pct_change(latest, prices[len.saturating_sub(8)]);
    let monthly = pct_change(latest, prices[len.saturating_sub(30)]);

    // Volume trend only exists with at least a week of volume data. The
    // prior window clamps at the front and keeps the 7 divisor.
    let volume_trend = (volumes.len() >= 7).then(|| {
        let vlen = volumes.len();
        let recent = volumes[vlen - 7..].iter().sum::<f64>() / 7.0;
        let previous = volumes[vlen.saturating_sub(14)..vlen - 7].iter().sum::<f64>() / 7.0;
        pct_change(recent, previous)
    });

    let momentum = recent_momentum(prices);

    let mut indicators = Vec::with_capacity(5);
    indicators.push(change_fact(weekly, "week"));
    indicators.push(change_fact(monthly, "month"));
    if let Some(vt) = volume_trend {
        indicators.push(volume_fact(vt).to_string());
    }
    indicators.push(sentiment_fact(sentiment_score).to_string());
    indicators.push(momentum_fact(momentum).to_string());

    let mut score = weekly * 2.0 + monthly;
    if let Some(vt) = volume_trend {
        score += if vt > 0.0 { 10.0 } else { -10.0 };
    }
    score += (sentiment_score - 50.0) * 2.0;
    score += (momentum - 50.0) * 1.5;

    let normalized = (score + 50.0).clamp(0.0, 100.0);

    let status = if normalized >= 65.0 {
        TrendStatus::Bullish
    } else if normalized <= 35.0 {
        TrendStatus::Bearish
    } else {
        TrendStatus::Neutral
    };

    Ok(MarketTrend {
        status,
        confidence: ((normalized - 50.0).abs() * 2.0).round() as u8,
        indicators,
        description: status.description().to_string(),
    })
}

/// Percent change of `current` against `base`; a zero base degrades to 0.0
/// instead of producing inf/NaN.
#[inline]
fn pct_change(current: f64, base: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    (current - base) / base * 100.0
}

/// RSI-like momentum over the deltas between the most recent 14 points.
///
/// Sums are divided by the window size. A window with gains and no losses
/// scores 100; a fully flat window is neutral at 50. Series shorter than
/// the window score 0.
fn recent_momentum(prices: &[f64]) -> f64 {
    let len = prices.len();
    if len < MOMENTUM_WINDOW {
        return 0.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..MOMENTUM_WINDOW {
        let change = prices[len - i] - prices[len - i - 1];
        if change >= 0.0 {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let avg_gain = gains / MOMENTUM_WINDOW as f64;
    let avg_loss = losses / MOMENTUM_WINDOW as f64;

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

fn change_fact(change: f64, span: &str) -> String {
    if change > 0.0 {
        format!("Price up {:.2}% this {}", change, span)
    } else {
        format!("Price down {:.2}% this {}", change.abs(), span)
    }
}

fn volume_fact(volume_trend: f64) -> &'static str {
    if volume_trend > 10.0 {
        "Volume increasing significantly"
    } else if volume_trend > 0.0 {
        "Volume slightly increasing"
    } else if volume_trend < -10.0 {
        "Volume decreasing significantly"
    } else {
        "Volume relatively stable"
    }
}

fn sentiment_fact(sentiment_score: f64) -> &'static str {
    if sentiment_score > 60.0 {
        "Positive market sentiment"
    } else if sentiment_score < 40.0 {
        "Negative market sentiment"
    } else {
        "Neutral market sentiment"
    }
}

fn momentum_fact(momentum: f64) -> &'static str {
    if momentum > 70.0 {
        "Strong bullish momentum (potentially overbought)"
    } else if momentum > 55.0 {
        "Moderate bullish momentum"
    } else if momentum < 30.0 {
        "Strong bearish momentum (potentially oversold)"
    } else if momentum < 45.0 {
        "Moderate bearish momentum"
    } else {
        "Neutral momentum"
    }
}

// ============================================================
// TESTS
// ============================================================
