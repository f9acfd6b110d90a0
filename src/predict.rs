//! Indicator-driven forecast simulation.
//!
//! Synthesizes a short random price walk, reads the scalar indicators off
//! it and folds them into a directional probability with a generated
//! explanation sentence. This is a self-contained simulation - it never
//! accepts an external series - and every random draw comes from the
//! injected generator, so a seeded generator reproduces the whole
//! prediction.

use rand::Rng;

use crate::indicators::{MacdSignal, SentimentLabel, TechnicalIndicators};

/// Steps in the synthetic price walk
const WALK_STEPS: usize = 30;
/// Starting value of the walk
const WALK_BASE_PRICE: f64 = 60_000.0;
/// Uniform step bound: each step moves within `(-MAX_STEP, MAX_STEP)`
const WALK_MAX_STEP: f64 = 1_000.0;

/// Probability shifts per indicator, applied in evaluation order
const RSI_SHIFT: f64 = 15.0;
const MACD_SHIFT: f64 = 10.0;
const SENTIMENT_SHIFT: f64 = 7.0;
/// Uniform jitter bound applied after the indicator shifts
const JITTER: f64 = 5.0;

const PROBABILITY_FLOOR: f64 = 50.0;
const PROBABILITY_CEIL: f64 = 90.0;

/// News-event phrases the explanation closes with, drawn uniformly.
const NEWS_EVENTS: [&str; 5] = [
    "recent ETF approval news",
    "regulatory developments",
    "institutional adoption",
    "whale wallet movements",
    "mining difficulty changes",
];

// ============================================================
// PREDICTION TYPES
// ============================================================

/// Forecast direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// A simulated directional forecast.
///
/// Regenerated from a fresh synthetic walk on every call; not derived
/// from any externally supplied series.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prediction {
    pub coin: String,
    /// Constrained to 50.0..=90.0
    pub probability: f64,
    pub direction: TrendDirection,
    pub timeframe: String,
    pub explanation: String,
    pub indicators: TechnicalIndicators,
}

// ============================================================
// SIMULATION
// ============================================================

/// Generate a prediction using the thread-local generator.
pub fn simulate_prediction() -> Prediction {
    simulate_prediction_with(&mut rand::thread_rng())
}

/// Generate a prediction from an injected generator.
///
/// The same seeded generator always produces the same prediction, which
/// is what tests rely on.
pub fn simulate_prediction_with<R: Rng + ?Sized>(rng: &mut R) -> Prediction {
    let walk = synthetic_walk(rng);
    let indicators = TechnicalIndicators::snapshot(&walk, rng);

    let mut probability = 50.0;
    let mut direction = TrendDirection::Up;

    // Later indicators override the direction of earlier ones.
    if indicators.rsi > 70.0 {
        probability -= RSI_SHIFT;
        direction = TrendDirection::Down;
    } else if indicators.rsi < 30.0 {
        probability += RSI_SHIFT;
        direction = TrendDirection::Up;
    }

    match indicators.macd {
        MacdSignal::Bullish => {
            probability += MACD_SHIFT;
            direction = TrendDirection::Up;
        }
        MacdSignal::Bearish => {
            probability -= MACD_SHIFT;
            direction = TrendDirection::Down;
        }
        MacdSignal::Neutral => {}
    }

    match indicators.sentiment {
        SentimentLabel::Positive => {
            probability += SENTIMENT_SHIFT;
            direction = TrendDirection::Up;
        }
        SentimentLabel::Negative => {
            probability -= SENTIMENT_SHIFT;
            direction = TrendDirection::Down;
        }
        SentimentLabel::Neutral => {}
    }

    probability += rng.gen_range(-JITTER..JITTER);
    probability = probability.clamp(PROBABILITY_FLOOR, PROBABILITY_CEIL);

    let explanation = compose_explanation(&indicators, rng);

    Prediction {
        coin: "Bitcoin".to_string(),
        probability,
        direction,
        timeframe: "Next 24 hours".to_string(),
        explanation,
        indicators,
    }
}

/// Bounded random walk driving the indicator snapshot.
fn synthetic_walk<R: Rng + ?Sized>(rng: &mut R) -> Vec<f64> {
    let mut prices = Vec::with_capacity(WALK_STEPS);
    let mut price = WALK_BASE_PRICE;
    for _ in 0..WALK_STEPS {
        price += rng.gen_range(-WALK_MAX_STEP..WALK_MAX_STEP);
        prices.push(price);
    }
    prices
}

fn compose_explanation<R: Rng + ?Sized>(indicators: &TechnicalIndicators, rng: &mut R) -> String {
    let rsi_clause = if indicators.rsi > 70.0 {
        "RSI indicates overbought conditions"
    } else if indicators.rsi < 30.0 {
        "RSI indicates oversold conditions"
    } else {
        "RSI in neutral territory"
    };

    let macd_clause = match indicators.macd {
        MacdSignal::Bullish => "MACD showing bullish crossover",
        MacdSignal::Bearish => "MACD showing bearish crossover",
        MacdSignal::Neutral => "MACD in neutral zone",
    };

    let sentiment_clause = match indicators.sentiment {
        SentimentLabel::Positive => "positive market sentiment",
        SentimentLabel::Negative => "negative market sentiment",
        SentimentLabel::Neutral => "neutral market sentiment",
    };

    let news_event = NEWS_EVENTS[rng.gen_range(0..NEWS_EVENTS.len())];

    format!("{rsi_clause} with {macd_clause} and {sentiment_clause} from {news_event}.")
}

// ============================================================
// TESTS
// ============================================================
