//! # chartsense
//!
//! Chart pattern detection and market trend analysis for cryptocurrency
//! price series.
//!
//! The crate is a pure function library over in-memory `f64` slices: it
//! detects classical chart formations (double top/bottom, head and
//! shoulders and its inverse) with confidence scores, classifies the
//! aggregate market trend, computes scalar indicators (RSI, MACD direction,
//! sampled sentiment) and synthesizes an indicator-driven directional
//! forecast. No I/O, no shared state; the only non-determinism is an
//! explicitly injected random source.
//!
//! ## Quick Start
//!
//! ```rust
//! use chartsense::prelude::*;
//!
//! let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).sin() * 8.0).collect();
//!
//! // One-shot scan with the default detector set
//! let patterns = detect_patterns(&prices).unwrap();
//!
//! // Or build a scanner with custom detectors and filters
//! let scanner = ScannerBuilder::new()
//!     .with_all_defaults()
//!     .min_confidence(80.0)
//!     .build()
//!     .unwrap();
//! let patterns = scanner.scan(&prices).unwrap();
//!
//! // Trend classification over the same series
//! let trend = analyze_market_trend(&prices, &[], DEFAULT_SENTIMENT_SCORE).unwrap();
//! println!("{:?} ({}%)", trend.status, trend.confidence);
//! ```

pub mod detectors;
pub mod extrema;
pub mod indicators;
pub mod predict;
pub mod trend;

pub use indicators::{
    compute_macd_signal, compute_rsi, MacdSignal, SentimentLabel, TechnicalIndicators,
};
pub use predict::{simulate_prediction, simulate_prediction_with, Prediction, TrendDirection};
pub use trend::{analyze_market_trend, MarketTrend, TrendStatus, DEFAULT_SENTIMENT_SCORE};

pub mod prelude {
    pub use crate::{
        // Pattern detection
        detect_patterns,
        // Detectors
        detectors::*,
        // Extrema
        extrema::{find_extrema, peak_indices, trough_indices, Extremum, ExtremumKind},
        // Indicators
        indicators::{compute_macd_signal, compute_rsi, DEFAULT_RSI_PERIOD},
        // Parallel
        scan_parallel,
        // Trend
        trend::{analyze_market_trend, DEFAULT_SENTIMENT_SCORE},
        // Prediction
        predict::{simulate_prediction, simulate_prediction_with},
        // Engine
        AnalysisError,
        BuiltinDetector,
        ChartPattern,
        Factor,
        MacdSignal,
        MarketTrend,
        PatternKind,
        PatternScanner,
        Period,
        Prediction,
        Ratio,
        Result,
        ScannerBuilder,
        SentimentLabel,
        SeriesDetector,
        SymbolPatterns,
        SymbolScanError,
        TechnicalIndicators,
        TrendDirection,
        TrendStatus,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during series analysis
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid sample at index {index}: {reason}")]
    InvalidSample { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Positive finite multiplier; unlike [`Ratio`] it may exceed 1.0
/// (e.g. the 1.03 breakout factor of a double bottom)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Factor(f64);

impl Factor {
    /// Create a new Factor, validating the value is finite and > 0
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue(
                "Factor cannot be NaN or infinite",
            ));
        }
        if value <= 0.0 {
            return Err(AnalysisError::InvalidValue("Factor must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Factor {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Factor {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Factor::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// SERIES VALIDATION
// ============================================================

/// Validate a price series: every entry must be finite.
///
/// Insufficient length is never an error in this crate; malformed numbers
/// are, and they fail fast here instead of propagating NaN into confidence
/// scores.
pub fn validate_prices(prices: &[f64]) -> Result<()> {
    for (index, p) in prices.iter().enumerate() {
        if p.is_nan() {
            return Err(AnalysisError::InvalidSample {
                index,
                reason: "NaN price",
            });
        }
        if p.is_infinite() {
            return Err(AnalysisError::InvalidSample {
                index,
                reason: "infinite price",
            });
        }
    }
    Ok(())
}

/// Validate a volume series: every entry must be finite and non-negative.
pub fn validate_volumes(volumes: &[f64]) -> Result<()> {
    for (index, v) in volumes.iter().enumerate() {
        if v.is_nan() {
            return Err(AnalysisError::InvalidSample {
                index,
                reason: "NaN volume",
            });
        }
        if v.is_infinite() {
            return Err(AnalysisError::InvalidSample {
                index,
                reason: "infinite volume",
            });
        }
        if *v < 0.0 {
            return Err(AnalysisError::InvalidSample {
                index,
                reason: "negative volume",
            });
        }
    }
    Ok(())
}

// ============================================================
// CHART PATTERN - result of detection
// ============================================================

/// Classical chart formation kinds.
///
/// `Triangle` and `Channel` are declared (and serialize) for downstream
/// consumers, but no builtin detector currently produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    DoubleTop,
    DoubleBottom,
    HeadAndShoulders,
    InverseHeadAndShoulders,
    Triangle,
    Channel,
}

impl PatternKind {
    /// Static human-readable description for this formation.
    pub fn description(self) -> &'static str {
        match self {
            PatternKind::DoubleTop => {
                "Double Top pattern detected - potential bearish reversal"
            }
            PatternKind::DoubleBottom => {
                "Double Bottom pattern detected - potential bullish reversal"
            }
            PatternKind::HeadAndShoulders => {
                "Head and Shoulders pattern detected - potential bearish reversal"
            }
            PatternKind::InverseHeadAndShoulders => {
                "Inverse Head and Shoulders pattern detected - potential bullish reversal"
            }
            PatternKind::Triangle => "Triangle pattern detected - potential continuation",
            PatternKind::Channel => "Channel pattern detected - trend continuation",
        }
    }

    /// Returns true if this formation typically signals a bearish reversal.
    pub fn is_bearish_reversal(self) -> bool {
        matches!(self, PatternKind::DoubleTop | PatternKind::HeadAndShoulders)
    }

    /// Returns true if this formation typically signals a bullish reversal.
    pub fn is_bullish_reversal(self) -> bool {
        matches!(
            self,
            PatternKind::DoubleBottom | PatternKind::InverseHeadAndShoulders
        )
    }
}

/// A detected chart formation with its confidence and index range.
///
/// `start_index`/`end_index` are inclusive bounds into the scanned series,
/// already clamped to the series length. Constructed fresh on every
/// detection call and never mutated.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartPattern {
    pub kind: PatternKind,
    /// Heuristic quality score in 0.0..=100.0 (not a probability)
    pub confidence: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub description: String,
}

impl ChartPattern {
    /// Build a pattern for `kind`, clamping the raw index range into
    /// `0..len`. `start` is signed because detectors pad the anchor index
    /// leftwards by a margin that may go negative.
    pub(crate) fn new(
        kind: PatternKind,
        confidence: f64,
        start: isize,
        end: usize,
        len: usize,
    ) -> Self {
        Self {
            kind,
            confidence: confidence.min(100.0),
            start_index: start.max(0) as usize,
            end_index: end.min(len - 1),
            description: kind.description().to_string(),
        }
    }
}

// ============================================================
// DETECTOR TRAIT + BUILTIN DETECTORS
// ============================================================

use detectors::{
    DoubleBottomDetector, DoubleTopDetector, HeadAndShouldersDetector,
    InverseHeadAndShouldersDetector,
};

/// A chart-formation detector over a raw price series.
///
/// Implementations are pure: `detect` reads the series and returns at most
/// one formation — the first structurally valid match in ascending index
/// order — without mutating anything.
pub trait SeriesDetector: Send + Sync {
    fn kind(&self) -> PatternKind;

    /// Minimum series length this detector needs; shorter input yields
    /// `None` without scanning.
    fn min_len(&self) -> usize;

    fn detect(&self, prices: &[f64]) -> Option<ChartPattern>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

/// All builtin detectors - static dispatch, no vtable
#[derive(Debug, Clone)]
pub enum BuiltinDetector {
    DoubleTop(DoubleTopDetector),
    DoubleBottom(DoubleBottomDetector),
    HeadAndShoulders(HeadAndShouldersDetector),
    InverseHeadAndShoulders(InverseHeadAndShouldersDetector),
}

impl BuiltinDetector {
    #[inline]
    pub fn kind(&self) -> PatternKind {
        match self {
            Self::DoubleTop(d) => d.kind(),
            Self::DoubleBottom(d) => d.kind(),
            Self::HeadAndShoulders(d) => d.kind(),
            Self::InverseHeadAndShoulders(d) => d.kind(),
        }
    }

    #[inline]
    pub fn min_len(&self) -> usize {
        match self {
            Self::DoubleTop(d) => d.min_len(),
            Self::DoubleBottom(d) => d.min_len(),
            Self::HeadAndShoulders(d) => d.min_len(),
            Self::InverseHeadAndShoulders(d) => d.min_len(),
        }
    }

    #[inline]
    pub fn detect(&self, prices: &[f64]) -> Option<ChartPattern> {
        match self {
            Self::DoubleTop(d) => d.detect(prices),
            Self::DoubleBottom(d) => d.detect(prices),
            Self::HeadAndShoulders(d) => d.detect(prices),
            Self::InverseHeadAndShoulders(d) => d.detect(prices),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        match self {
            Self::DoubleTop(d) => d.validate_config(),
            Self::DoubleBottom(d) => d.validate_config(),
            Self::HeadAndShoulders(d) => d.validate_config(),
            Self::InverseHeadAndShoulders(d) => d.validate_config(),
        }
    }
}

// ============================================================
// PATTERN SCANNER
// ============================================================

/// Scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub min_confidence: Option<f64>,
}

/// Runs a fixed set of formation detectors over a price series.
///
/// Detectors run independently and unconditionally in registration order;
/// each contributes at most one pattern instance per scan. An empty result
/// is the normal "no pattern found" outcome, not an error.
pub struct PatternScanner {
    detectors: Vec<BuiltinDetector>,
    config: ScanConfig,
}

impl PatternScanner {
    /// Scan the series with every registered detector.
    ///
    /// Fails only on non-finite input. Detectors whose `min_len` exceeds
    /// the series length are skipped.
    pub fn scan(&self, prices: &[f64]) -> Result<Vec<ChartPattern>> {
        validate_prices(prices)?;

        let mut results = Vec::new();
        for detector in &self.detectors {
            if prices.len() < detector.min_len() {
                continue;
            }
            if let Some(p) = detector.detect(prices) {
                if self.should_include(&p) {
                    results.push(p);
                }
            }
        }
        Ok(results)
    }

    fn should_include(&self, p: &ChartPattern) -> bool {
        match self.config.min_confidence {
            Some(min) => p.confidence >= min,
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        for d in &self.detectors {
            d.validate_config()?;
        }
        Ok(())
    }
}

/// Detect chart patterns in a price series using the default detector set.
///
/// Runs double top, double bottom, head and shoulders and inverse head and
/// shoulders, in that fixed order. Series shorter than 20 points return an
/// empty list.
pub fn detect_patterns(prices: &[f64]) -> Result<Vec<ChartPattern>> {
    let scanner = ScannerBuilder::new().with_all_defaults().build()?;
    scanner.scan(prices)
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternScanner instances
#[derive(Default)]
pub struct ScannerBuilder {
    detectors: Vec<BuiltinDetector>,
    config: ScanConfig,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all builtin detectors with default configurations, in the fixed
    /// reporting order.
    pub fn with_all_defaults(mut self) -> Self {
        self.detectors.extend([
            BuiltinDetector::DoubleTop(DoubleTopDetector::with_defaults()),
            BuiltinDetector::DoubleBottom(DoubleBottomDetector::with_defaults()),
            BuiltinDetector::HeadAndShoulders(HeadAndShouldersDetector::with_defaults()),
            BuiltinDetector::InverseHeadAndShoulders(
                InverseHeadAndShouldersDetector::with_defaults(),
            ),
        ]);
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.detectors.push(detector);
        Ok(self)
    }

    /// Drop detections scoring below `confidence` (0-100 scale)
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Build the scanner
    pub fn build(self) -> Result<PatternScanner> {
        let scanner = PatternScanner {
            detectors: self.detectors,
            config: self.config,
        };
        scanner.validate()?;
        Ok(scanner)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single symbol's series
#[derive(Debug)]
pub struct SymbolPatterns {
    pub symbol: String,
    pub patterns: Vec<ChartPattern>,
}

/// Error from scanning a single symbol's series
#[derive(Debug)]
pub struct SymbolScanError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Parallel pattern scan across multiple symbols' price series.
pub fn scan_parallel<'a, I>(
    scanner: &PatternScanner,
    series: I,
) -> (Vec<SymbolPatterns>, Vec<SymbolScanError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a [f64])>,
{
    let results: Vec<_> = series
        .into_par_iter()
        .map(|(symbol, prices)| {
            scanner
                .scan(prices)
                .map(|patterns| SymbolPatterns {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| SymbolScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 25 points with strict peaks at 5 and 15 and a deep trough between.
    fn double_top_series() -> Vec<f64> {
        vec![
            100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 102.0,
            104.0, 106.0, 108.0, 109.5, 108.0, 106.0, 104.0, 102.0, 100.0, 100.0, 100.0, 100.0,
            100.0,
        ]
    }

    #[test]
    fn test_ratio_validation() {
        assert!(Ratio::new(0.0).is_ok());
        assert!(Ratio::new(1.0).is_ok());
        assert!(Ratio::new(0.95).is_ok());
        assert!(Ratio::new(-0.1).is_err());
        assert!(Ratio::new(1.1).is_err());
        assert!(Ratio::new(f64::NAN).is_err());
        assert!(Ratio::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_factor_validation() {
        assert!(Factor::new(0.97).is_ok());
        assert!(Factor::new(1.03).is_ok());
        assert!(Factor::new(0.0).is_err());
        assert!(Factor::new(-1.0).is_err());
        assert!(Factor::new(f64::NAN).is_err());
    }

    #[test]
    fn test_period_validation() {
        assert!(Period::new(1).is_ok());
        assert!(Period::new(50).is_ok());
        assert!(Period::new(0).is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_prices(&[]).is_ok());
        assert!(validate_prices(&[1.0, 2.0, 3.0]).is_ok());

        let err = validate_prices(&[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSample { index: 1, .. }));

        assert!(validate_prices(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_validate_volumes() {
        assert!(validate_volumes(&[0.0, 10.0]).is_ok());
        assert!(validate_volumes(&[-1.0]).is_err());
        assert!(validate_volumes(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_scanner_builder() {
        let scanner = ScannerBuilder::new().with_all_defaults().build();
        assert!(scanner.is_ok());
        assert_eq!(scanner.unwrap().detectors.len(), 4);
    }

    #[test]
    fn test_short_series_scan_is_empty() {
        let scanner = ScannerBuilder::new().with_all_defaults().build().unwrap();
        let prices: Vec<f64> = (0..19).map(|i| i as f64).collect();
        assert!(scanner.scan(&prices).unwrap().is_empty());
    }

    #[test]
    fn test_scan_rejects_nan() {
        let scanner = ScannerBuilder::new().with_all_defaults().build().unwrap();
        let mut prices: Vec<f64> = (0..30).map(|i| i as f64).collect();
        prices[7] = f64::NAN;
        assert!(scanner.scan(&prices).is_err());
    }

    #[test]
    fn test_min_confidence_filter() {
        let scanner = ScannerBuilder::new()
            .with_all_defaults()
            .min_confidence(99.9)
            .build()
            .unwrap();

        let prices = double_top_series();
        let unfiltered = detect_patterns(&prices).unwrap();
        assert!(!unfiltered.is_empty());

        let filtered = scanner.scan(&prices).unwrap();
        assert!(filtered.iter().all(|p| p.confidence >= 99.9));
    }

    #[test]
    fn test_pattern_kind_serde_names() {
        let json = serde_json::to_string(&PatternKind::DoubleTop).unwrap();
        assert_eq!(json, "\"double-top\"");
        let json = serde_json::to_string(&PatternKind::InverseHeadAndShoulders).unwrap();
        assert_eq!(json, "\"inverse-head-and-shoulders\"");
    }

    #[test]
    fn test_chart_pattern_serde_round_trip() {
        let prices = double_top_series();
        let patterns = detect_patterns(&prices).unwrap();
        assert!(!patterns.is_empty());

        let json = serde_json::to_string(&patterns).unwrap();
        let back: Vec<ChartPattern> = serde_json::from_str(&json).unwrap();
        assert_eq!(patterns, back);
    }

    #[test]
    fn test_scan_parallel_split() {
        let scanner = ScannerBuilder::new().with_all_defaults().build().unwrap();

        let good = double_top_series();
        let bad = vec![1.0, f64::NAN, 3.0];
        let series: Vec<(&str, &[f64])> = vec![("BTC", &good), ("ETH", &bad)];

        let (results, errors) = scan_parallel(&scanner, series);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "BTC");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].symbol, "ETH");
    }
}
