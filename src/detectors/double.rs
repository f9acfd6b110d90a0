//! Double top and double bottom detectors.
//!
//! Both formations are two similar-height extrema at least a configurable
//! number of steps apart, confirmed by an intervening counter-move deep
//! (or high) enough to rule out noise.

use crate::extrema::{peak_indices, trough_indices};
use crate::{AnalysisError, ChartPattern, Factor, PatternKind, Period, Ratio, Result, SeriesDetector};

/// Half-window for the strict extremum scan used by both detectors.
const EXTREMUM_WINDOW: usize = 3;

/// Minimum series length before either detector will scan.
const MIN_SERIES_LEN: usize = 20;

impl_with_defaults!(DoubleTopDetector, DoubleBottomDetector);

/// Similarity of two extremum values as `min / max`.
///
/// A degenerate `max == 0` yields NaN, which fails every threshold
/// comparison and skips the candidate pair.
#[inline]
fn height_ratio(a: f64, b: f64) -> f64 {
    a.min(b) / a.max(b)
}

#[inline]
fn interior_min(prices: &[f64], a: usize, b: usize) -> f64 {
    prices[a + 1..b].iter().copied().fold(f64::MAX, f64::min)
}

#[inline]
fn interior_max(prices: &[f64], a: usize, b: usize) -> f64 {
    prices[a + 1..b].iter().copied().fold(f64::MIN, f64::max)
}

// ============================================================
// DOUBLE TOP
// ============================================================

/// Double top - two similar peaks with a confirmed pullback between them
#[derive(Debug, Clone)]
pub struct DoubleTopDetector {
    /// Minimum index distance between the two peaks
    pub min_separation: Period,
    /// Minimum `min/max` similarity of the two peak values
    pub min_height_ratio: Ratio,
    /// The intervening low must sit below `factor x` both peak values
    pub pullback_factor: Factor,
}

impl Default for DoubleTopDetector {
    fn default() -> Self {
        Self {
            min_separation: Period::new_const(10),
            min_height_ratio: Ratio::new_const(0.95),
            pullback_factor: Factor::new_const(0.97),
        }
    }
}

impl SeriesDetector for DoubleTopDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::DoubleTop
    }

    fn min_len(&self) -> usize {
        MIN_SERIES_LEN
    }

    fn detect(&self, prices: &[f64]) -> Option<ChartPattern> {
        let len = prices.len();
        if len < self.min_len() {
            return None;
        }

        let peaks = peak_indices(prices, EXTREMUM_WINDOW);

        // First adjacent pair passing every check wins; no best-confidence
        // search over later pairs.
        for pair in peaks.windows(2) {
            let (p1, p2) = (pair[0], pair[1]);
            if p2 - p1 < self.min_separation.get() {
                continue;
            }

            let ratio = height_ratio(prices[p1], prices[p2]);
            if !(ratio > self.min_height_ratio.get()) {
                continue;
            }

            let low = interior_min(prices, p1, p2);
            let confirms = low < prices[p1] * self.pullback_factor.get()
                && low < prices[p2] * self.pullback_factor.get();
            if !confirms {
                continue;
            }

            let confidence = 70.0 + ratio * 30.0;
            return Some(ChartPattern::new(
                self.kind(),
                confidence,
                p1 as isize - 5,
                p2 + 5,
                len,
            ));
        }

        None
    }

    fn validate_config(&self) -> Result<()> {
        if self.pullback_factor.get() >= 1.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "double top pullback_factor must be < 1.0, got {}",
                self.pullback_factor.get()
            )));
        }
        Ok(())
    }
}

// ============================================================
// DOUBLE BOTTOM
// ============================================================

/// Double bottom - two similar troughs with a confirmed rally between them
#[derive(Debug, Clone)]
pub struct DoubleBottomDetector {
    /// Minimum index distance between the two troughs
    pub min_separation: Period,
    /// Minimum `min/max` similarity of the two trough values
    pub min_height_ratio: Ratio,
    /// The intervening high must sit above `factor x` both trough values
    pub breakout_factor: Factor,
}

impl Default for DoubleBottomDetector {
    fn default() -> Self {
        Self {
            min_separation: Period::new_const(10),
            min_height_ratio: Ratio::new_const(0.95),
            breakout_factor: Factor::new_const(1.03),
        }
    }
}

impl SeriesDetector for DoubleBottomDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::DoubleBottom
    }

    fn min_len(&self) -> usize {
        MIN_SERIES_LEN
    }

    fn detect(&self, prices: &[f64]) -> Option<ChartPattern> {
        let len = prices.len();
        if len < self.min_len() {
            return None;
        }

        let troughs = trough_indices(prices, EXTREMUM_WINDOW);

        for pair in troughs.windows(2) {
            let (t1, t2) = (pair[0], pair[1]);
            if t2 - t1 < self.min_separation.get() {
                continue;
            }

            let ratio = height_ratio(prices[t1], prices[t2]);
            if !(ratio > self.min_height_ratio.get()) {
                continue;
            }

            let high = interior_max(prices, t1, t2);
            let confirms = high > prices[t1] * self.breakout_factor.get()
                && high > prices[t2] * self.breakout_factor.get();
            if !confirms {
                continue;
            }

            let confidence = 70.0 + ratio * 30.0;
            return Some(ChartPattern::new(
                self.kind(),
                confidence,
                t1 as isize - 5,
                t2 + 5,
                len,
            ));
        }

        None
    }

    fn validate_config(&self) -> Result<()> {
        if self.breakout_factor.get() <= 1.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "double bottom breakout_factor must be > 1.0, got {}",
                self.breakout_factor.get()
            )));
        }
        Ok(())
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Peaks at 5 (110.0) and 15 (109.5), trough at 10 (100.0).
    fn double_top_series() -> Vec<f64> {
        vec![
            100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 102.0,
            104.0, 106.0, 108.0, 109.5, 108.0, 106.0, 104.0, 102.0, 100.0, 100.0, 100.0, 100.0,
            100.0,
        ]
    }

    /// Troughs at 5 (100.0) and 15 (100.5), peak at 10 (110.0).
    fn double_bottom_series() -> Vec<f64> {
        vec![
            110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 108.0,
            106.0, 104.0, 102.0, 100.5, 102.0, 104.0, 106.0, 108.0, 110.0, 110.0, 110.0, 110.0,
            110.0,
        ]
    }

    #[test]
    fn test_double_top_detected() {
        let prices = double_top_series();
        let pattern = DoubleTopDetector::with_defaults().detect(&prices).unwrap();

        assert_eq!(pattern.kind, PatternKind::DoubleTop);
        // ratio 109.5/110 -> confidence 70 + 0.99545*30
        assert!((pattern.confidence - 99.86).abs() < 0.01);
        assert_eq!(pattern.start_index, 0);
        assert_eq!(pattern.end_index, 20);
        assert_eq!(
            pattern.description,
            "Double Top pattern detected - potential bearish reversal"
        );
    }

    #[test]
    fn test_double_bottom_detected() {
        let prices = double_bottom_series();
        let pattern = DoubleBottomDetector::with_defaults()
            .detect(&prices)
            .unwrap();

        assert_eq!(pattern.kind, PatternKind::DoubleBottom);
        assert!((pattern.confidence - 99.86).abs() < 0.01);
        assert_eq!(pattern.start_index, 0);
        assert_eq!(pattern.end_index, 20);
    }

    #[test]
    fn test_mirrored_top_is_a_bottom() {
        // inverting a double top around its mean produces a double-bottom
        // candidate (thresholds differ, so shapes are checked structurally)
        let prices = double_top_series();
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        let mirrored: Vec<f64> = prices.iter().map(|p| 2.0 * mean - p).collect();

        assert!(DoubleTopDetector::with_defaults().detect(&mirrored).is_none());
        assert!(DoubleBottomDetector::with_defaults()
            .detect(&mirrored)
            .is_some());
    }

    #[test]
    fn test_shallow_pullback_rejected() {
        // valley bottoms out at 107.0, above 0.97 * both peaks
        let prices = vec![
            100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 109.4, 108.6, 107.8, 107.3, 107.0, 107.5,
            108.0, 108.5, 109.0, 109.5, 108.0, 106.0, 104.0, 102.0, 100.0, 100.0, 100.0, 100.0,
            100.0,
        ];
        assert!(DoubleTopDetector::with_defaults().detect(&prices).is_none());
    }

    #[test]
    fn test_dissimilar_peaks_rejected() {
        // 104/110 ~ 0.945, under the 0.95 similarity floor
        let prices = vec![
            100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 100.8,
            101.6, 102.4, 103.2, 104.0, 102.0, 100.0, 98.0, 96.0, 94.0, 94.0, 94.0, 94.0, 94.0,
        ];
        assert!(DoubleTopDetector::with_defaults().detect(&prices).is_none());
    }

    #[test]
    fn test_close_peaks_rejected() {
        // peaks at 8 and 14: separation 6 < 10
        let mut prices = vec![100.0; 25];
        for (i, p) in [104.0, 107.0, 110.0, 107.0, 104.0].iter().enumerate() {
            prices[6 + i] = *p;
        }
        for (i, p) in [104.0, 107.0, 109.5, 107.0, 104.0].iter().enumerate() {
            prices[12 + i] = *p;
        }
        // indices 6..11 and 12..17 overlap at 11/12 boundary; peaks land at 8 and 14
        assert!(DoubleTopDetector::with_defaults().detect(&prices).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // pairs (5,15) and (15,25) both qualify; the earlier pair is
        // reported and later candidates are never inspected
        let prices = vec![
            100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 102.0,
            104.0, 106.0, 108.0, 109.5, 108.0, 106.0, 104.0, 102.0, 100.0, 101.8, 103.6, 105.4,
            107.2, 109.0, 107.0, 105.0, 103.0, 101.0, 100.0, 100.0, 100.0, 100.0, 100.0,
        ];
        let pattern = DoubleTopDetector::with_defaults().detect(&prices).unwrap();
        assert_eq!(pattern.start_index, 0);
        assert_eq!(pattern.end_index, 20);
    }

    #[test]
    fn test_short_series_yields_none() {
        let prices: Vec<f64> = (0..19).map(|i| i as f64).collect();
        assert!(DoubleTopDetector::with_defaults().detect(&prices).is_none());
        assert!(DoubleBottomDetector::with_defaults()
            .detect(&prices)
            .is_none());
    }

    #[test]
    fn test_config_validation() {
        let bad_top = DoubleTopDetector {
            pullback_factor: Factor::new(1.1).unwrap(),
            ..DoubleTopDetector::with_defaults()
        };
        assert!(bad_top.validate_config().is_err());

        let bad_bottom = DoubleBottomDetector {
            breakout_factor: Factor::new(0.9).unwrap(),
            ..DoubleBottomDetector::with_defaults()
        };
        assert!(bad_bottom.validate_config().is_err());
    }
}
