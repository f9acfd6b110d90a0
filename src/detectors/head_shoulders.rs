//! Head-and-shoulders and inverse head-and-shoulders detectors.
//!
//! Three consecutive extrema where the middle one strictly dominates and
//! the outer two sit at similar heights. The extremum scan uses a looser
//! half-window than the double formations so that shoulders survive minor
//! noise.

use crate::extrema::{peak_indices, trough_indices};
use crate::{AnalysisError, ChartPattern, PatternKind, Period, Ratio, Result, SeriesDetector};

/// Half-window for the extremum scan used by both detectors.
const EXTREMUM_WINDOW: usize = 2;

/// Minimum series length before either detector will scan.
const MIN_SERIES_LEN: usize = 30;

impl_with_defaults!(HeadAndShouldersDetector, InverseHeadAndShouldersDetector);

#[inline]
fn shoulder_ratio(a: f64, b: f64) -> f64 {
    a.min(b) / a.max(b)
}

/// Shared geometry over a consecutive extremum triple `(s1, h, s2)`.
///
/// Checks spacing only; the dominance direction of the head is the
/// caller's concern.
#[inline]
fn spacing_ok(s1: usize, h: usize, s2: usize, min_gap: usize, max_span: usize) -> bool {
    h - s1 >= min_gap && s2 - h >= min_gap && s2 - s1 <= max_span
}

// ============================================================
// HEAD AND SHOULDERS
// ============================================================

/// Head and shoulders - three peaks, dominant head, similar shoulders
#[derive(Debug, Clone)]
pub struct HeadAndShouldersDetector {
    /// Minimum index distance between each shoulder and the head
    pub min_shoulder_gap: Period,
    /// Maximum index span from first to second shoulder
    pub max_span: Period,
    /// Minimum `min/max` similarity of the two shoulder values
    pub min_shoulder_ratio: Ratio,
}

impl Default for HeadAndShouldersDetector {
    fn default() -> Self {
        Self {
            min_shoulder_gap: Period::new_const(5),
            max_span: Period::new_const(50),
            min_shoulder_ratio: Ratio::new_const(0.8),
        }
    }
}

impl SeriesDetector for HeadAndShouldersDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::HeadAndShoulders
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
        if peaks.len() < 3 {
            return None;
        }

        // First qualifying consecutive triple wins.
        for triple in peaks.windows(3) {
            let (s1, h, s2) = (triple[0], triple[1], triple[2]);
            if !spacing_ok(s1, h, s2, self.min_shoulder_gap.get(), self.max_span.get()) {
                continue;
            }
            if !(prices[h] > prices[s1] && prices[h] > prices[s2]) {
                continue;
            }

            let ratio = shoulder_ratio(prices[s1], prices[s2]);
            if !(ratio > self.min_shoulder_ratio.get()) {
                continue;
            }

            let confidence = 60.0 + ratio * 40.0;
            return Some(ChartPattern::new(
                self.kind(),
                confidence,
                s1 as isize - 5,
                s2 + 5,
                len,
            ));
        }

        None
    }

    fn validate_config(&self) -> Result<()> {
        if self.max_span.get() < 2 * self.min_shoulder_gap.get() {
            return Err(AnalysisError::InvalidConfig(format!(
                "max_span {} cannot fit two shoulder gaps of {}",
                self.max_span.get(),
                self.min_shoulder_gap.get()
            )));
        }
        Ok(())
    }
}

// ============================================================
// INVERSE HEAD AND SHOULDERS
// ============================================================

/// Inverse head and shoulders - three troughs, dominant low head
#[derive(Debug, Clone)]
pub struct InverseHeadAndShouldersDetector {
    pub min_shoulder_gap: Period,
    pub max_span: Period,
    pub min_shoulder_ratio: Ratio,
}

impl Default for InverseHeadAndShouldersDetector {
    fn default() -> Self {
        Self {
            min_shoulder_gap: Period::new_const(5),
            max_span: Period::new_const(50),
            min_shoulder_ratio: Ratio::new_const(0.8),
        }
    }
}

impl SeriesDetector for InverseHeadAndShouldersDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::InverseHeadAndShoulders
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
        if troughs.len() < 3 {
            return None;
        }

        for triple in troughs.windows(3) {
            let (s1, h, s2) = (triple[0], triple[1], triple[2]);
            if !spacing_ok(s1, h, s2, self.min_shoulder_gap.get(), self.max_span.get()) {
                continue;
            }
            // head must undercut both shoulders
            if !(prices[h] < prices[s1] && prices[h] < prices[s2]) {
                continue;
            }

            let ratio = shoulder_ratio(prices[s1], prices[s2]);
            if !(ratio > self.min_shoulder_ratio.get()) {
                continue;
            }

            let confidence = 60.0 + ratio * 40.0;
            return Some(ChartPattern::new(
                self.kind(),
                confidence,
                s1 as isize - 5,
                s2 + 5,
                len,
            ));
        }

        None
    }

    fn validate_config(&self) -> Result<()> {
        if self.max_span.get() < 2 * self.min_shoulder_gap.get() {
            return Err(AnalysisError::InvalidConfig(format!(
                "max_span {} cannot fit two shoulder gaps of {}",
                self.max_span.get(),
                self.min_shoulder_gap.get()
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

    /// Peaks at 5 (105.0), 15 (112.0) and 25 (104.0); troughs deep and
    /// dissimilar enough that no double formation co-triggers.
    fn head_and_shoulders_series() -> Vec<f64> {
        vec![
            95.0, 97.0, 99.0, 101.0, 103.0, 105.0, 103.6, 102.2, 100.8, 99.4, 98.0, 100.8, 103.6,
            106.4, 109.2, 112.0, 108.0, 104.0, 100.0, 96.0, 92.0, 94.4, 96.8, 99.2, 101.6, 104.0,
            102.4, 100.8, 99.2, 97.6, 96.0,
        ]
    }

    /// Mirror of the above around 104: troughs at 5, 15, 25 with a
    /// dominant low head.
    fn inverse_series() -> Vec<f64> {
        vec![
            113.0, 111.0, 109.0, 107.0, 105.0, 103.0, 104.4, 105.8, 107.2, 108.6, 110.0, 107.2,
            104.4, 101.6, 98.8, 96.0, 100.0, 104.0, 108.0, 112.0, 116.0, 113.6, 111.2, 108.8,
            106.4, 104.0, 105.6, 107.2, 108.8, 110.4, 112.0,
        ]
    }

    #[test]
    fn test_head_and_shoulders_detected() {
        let prices = head_and_shoulders_series();
        let pattern = HeadAndShouldersDetector::with_defaults()
            .detect(&prices)
            .unwrap();

        assert_eq!(pattern.kind, PatternKind::HeadAndShoulders);
        // shoulder ratio 104/105 -> confidence 60 + 0.99048*40
        assert!((pattern.confidence - 99.62).abs() < 0.01);
        assert_eq!(pattern.start_index, 0);
        assert_eq!(pattern.end_index, 30);
        assert_eq!(
            pattern.description,
            "Head and Shoulders pattern detected - potential bearish reversal"
        );
    }

    #[test]
    fn test_inverse_head_and_shoulders_detected() {
        let prices = inverse_series();
        let pattern = InverseHeadAndShouldersDetector::with_defaults()
            .detect(&prices)
            .unwrap();

        assert_eq!(pattern.kind, PatternKind::InverseHeadAndShoulders);
        // shoulder ratio 103/104
        assert!((pattern.confidence - 99.62).abs() < 0.02);
        assert_eq!(pattern.start_index, 0);
        assert_eq!(pattern.end_index, 30);
    }

    #[test]
    fn test_mirror_does_not_cross_detect() {
        assert!(HeadAndShouldersDetector::with_defaults()
            .detect(&inverse_series())
            .is_none());
        assert!(InverseHeadAndShouldersDetector::with_defaults()
            .detect(&head_and_shoulders_series())
            .is_none());
    }

    #[test]
    fn test_head_must_dominate() {
        // flatten the middle rally so index 15 stays a strict local peak
        // at 104.5, below the 105.0 first shoulder
        let mut prices = head_and_shoulders_series();
        for (i, p) in [103.0, 104.0, 104.5, 103.0, 101.5].iter().enumerate() {
            prices[13 + i] = *p;
        }
        assert!(HeadAndShouldersDetector::with_defaults()
            .detect(&prices)
            .is_none());
    }

    #[test]
    fn test_dissimilar_shoulders_rejected() {
        // drop the second shoulder to 80: ratio 80/105 ~ 0.76 < 0.8
        let mut prices = head_and_shoulders_series();
        for (i, p) in [76.0, 77.6, 78.8, 79.6, 80.0, 79.6, 78.8, 77.6, 76.0]
            .iter()
            .enumerate()
        {
            prices[21 + i] = *p;
        }
        prices[30] = 74.0;
        let detector = HeadAndShouldersDetector::with_defaults();
        let result = detector.detect(&prices);
        assert!(result.is_none());
    }

    #[test]
    fn test_short_series_yields_none() {
        // good structure but only 29 points
        let mut prices = head_and_shoulders_series();
        prices.truncate(29);
        assert!(HeadAndShouldersDetector::with_defaults()
            .detect(&prices)
            .is_none());
    }

    #[test]
    fn test_config_validation() {
        let bad = HeadAndShouldersDetector {
            min_shoulder_gap: Period::new(30).unwrap(),
            max_span: Period::new(50).unwrap(),
            ..HeadAndShouldersDetector::with_defaults()
        };
        assert!(bad.validate_config().is_err());
    }
}
