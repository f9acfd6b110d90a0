//! Local extremum detection over raw price series.
//!
//! Leaf dependency of the formation detectors: a strict symmetric-window
//! scan with no smoothing or interpolation. Plateaus never qualify because
//! every comparison is strict.

/// Kind of local extremum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    Peak,
    Trough,
}

/// A local extremum at `index` in the scanned series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremum {
    pub index: usize,
    pub kind: ExtremumKind,
}

/// Find all local extrema using a symmetric half-window.
///
/// An index `i` with `half_window <= i < len - half_window` is a peak
/// (trough) iff `prices[i]` is strictly greater (less) than all
/// `half_window` neighbors on each side. Returns an empty list when
/// `half_window == 0` or the series is shorter than `2 * half_window + 1`.
/// Output is ordered by ascending index.
pub fn find_extrema(prices: &[f64], half_window: usize) -> Vec<Extremum> {
    let len = prices.len();
    if half_window == 0 || len < 2 * half_window + 1 {
        return Vec::new();
    }

    let mut extrema = Vec::new();
    for i in half_window..len - half_window {
        if is_strict_extremum(prices, i, half_window, ExtremumKind::Peak) {
            extrema.push(Extremum {
                index: i,
                kind: ExtremumKind::Peak,
            });
        } else if is_strict_extremum(prices, i, half_window, ExtremumKind::Trough) {
            extrema.push(Extremum {
                index: i,
                kind: ExtremumKind::Trough,
            });
        }
    }
    extrema
}

/// Indices of local maxima for the given half-window, ascending.
pub fn peak_indices(prices: &[f64], half_window: usize) -> Vec<usize> {
    find_extrema(prices, half_window)
        .into_iter()
        .filter(|e| e.kind == ExtremumKind::Peak)
        .map(|e| e.index)
        .collect()
}

/// Indices of local minima for the given half-window, ascending.
pub fn trough_indices(prices: &[f64], half_window: usize) -> Vec<usize> {
    find_extrema(prices, half_window)
        .into_iter()
        .filter(|e| e.kind == ExtremumKind::Trough)
        .map(|e| e.index)
        .collect()
}

#[inline]
fn is_strict_extremum(prices: &[f64], i: usize, half_window: usize, kind: ExtremumKind) -> bool {
    let center = prices[i];
    for offset in 1..=half_window {
        let (left, right) = (prices[i - offset], prices[i + offset]);
        let beats = match kind {
            ExtremumKind::Peak => center > left && center > right,
            ExtremumKind::Trough => center < left && center < right,
        };
        if !beats {
            return false;
        }
    }
    true
}
