//! Onset detection over normalized signals
//!
//! Turns a continuous axis in [0, 1] into a binary onset vector, then into
//! playback timestamps at a fixed sampling rate. This is the data-driven
//! event source; it feeds the same event-list pipeline as hand-authored
//! rhythms.

use std::time::Duration;

/// Mark rising threshold crossings
///
/// Index `i >= 1` is an onset when the previous value sat below the
/// threshold and the current value reaches it. Index 0 is never an onset.
///
/// # Example
/// ```
/// use strangeloop_core::threshold_onsets;
/// let onsets = threshold_onsets(&[0.1, 0.4, 0.6, 0.3, 0.6], 0.5);
/// assert_eq!(onsets, vec![false, false, true, false, true]);
/// ```
pub fn threshold_onsets(values: &[f64], threshold: f64) -> Vec<bool> {
    let mut onsets = vec![false; values.len()];
    for i in 1..values.len() {
        onsets[i] = values[i - 1] < threshold && values[i] >= threshold;
    }
    onsets
}

/// Mark rising crossings of the first difference
///
/// The gradient at `i` is `values[i] - values[i-1]`, taken as 0 at index 0
/// where no previous value exists. Index `i >= 1` is an onset when the
/// gradient climbs above the threshold from at-or-below it, so each spurt
/// of growth fires exactly once.
pub fn gradient_onsets(values: &[f64], threshold: f64) -> Vec<bool> {
    let mut onsets = vec![false; values.len()];
    let mut prev_gradient = 0.0;
    for i in 1..values.len() {
        let gradient = values[i] - values[i - 1];
        onsets[i] = prev_gradient <= threshold && gradient > threshold;
        prev_gradient = gradient;
    }
    onsets
}

/// Convert onsets to timestamps in seconds at `steps_per_second`, plus the
/// span of the whole vector
///
/// The span is `(len - 1) / steps_per_second` whether or not the final
/// index holds an onset; looping streams hold until it so that every axis
/// loops on the same boundary regardless of where its last onset falls.
pub fn onset_timestamps(onsets: &[bool], steps_per_second: f64) -> (Vec<f64>, Duration) {
    debug_assert!(steps_per_second > 0.0);
    let timestamps = onsets
        .iter()
        .enumerate()
        .filter(|&(_, &on)| on)
        .map(|(i, _)| i as f64 / steps_per_second)
        .collect();
    let span_secs = onsets.len().saturating_sub(1) as f64 / steps_per_second;
    let span = Duration::try_from_secs_f64(span_secs).unwrap_or(Duration::ZERO);
    (timestamps, span)
}
