//! Tempo and timestamp conversion
//!
//! Note durations come in as quarter-note units (0.25 = sixteenth,
//! 1.0 = quarter). They convert to cumulative sixteenth-note tick
//! offsets, then to absolute seconds at a tempo.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};

/// Sixteenth-note ticks per quarter note
const TICKS_PER_QUARTER: f64 = 4.0;

/// Playback tempo in beats (quarter notes) per minute
///
/// Serializes as a bare BPM number; deserialization runs the same
/// validation as [`Tempo::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    /// Create a tempo, rejecting non-positive or non-finite BPM.
    pub fn new(bpm: f64) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SequenceError::InvalidTempo(bpm));
        }
        Ok(Self { bpm })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Seconds one sixteenth-note tick lasts at this tempo
    pub fn seconds_per_tick(&self) -> f64 {
        60.0 / self.bpm / TICKS_PER_QUARTER
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 120.0 }
    }
}

impl TryFrom<f64> for Tempo {
    type Error = SequenceError;

    fn try_from(bpm: f64) -> Result<Self> {
        Self::new(bpm)
    }
}

impl From<Tempo> for f64 {
    fn from(tempo: Tempo) -> f64 {
        tempo.bpm
    }
}

/// Convert note durations to cumulative start offsets in sixteenth ticks
///
/// The first note starts at tick 0; each following offset adds the
/// preceding duration times four. The position just past the last note is
/// not a start offset and is not included; [`loop_span`] exposes it as
/// the rhythm's total length instead.
///
/// # Example
/// ```
/// use strangeloop_core::durations_to_ticks;
/// let ticks = durations_to_ticks(&[1.0, 0.5, 0.25]);
/// assert_eq!(ticks, vec![0.0, 4.0, 6.0]);
/// ```
pub fn durations_to_ticks(durations: &[f64]) -> Vec<f64> {
    let mut ticks = Vec::with_capacity(durations.len());
    let mut total = 0.0;
    for &duration in durations {
        ticks.push(total);
        total += duration * TICKS_PER_QUARTER;
    }
    ticks
}

/// Convert tick offsets to seconds at the given tempo
pub fn ticks_to_seconds(ticks: &[f64], tempo: Tempo) -> Vec<f64> {
    let per_tick = tempo.seconds_per_tick();
    ticks.iter().map(|tick| tick * per_tick).collect()
}

/// Total length of a rhythm in seconds
///
/// A looping stream holds until this span after its last trigger, so the
/// next pass starts on the grid rather than right after the last event.
/// Degenerate inputs (negative or non-finite totals) yield a zero span.
pub fn loop_span(durations: &[f64], tempo: Tempo) -> Duration {
    let total_ticks: f64 = durations.iter().map(|d| d * TICKS_PER_QUARTER).sum();
    Duration::try_from_secs_f64(total_ticks * tempo.seconds_per_tick()).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_to_ticks() {
        // One quarter, one eighth, one sixteenth
        assert_eq!(durations_to_ticks(&[1.0, 0.5, 0.25]), vec![0.0, 4.0, 6.0]);
        // Same length as input, first offset always zero
        let ticks = durations_to_ticks(&[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(ticks.len(), 4);
        assert_eq!(ticks[0], 0.0);
        assert!(durations_to_ticks(&[]).is_empty());
    }

    #[test]
    fn test_ticks_to_seconds() {
        // At 60 BPM a quarter note is one second, so a tick is 0.25s
        let tempo = Tempo::new(60.0).unwrap();
        let seconds = ticks_to_seconds(&[0.0, 4.0, 6.0], tempo);
        assert_eq!(seconds, vec![0.0, 1.0, 1.5]);
    }

    #[test]
    fn test_schedule_is_monotonic() {
        let tempo = Tempo::new(97.3).unwrap();
        let seconds = ticks_to_seconds(&durations_to_ticks(&[0.25, 1.0, 0.5, 2.0, 0.75]), tempo);
        assert!(seconds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_tempo_rejects_bad_bpm() {
        assert!(Tempo::new(0.0).is_err());
        assert!(Tempo::new(-33.0).is_err());
        assert!(Tempo::new(f64::NAN).is_err());
        assert!(Tempo::new(f64::INFINITY).is_err());
        assert!(Tempo::new(128.0).is_ok());
    }

    #[test]
    fn test_tempo_deserializes_through_validation() {
        let tempo: Tempo = serde_json::from_str("96.0").unwrap();
        assert_eq!(tempo.bpm(), 96.0);
        assert!(serde_json::from_str::<Tempo>("0.0").is_err());
        assert!(serde_json::from_str::<Tempo>("-120.0").is_err());
    }

    #[test]
    fn test_loop_span() {
        let tempo = Tempo::new(60.0).unwrap();
        // Two quarter notes at 60 BPM span two seconds
        assert_eq!(loop_span(&[1.0, 1.0], tempo), Duration::from_secs(2));
        assert_eq!(loop_span(&[], tempo), Duration::ZERO);
    }
}
