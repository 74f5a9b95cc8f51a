//! Timed playback events and the ordered event list

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};
use crate::instrument::InstrumentId;

/// A single scheduled trigger: when, and which instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Offset from stream start
    pub at: Duration,
    pub instrument: InstrumentId,
}

/// An immutable list of events sorted by timestamp
///
/// Built once from parallel timestamp/instrument slices. The sort order is
/// established here and consumed by playback without re-checking, so the
/// builder is the only place events come into existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    /// Pair timestamps (in seconds) with instruments and sort by time
    ///
    /// Ties keep their input order. Fails with `LengthMismatch` if the
    /// slices differ in length and `MalformedEvent` if any timestamp is
    /// negative or non-finite.
    pub fn build(timestamps: &[f64], instruments: &[InstrumentId]) -> Result<Self> {
        if timestamps.len() != instruments.len() {
            return Err(SequenceError::LengthMismatch {
                timestamps: timestamps.len(),
                instruments: instruments.len(),
            });
        }

        let mut events = Vec::with_capacity(timestamps.len());
        for (index, (&seconds, &instrument)) in timestamps.iter().zip(instruments).enumerate() {
            let at = Duration::try_from_secs_f64(seconds)
                .map_err(|_| SequenceError::MalformedEvent { index, value: seconds })?;
            events.push(Event { at, instrument });
        }

        // Stable: simultaneous events keep their input order
        events.sort_by_key(|event| event.at);

        Ok(Self { events })
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the final event, if any
    pub fn last_at(&self) -> Option<Duration> {
        self.events.last().map(|event| event.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::Axis;

    const A: InstrumentId = InstrumentId::Slot(1);
    const B: InstrumentId = InstrumentId::Slot(2);
    const C: InstrumentId = InstrumentId::Slot(3);

    #[test]
    fn test_build_sorts_by_timestamp() {
        let list = EventList::build(&[0.5, 0.1, 0.3], &[A, B, C]).unwrap();
        let order: Vec<_> = list.events().iter().map(|e| (e.at, e.instrument)).collect();
        assert_eq!(
            order,
            vec![
                (Duration::from_secs_f64(0.1), B),
                (Duration::from_secs_f64(0.3), C),
                (Duration::from_secs_f64(0.5), A),
            ]
        );
    }

    #[test]
    fn test_build_stable_on_ties() {
        // Equal timestamps keep input order
        let list = EventList::build(&[0.2, 0.2, 0.1], &[A, B, C]).unwrap();
        let instruments: Vec<_> = list.events().iter().map(|e| e.instrument).collect();
        assert_eq!(instruments, vec![C, A, B]);
    }

    #[test]
    fn test_build_rejects_length_mismatch() {
        let err = EventList::build(&[0.0, 0.5], &[A]).unwrap_err();
        assert!(matches!(
            err,
            SequenceError::LengthMismatch { timestamps: 2, instruments: 1 }
        ));
    }

    #[test]
    fn test_build_rejects_bad_timestamps() {
        assert!(matches!(
            EventList::build(&[0.0, -0.5], &[A, B]).unwrap_err(),
            SequenceError::MalformedEvent { index: 1, .. }
        ));
        assert!(EventList::build(&[f64::NAN], &[A]).is_err());
        assert!(EventList::build(&[f64::INFINITY], &[A]).is_err());
    }

    #[test]
    fn test_axis_instruments() {
        let list = EventList::build(
            &[0.0, 0.25],
            &[InstrumentId::Axis(Axis::X), InstrumentId::Axis(Axis::Z)],
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.last_at(), Some(Duration::from_secs_f64(0.25)));
    }
}
