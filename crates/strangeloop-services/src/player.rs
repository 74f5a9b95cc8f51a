//! Single-stream playback
//!
//! Walks one event list against a wall-clock origin, sleeping until each
//! event is due, then triggering the playback facility. Scheduling is one
//! computed sleep per event; the player never polls. Under the repeated
//! loop shape every pass restarts its own origin, so scheduling error
//! cannot accumulate across loop boundaries.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use strangeloop_core::Stream;

use crate::playback::{PlaybackError, PlaybackHandle, SamplePlayer};

/// Lifecycle of one stream player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Running,
    Finished,
}

/// What one stream reports after finishing
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    pub label: String,
    /// Total triggers across all passes
    pub events_fired: usize,
    /// Wall time from entering Running to Finished
    pub elapsed: Duration,
    /// Worst observed lateness of any trigger
    pub max_latency: Duration,
}

/// Plays one stream to completion on the calling thread
pub struct StreamPlayer {
    stream: Stream,
    state: PlayerState,
}

impl StreamPlayer {
    pub fn new(stream: Stream) -> Self {
        Self {
            stream,
            state: PlayerState::Idle,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Run the stream to completion
    ///
    /// Triggers fire in timestamp order and do not block on the sample
    /// sounding out, except the final trigger of the final pass, which is
    /// awaited so the reported finish covers the audio, not just the
    /// trigger. A facility failure aborts this stream mid-pass. The state
    /// machine is one-way: any call after the first returns
    /// `AlreadyStarted` without firing anything.
    pub fn play(&mut self, facility: &dyn SamplePlayer) -> Result<StreamOutcome, PlaybackError> {
        if self.state != PlayerState::Idle {
            return Err(PlaybackError::AlreadyStarted(self.stream.label().to_string()));
        }
        self.state = PlayerState::Running;
        let stream_start = Instant::now();

        let events = self.stream.events().events();
        let events_per_loop = self.stream.events_per_loop();
        let passes = self.stream.passes();
        let mut events_fired = 0usize;
        let mut max_latency = Duration::ZERO;
        let mut last_handle: Option<PlaybackHandle> = None;

        debug!(
            stream = self.stream.label(),
            events = events.len(),
            passes,
            "Stream started"
        );

        for pass in 0..passes {
            let origin = Instant::now();
            let last_pass = pass + 1 == passes;

            for (idx, event) in events.iter().enumerate() {
                let elapsed = origin.elapsed();
                if elapsed < event.at {
                    thread::sleep(event.at - elapsed);
                }
                // The sleep may overshoot, never undershoot; measure what
                // actually happened before triggering
                let latency = origin.elapsed().saturating_sub(event.at);
                max_latency = max_latency.max(latency);

                let handle = facility.trigger(event.instrument)?;
                events_fired += 1;

                trace!(
                    stream = self.stream.label(),
                    step = idx % events_per_loop + 1,
                    of = events_per_loop,
                    latency_us = latency.as_micros() as u64,
                    "Event"
                );

                if last_pass && idx + 1 == events.len() {
                    last_handle = Some(handle);
                }
            }

            // Hold out the rhythm's full span so the next pass, and any
            // sibling stream, starts on the loop boundary
            if let Some(span) = self.stream.span() {
                let elapsed = origin.elapsed();
                if elapsed < span {
                    thread::sleep(span - elapsed);
                }
            }
        }

        if let Some(handle) = last_handle {
            handle.wait_done();
        }

        self.state = PlayerState::Finished;
        let elapsed = stream_start.elapsed();

        debug!(
            stream = self.stream.label(),
            events_fired,
            elapsed_ms = elapsed.as_millis() as u64,
            max_latency_us = max_latency.as_micros() as u64,
            "Stream finished"
        );

        Ok(StreamOutcome {
            label: self.stream.label().to_string(),
            events_fired,
            elapsed,
            max_latency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::{CapturePlayer, FailingPlayer};
    use strangeloop_core::{EventList, InstrumentId, LoopShape, Stream};

    fn stream(
        timestamps: &[f64],
        instrument: InstrumentId,
        loops: u32,
        shape: LoopShape,
    ) -> Stream {
        let instruments = vec![instrument; timestamps.len()];
        let events = EventList::build(timestamps, &instruments).unwrap();
        Stream::new("test", events, loops, shape).unwrap()
    }

    #[test]
    fn test_repeated_stream_fires_every_loop() {
        // Four events, three loops: exactly 12 triggers, and only the
        // twelfth handle is awaited before Finished
        let stream = stream(
            &[0.0, 0.02, 0.04, 0.06],
            InstrumentId::Slot(1),
            3,
            LoopShape::Repeated,
        );
        let facility = CapturePlayer::with_tail(Duration::from_millis(120));
        let mut player = StreamPlayer::new(stream);
        assert_eq!(player.state(), PlayerState::Idle);

        let outcome = player.play(&facility).unwrap();

        assert_eq!(player.state(), PlayerState::Finished);
        assert_eq!(outcome.events_fired, 12);
        assert_eq!(facility.trigger_count(), 12);
        // Three 60ms passes plus the final 120ms tail
        assert!(outcome.elapsed >= Duration::from_millis(300));
        // Intermediate handles are not awaited; twelve serial tails would
        // take well over a second
        assert!(outcome.elapsed < Duration::from_millis(1200));
    }

    #[test]
    fn test_events_fire_in_order() {
        let a = InstrumentId::Slot(1);
        let b = InstrumentId::Slot(2);
        let events = EventList::build(&[0.0, 0.02], &[a, b]).unwrap();
        let stream = Stream::new("order", events, 2, LoopShape::Repeated).unwrap();
        let facility = CapturePlayer::new();

        StreamPlayer::new(stream).play(&facility).unwrap();

        let triggers = facility.triggers.lock().unwrap();
        let fired: Vec<_> = triggers.iter().map(|(id, _)| *id).collect();
        assert_eq!(fired, vec![a, b, a, b]);
        assert!(triggers.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_premultiplied_runs_one_pass() {
        // Four timestamps standing for two loops of two, one shared origin
        let stream = stream(
            &[0.0, 0.04, 0.08, 0.12],
            InstrumentId::Slot(1),
            2,
            LoopShape::Premultiplied,
        );
        let facility = CapturePlayer::new();

        let outcome = StreamPlayer::new(stream).play(&facility).unwrap();

        assert_eq!(outcome.events_fired, 4);
        let triggers = facility.triggers.lock().unwrap();
        // Never early against the single origin
        assert!(triggers[1].1 >= Duration::from_millis(40));
        assert!(triggers[3].1 >= Duration::from_millis(120));
    }

    #[test]
    fn test_span_holds_each_pass_to_the_grid() {
        let stream = stream(&[0.0], InstrumentId::Slot(1), 3, LoopShape::Repeated)
            .with_span(Duration::from_millis(60));
        let facility = CapturePlayer::new();

        let outcome = StreamPlayer::new(stream).play(&facility).unwrap();

        let triggers = facility.triggers.lock().unwrap();
        assert_eq!(triggers.len(), 3);
        // Later passes start only after the previous span has run out
        assert!(triggers[1].1 >= Duration::from_millis(60));
        assert!(triggers[2].1 >= Duration::from_millis(120));
        // The final pass holds its span too
        assert!(outcome.elapsed >= Duration::from_millis(180));
    }

    #[test]
    fn test_facility_failure_aborts_stream() {
        let stream = stream(&[0.0, 0.01], InstrumentId::Slot(7), 1, LoopShape::Repeated);
        let mut player = StreamPlayer::new(stream);

        let err = player.play(&FailingPlayer).unwrap_err();

        assert!(matches!(err, PlaybackError::UnknownInstrument(_)));
        assert_ne!(player.state(), PlayerState::Finished);
    }

    #[test]
    fn test_player_runs_its_stream_once() {
        let stream = stream(&[0.0], InstrumentId::Slot(1), 1, LoopShape::Repeated);
        let facility = CapturePlayer::new();
        let mut player = StreamPlayer::new(stream);

        player.play(&facility).unwrap();
        let err = player.play(&facility).unwrap_err();

        assert!(matches!(err, PlaybackError::AlreadyStarted(_)));
        // The rejected replay fires nothing
        assert_eq!(facility.trigger_count(), 1);
    }

    #[test]
    fn test_latency_is_observed_not_compensated() {
        let stream = stream(&[0.0, 0.03], InstrumentId::Slot(1), 1, LoopShape::Repeated);
        let facility = CapturePlayer::new();

        let outcome = StreamPlayer::new(stream).play(&facility).unwrap();

        // Lateness is whatever the sleep overshot; it can only be positive
        assert!(outcome.max_latency < Duration::from_millis(100));
    }
}
