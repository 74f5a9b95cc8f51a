//! Sample playback facility
//!
//! Actual sound lives behind [`SamplePlayer`]; the engine only needs to
//! trigger an instrument at the right instant and, for the final event of
//! a stream, wait for that one triggered instance to finish. Facilities
//! are invoked concurrently from every stream thread.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};
use thiserror::Error;
use tracing::info;

use strangeloop_core::{InstrumentId, InstrumentRegistry};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Unknown instrument: {0:?}")]
    UnknownInstrument(InstrumentId),
    #[error("Stream '{0}' already started")]
    AlreadyStarted(String),
}

/// Tracks one triggered playback instance until it finishes
#[derive(Debug)]
pub struct PlaybackHandle {
    inner: HandleInner,
}

#[derive(Debug)]
enum HandleInner {
    /// Finished the moment it was handed out
    Done,
    /// Finishes once `length` has passed since `start`
    Deadline { start: Instant, length: Duration },
    /// Finishes when the backend signals, or drops its sender
    Signal(Receiver<()>),
}

impl PlaybackHandle {
    /// A handle that is already complete
    pub fn completed() -> Self {
        Self { inner: HandleInner::Done }
    }

    /// A handle that completes after `length`
    pub fn lasting(length: Duration) -> Self {
        Self {
            inner: HandleInner::Deadline {
                start: Instant::now(),
                length,
            },
        }
    }

    /// A handle completed by an explicit backend signal
    pub fn on_signal() -> (Self, CompletionSender) {
        let (tx, rx) = bounded(1);
        (Self { inner: HandleInner::Signal(rx) }, CompletionSender(tx))
    }

    /// Block until this playback instance has finished
    pub fn wait_done(self) {
        match self.inner {
            HandleInner::Done => {}
            HandleInner::Deadline { start, length } => {
                let remaining = length.saturating_sub(start.elapsed());
                if !remaining.is_zero() {
                    thread::sleep(remaining);
                }
            }
            HandleInner::Signal(rx) => {
                // A dropped sender counts as finished
                let _ = rx.recv();
            }
        }
    }
}

/// Completion side of a signal-driven handle
#[derive(Debug, Clone)]
pub struct CompletionSender(Sender<()>);

impl CompletionSender {
    /// Mark the playback instance finished
    pub fn finish(&self) {
        let _ = self.0.try_send(());
    }
}

/// A sample-triggering backend
///
/// `trigger` must not block for the length of the sample; it starts the
/// sound and returns a handle for whoever needs to wait on it.
pub trait SamplePlayer: Send + Sync {
    fn trigger(&self, instrument: InstrumentId) -> Result<PlaybackHandle, PlaybackError>;
}

/// Reports triggers on the terminal instead of producing sound
///
/// Resolves the instrument in the registry and returns a handle lasting
/// the sample's nominal length.
pub struct ConsolePlayer {
    registry: Arc<InstrumentRegistry>,
}

impl ConsolePlayer {
    pub fn new(registry: Arc<InstrumentRegistry>) -> Self {
        Self { registry }
    }
}

impl SamplePlayer for ConsolePlayer {
    fn trigger(&self, instrument: InstrumentId) -> Result<PlaybackHandle, PlaybackError> {
        let spec = self
            .registry
            .get(instrument)
            .ok_or(PlaybackError::UnknownInstrument(instrument))?;
        info!(sample = %spec.label, "Trigger");
        Ok(PlaybackHandle::lasting(spec.nominal_len))
    }
}
