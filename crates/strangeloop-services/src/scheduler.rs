//! Concurrent stream scheduling
//!
//! One named OS thread per stream, spawned in order, joined together.
//! There is no start barrier: per-stream scheduling is relative to each
//! stream's own origin, so spawn skew stays the only cross-stream phase
//! error and does not compound. Once started, streams run to completion;
//! there is no cancellation path.

use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{info, warn};

use strangeloop_core::RunSet;

use crate::playback::{PlaybackError, SamplePlayer};
use crate::player::{StreamOutcome, StreamPlayer};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),
    #[error("Stream '{0}' panicked")]
    StreamPanicked(String),
    #[error("Failed to spawn thread for stream '{label}': {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },
}

/// Play every stream in the run set concurrently and wait for all of them
///
/// Results come back in stream order. A stream that fails or panics never
/// stops its siblings; its slot reports the error and the rest play out.
/// The facility is the only resource the streams share.
pub fn run_concurrently(
    run_set: RunSet,
    facility: Arc<dyn SamplePlayer>,
) -> Vec<Result<StreamOutcome, SchedulerError>> {
    let streams = run_set.into_streams();
    info!(streams = streams.len(), "Concurrent playback started");

    let mut spawned = Vec::with_capacity(streams.len());
    for (idx, stream) in streams.into_iter().enumerate() {
        let label = stream.label().to_string();
        let facility = facility.clone();
        let handle = thread::Builder::new()
            .name(format!("stream-{idx}"))
            .spawn(move || StreamPlayer::new(stream).play(facility.as_ref()));
        spawned.push((label, handle));
    }

    let mut results = Vec::with_capacity(spawned.len());
    for (label, handle) in spawned {
        let result = match handle {
            Ok(handle) => match handle.join() {
                Ok(outcome) => outcome.map_err(SchedulerError::from),
                Err(_) => {
                    warn!(stream = %label, "Stream thread panicked");
                    Err(SchedulerError::StreamPanicked(label))
                }
            },
            Err(source) => {
                warn!(stream = %label, "Failed to spawn stream thread");
                Err(SchedulerError::Spawn { label, source })
            }
        };
        results.push(result);
    }

    info!(
        finished = results.iter().filter(|r| r.is_ok()).count(),
        failed = results.iter().filter(|r| r.is_err()).count(),
        "Concurrent playback done"
    );

    results
}
