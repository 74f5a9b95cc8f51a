//! Streams and run sets: what plays, how often, in which convention

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};
use crate::event::EventList;
use crate::instrument::InstrumentRegistry;

/// How an event list encodes its repetitions
///
/// Both conventions are in use; which one applies is per-stream
/// configuration, not a global rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopShape {
    /// The list covers one pass; the player replays it `loops` times,
    /// restarting its clock each pass.
    #[default]
    Repeated,
    /// The list already spans every repetition; the player runs it once
    /// against a single clock.
    Premultiplied,
}

/// One independently scheduled sequence
#[derive(Debug, Clone)]
pub struct Stream {
    label: String,
    events: EventList,
    loops: u32,
    shape: LoopShape,
    span: Option<Duration>,
}

impl Stream {
    /// Create a stream; a zero loop count is rejected here, before any
    /// playback machinery sees it.
    pub fn new(
        label: impl Into<String>,
        events: EventList,
        loops: u32,
        shape: LoopShape,
    ) -> Result<Self> {
        if loops == 0 {
            return Err(SequenceError::InvalidLoopCount(loops));
        }
        Ok(Self {
            label: label.into(),
            events,
            loops,
            shape,
            span: None,
        })
    }

    /// Hold until `span` after the last event of each pass, so streams
    /// with different rhythm lengths stay aligned at loop boundaries.
    pub fn with_span(mut self, span: Duration) -> Self {
        self.span = Some(span);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn events(&self) -> &EventList {
        &self.events
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn shape(&self) -> LoopShape {
        self.shape
    }

    pub fn span(&self) -> Option<Duration> {
        self.span
    }

    /// Events in one loop pass, used for step numbering in diagnostics
    pub fn events_per_loop(&self) -> usize {
        match self.shape {
            LoopShape::Repeated => self.events.len().max(1),
            LoopShape::Premultiplied => (self.events.len() / self.loops as usize).max(1),
        }
    }

    /// Passes the player runs: `loops` for a repeated list, one for a
    /// premultiplied list.
    pub fn passes(&self) -> u32 {
        match self.shape {
            LoopShape::Repeated => self.loops,
            LoopShape::Premultiplied => 1,
        }
    }

    /// Total triggers across all passes
    pub fn total_events(&self) -> usize {
        self.events.len() * self.passes() as usize
    }
}

/// The streams created together in one pass, played back concurrently
///
/// Owns the instrument registry the playback facility resolves against;
/// discarded after one playback pass.
#[derive(Debug, Clone, Default)]
pub struct RunSet {
    streams: Vec<Stream>,
    registry: Arc<InstrumentRegistry>,
}

impl RunSet {
    pub fn new(registry: InstrumentRegistry) -> Self {
        Self {
            streams: Vec::new(),
            registry: Arc::new(registry),
        }
    }

    pub fn add_stream(&mut self, stream: Stream) {
        self.streams.push(stream);
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn registry(&self) -> Arc<InstrumentRegistry> {
        self.registry.clone()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Give up the streams for playback
    pub fn into_streams(self) -> Vec<Stream> {
        self.streams
    }
}
