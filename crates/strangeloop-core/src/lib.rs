//! strangeloop-core: Domain types for the strangeloop sequencing engine

pub mod attractor;
pub mod conditioner;
mod error;
mod event;
mod instrument;
mod stream;
pub mod tempo;

pub use attractor::{AxisSeries, RosslerParams, integrate, normalize};
pub use conditioner::{gradient_onsets, onset_timestamps, threshold_onsets};
pub use error::{Result, SequenceError};
pub use event::{Event, EventList};
pub use instrument::{Axis, InstrumentId, InstrumentRegistry, InstrumentSpec};
pub use stream::{LoopShape, RunSet, Stream};
pub use tempo::{Tempo, durations_to_ticks, loop_span, ticks_to_seconds};
