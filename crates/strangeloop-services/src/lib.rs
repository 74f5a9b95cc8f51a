//! strangeloop-services: Playback facilities, stream players, and the
//! multi-stream scheduler

pub mod playback;
pub mod player;
pub mod scheduler;

pub use playback::{CompletionSender, ConsolePlayer, PlaybackError, PlaybackHandle, SamplePlayer};
pub use player::{PlayerState, StreamOutcome, StreamPlayer};
pub use scheduler::{SchedulerError, run_concurrently};
