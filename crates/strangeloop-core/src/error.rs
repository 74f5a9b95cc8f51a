//! Error types for strangeloop

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("Invalid tempo: {0} BPM (must be positive)")]
    InvalidTempo(f64),
    #[error("Invalid loop count: {0} (must be at least 1)")]
    InvalidLoopCount(u32),
    #[error("Invalid duration at index {index}: {value} (must be positive)")]
    InvalidDuration { index: usize, value: f64 },
    #[error("Length mismatch: {timestamps} timestamps vs {instruments} instruments")]
    LengthMismatch { timestamps: usize, instruments: usize },
    #[error("Malformed event at index {index}: timestamp {value}")]
    MalformedEvent { index: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, SequenceError>;
