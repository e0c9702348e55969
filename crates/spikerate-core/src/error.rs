//! Configuration error type for the core crate.

use crate::stream::StreamId;

/// Errors raised when configuration values are set or streams are synced.
///
/// These are configuration-time errors only: the per-sample processing path
/// never returns a `Result`. Rejecting bad values here keeps non-finite decay
/// factors and amplitudes out of the recurrence entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Time constant was zero, negative, or non-finite.
    NonPositiveTimeConstant(f64),
    /// Sample rate was zero, negative, or non-finite.
    NonPositiveSampleRate(f64),
    /// The stream id is not in the processor's stream set.
    UnknownStream(StreamId),
    /// The same stream id appeared twice in a sync.
    DuplicateStream(StreamId),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NonPositiveTimeConstant(v) => {
                write!(f, "time constant must be a positive finite value, got {v}")
            }
            Self::NonPositiveSampleRate(v) => {
                write!(f, "sample rate must be a positive finite value, got {v}")
            }
            Self::UnknownStream(id) => write!(f, "unknown stream {id}"),
            Self::DuplicateStream(id) => write!(f, "stream {id} declared twice"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
