//! Error types shared across the crate

use thiserror::Error;

/// Errors raised by the growth and music engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GroveError {
    /// A branch length that cannot be turned into a pitch (zero, negative or NaN)
    #[error("invalid branch length {length}: pitch conversion needs a positive length")]
    InvalidLength { length: f32 },

    /// A base or derived frequency that is not a positive finite number
    #[error("invalid frequency {frequency} Hz")]
    InvalidFrequency { frequency: f32 },

    #[error("unknown scale '{0}'")]
    UnknownScale(String),

    #[error("unknown oscillator '{0}'")]
    UnknownOscillator(String),

    /// Configuration could not be parsed or failed validation
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GroveError>;
