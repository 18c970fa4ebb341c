//! Biometric protocol errors

use crate::CaptureStep;

/// Errors from the signature sequencer
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BiometricError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Sequence violation: the submitted step is not the expected one
    #[error("step '{submitted}' is out of order; expected '{expected}'")]
    OutOfOrder {
        expected: CaptureStep,
        submitted: CaptureStep,
    },

    /// Quality violation: a success below the policy minimum requires
    /// recapture of the same step
    #[error(
        "confidence {confidence:.2} for step '{step}' is below the {minimum:.2} minimum; recapture required"
    )]
    BelowThreshold {
        step: CaptureStep,
        confidence: f64,
        minimum: f64,
    },

    #[error("confidence score {0} is outside 0.0–1.0")]
    ScoreOutOfRange(f64),

    #[error("session already completed its signature")]
    AlreadyComplete,

    #[error("capture steps incomplete: {remaining} remaining before signature")]
    StepsIncomplete { remaining: usize },

    /// Device/capture failure reported by the caller; never mutates
    /// session state
    #[error("capture error: {0}")]
    Capture(String),
}

/// Result type alias for biometric operations
pub type BiometricResult<T> = Result<T, BiometricError>;
