//! Confidence thresholds per capture step
//!
//! The real scoring algorithm lives with the biometric provider; this
//! policy only decides how confident a "success" has to be before the
//! cursor advances. Configurable per deployment, 0.60 everywhere by
//! default.

use crate::CaptureStep;
use serde::{Deserialize, Serialize};

/// Default minimum confidence for every step
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.60;

/// Per-step minimum confidence policy
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub face_front: f64,
    pub face_side: f64,
    pub document: f64,
    pub combined: f64,
    pub voice: f64,
}

impl ConfidencePolicy {
    /// Uniform policy: the same minimum for every step
    pub fn uniform(minimum: f64) -> Self {
        Self {
            face_front: minimum,
            face_side: minimum,
            document: minimum,
            combined: minimum,
            voice: minimum,
        }
    }

    /// The minimum confidence required for a step
    pub fn minimum_for(&self, step: CaptureStep) -> f64 {
        match step {
            CaptureStep::FaceFront => self.face_front,
            CaptureStep::FaceSide => self.face_side,
            CaptureStep::Document => self.document,
            CaptureStep::Combined => self.combined,
            CaptureStep::Voice => self.voice,
        }
    }

    /// Whether a score clears the bar for a step
    pub fn accepts(&self, step: CaptureStep, confidence: f64) -> bool {
        confidence >= self.minimum_for(step)
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::uniform(DEFAULT_MIN_CONFIDENCE)
    }
}
