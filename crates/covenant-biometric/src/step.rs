//! Capture steps and their results

use chrono::{DateTime, Utc};
use covenant_types::ContentRef;
use serde::{Deserialize, Serialize};

/// The five capture steps, in protocol order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStep {
    FaceFront,
    FaceSide,
    Document,
    Combined,
    Voice,
}

impl CaptureStep {
    /// The fixed capture sequence
    pub const SEQUENCE: [CaptureStep; 5] = [
        CaptureStep::FaceFront,
        CaptureStep::FaceSide,
        CaptureStep::Document,
        CaptureStep::Combined,
        CaptureStep::Voice,
    ];

    /// Position in the sequence
    pub fn index(&self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|s| s == self)
            .unwrap_or(Self::SEQUENCE.len())
    }

    /// The step after this one, if any
    pub fn next(&self) -> Option<CaptureStep> {
        Self::SEQUENCE.get(self.index() + 1).copied()
    }
}

impl std::fmt::Display for CaptureStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FaceFront => "face_front",
            Self::FaceSide => "face_side",
            Self::Document => "document",
            Self::Combined => "combined",
            Self::Voice => "voice",
        };
        write!(f, "{name}")
    }
}

/// Outcome status of a single capture attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Retry,
    Failed,
}

/// What the capture provider hands us for one step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapturePayload {
    /// Ref to the stored capture blob; the core never sees raw bytes
    pub content_ref: ContentRef,
    /// Provider-supplied status for this attempt
    pub status: StepStatus,
    /// Provider-supplied confidence score, 0.0–1.0
    pub confidence: f64,
}

impl CapturePayload {
    pub fn success(content_ref: ContentRef, confidence: f64) -> Self {
        Self {
            content_ref,
            status: StepStatus::Success,
            confidence,
        }
    }
}

/// The recorded result of the latest attempt at a step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: StepStatus,
    pub confidence: f64,
    pub content_ref: ContentRef,
    pub at: DateTime<Utc>,
}

impl StepRecord {
    pub fn from_payload(payload: &CapturePayload) -> Self {
        Self {
            status: payload.status,
            confidence: payload.confidence,
            content_ref: payload.content_ref.clone(),
            at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }
}
