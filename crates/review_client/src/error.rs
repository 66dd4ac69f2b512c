use shared::domain::InstanceIndex;
use thiserror::Error;

use crate::view::NoticeKind;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("instance {index} is out of range")]
    OutOfRange { index: InstanceIndex },
    #[error("missing required answers: {}", .missing.join(", "))]
    ValidationIncomplete { missing: Vec<&'static str> },
    #[error("no instance is currently displayed")]
    NothingDisplayed,
    #[error("submission rejected: evaluator is not logged in")]
    Unauthenticated,
    #[error("submission failed: {reason}")]
    SubmissionFailed { reason: String },
    #[error("failed to load instance {index}: {source}")]
    LoadFailed {
        index: InstanceIndex,
        source: anyhow::Error,
    },
}

impl ReviewError {
    pub fn notice_kind(&self) -> NoticeKind {
        match self {
            Self::OutOfRange { .. } => NoticeKind::OutOfRange,
            Self::ValidationIncomplete { .. } => NoticeKind::ValidationIncomplete,
            Self::NothingDisplayed | Self::SubmissionFailed { .. } => NoticeKind::SubmissionFailed,
            Self::Unauthenticated => NoticeKind::Unauthenticated,
            Self::LoadFailed { .. } => NoticeKind::LoadFailed,
        }
    }
}
