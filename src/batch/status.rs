use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::DteError;

/// Submission state of one document.
///
/// ```text
/// Pending -> Submitted -> Completed
///                     \-> Failed -> Submitted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Submitted,
    Completed,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Submitted)
                | (Self::Submitted, Self::Completed)
                | (Self::Submitted, Self::Failed)
                | (Self::Failed, Self::Submitted)
        )
    }

    pub fn transition(self, next: Self) -> Result<Self, DteError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DteError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether a contingency batch should report a document in this state.
    pub fn needs_reporting(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;

    #[test]
    fn allowed_edges() {
        assert!(Pending.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Completed));
        assert!(Submitted.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Submitted));
    }

    #[test]
    fn completed_is_terminal() {
        for next in [Pending, Submitted, Completed, Failed] {
            assert!(!Completed.can_transition_to(next));
        }
    }

    #[test]
    fn pending_cannot_skip_submission() {
        match Pending.transition(Completed) {
            Err(DteError::InvalidTransition { from, to }) => {
                assert_eq!(from, "pending");
                assert_eq!(to, "completed");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn only_pending_and_failed_need_reporting() {
        assert!(Pending.needs_reporting());
        assert!(Failed.needs_reporting());
        assert!(!Submitted.needs_reporting());
        assert!(!Completed.needs_reporting());
    }
}
