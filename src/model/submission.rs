//! Lifecycle of a single send attempt.

/// Where the most recent send attempt stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing sent yet.
    #[default]
    Idle,
    /// A request is in flight; the send control is busy.
    Sending,
    /// The gateway accepted the last message.
    Succeeded,
    /// The last attempt failed with this reason.
    Failed(String),
}

impl SubmissionState {
    pub fn is_sending(&self) -> bool {
        matches!(self, Self::Sending)
    }

    /// `true` for every state a finished attempt can land in.
    pub fn is_resting(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Failure reason, if the last attempt failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_states() {
        assert!(!SubmissionState::Idle.is_resting());
        assert!(!SubmissionState::Sending.is_resting());
        assert!(SubmissionState::Succeeded.is_resting());
        assert!(SubmissionState::Failed("x".to_string()).is_resting());
    }

    #[test]
    fn test_failure_reason() {
        let failed = SubmissionState::Failed("SMTP error".to_string());
        assert_eq!(failed.failure(), Some("SMTP error"));
        assert_eq!(SubmissionState::Succeeded.failure(), None);
    }
}
