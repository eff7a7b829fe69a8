//! Application status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where the application is between upload and a finished card.
///
/// ```text
/// Idle ──► Processing ──► Success ──► Idle
///               │                      ▲
///               ▼                      │
///             Error ───────────────────┘
///               │
///               └──► Processing   (retry with the kept image)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    /// Waiting for an image or for the user to start processing.
    #[default]
    Idle,
    /// Inference is running.
    Processing,
    /// A card exists.
    Success,
    /// Inference failed; the image is kept.
    Error,
}

impl AppStatus {
    pub fn is_processing(&self) -> bool {
        matches!(self, AppStatus::Processing)
    }

    /// Whether processing can be started from here.
    pub fn can_process(&self) -> bool {
        self.can_transition_to(&AppStatus::Processing)
    }
}

impl StateMachine for AppStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AppStatus::*;
        matches!(
            (self, target),
            (Idle, Processing)
                | (Processing, Success)
                | (Processing, Error)
                | (Success, Idle)
                | (Error, Idle)
                | (Error, Processing)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AppStatus::*;
        match self {
            Idle => vec![Processing],
            Processing => vec![Success, Error],
            Success => vec![Idle],
            Error => vec![Idle, Processing],
        }
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppStatus::Idle => "idle",
            AppStatus::Processing => "processing",
            AppStatus::Success => "success",
            AppStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;

    #[test]
    fn default_is_idle() {
        assert_eq!(AppStatus::default(), AppStatus::Idle);
    }

    #[test]
    fn happy_path_transitions() {
        let status = AppStatus::Idle;
        let status = status.transition_to(AppStatus::Processing).unwrap();
        let status = status.transition_to(AppStatus::Success).unwrap();
        let status = status.transition_to(AppStatus::Idle).unwrap();
        assert_eq!(status, AppStatus::Idle);
    }

    #[test]
    fn error_allows_retry_and_reset() {
        assert!(AppStatus::Error.can_process());
        assert!(AppStatus::Error.can_transition_to(&AppStatus::Idle));
    }

    #[test]
    fn processing_cannot_restart_or_go_idle() {
        assert!(!AppStatus::Processing.can_process());
        assert!(matches!(
            AppStatus::Processing.transition_to(AppStatus::Idle),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "state_transition"
        ));
    }

    #[test]
    fn success_cannot_reprocess_directly() {
        assert!(!AppStatus::Success.can_process());
        assert!(AppStatus::Idle.transition_to(AppStatus::Success).is_err());
    }

    #[test]
    fn valid_transitions_agree_with_can_transition() {
        let all = [
            AppStatus::Idle,
            AppStatus::Processing,
            AppStatus::Success,
            AppStatus::Error,
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn no_status_is_terminal() {
        assert!(!AppStatus::Success.is_terminal());
        assert!(!AppStatus::Error.is_terminal());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AppStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(AppStatus::Success.to_string(), "success");
    }
}
