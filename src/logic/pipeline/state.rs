use serde::{Deserialize, Serialize};

use crate::logic::errors::ErrorKind;

/// Per-request lifecycle. Linear; `Rejected` can follow any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum PipelineState {
    Validating,
    Imputing,
    Scoring,
    Classifying,
    Done,
    Rejected(ErrorKind),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Rejected(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Validating => "Validating",
            PipelineState::Imputing => "Imputing",
            PipelineState::Scoring => "Scoring",
            PipelineState::Classifying => "Classifying",
            PipelineState::Done => "Done",
            PipelineState::Rejected(_) => "Rejected",
        }
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Rejected(kind) => write!(f, "Rejected({})", kind),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Rejected(ErrorKind::Schema).is_terminal());
        assert!(!PipelineState::Scoring.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PipelineState::Rejected(ErrorKind::Range).to_string(),
            "Rejected(range)"
        );
        assert_eq!(PipelineState::Imputing.to_string(), "Imputing");
    }
}
