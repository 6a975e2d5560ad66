/// Crawl target state definitions
///
/// A target moves `Pending -> Fetching -> {Fetched, Failed}`. The two outcomes
/// are terminal; a target is never fetched twice within one run.
use crate::ScraperError;
use std::fmt;

/// Represents the current state of a target in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// Target is in the frontier and waiting to be fetched
    Pending,

    /// Target is currently being loaded, retries included
    Fetching,

    // ===== Terminal States =====
    /// Page was rendered and handed to extraction
    Fetched,

    /// Every attempt failed, or the failure was permanent
    Failed,
}

impl TargetState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fetched | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(&self, next: TargetState) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Fetched)
                | (Self::Fetching, Self::Failed)
        )
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(self, next: TargetState) -> Result<TargetState, ScraperError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ScraperError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!TargetState::Pending.is_terminal());
        assert!(!TargetState::Fetching.is_terminal());
        assert!(TargetState::Fetched.is_terminal());
        assert!(TargetState::Failed.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        let fetching = TargetState::Pending.transition(TargetState::Fetching).unwrap();
        assert_eq!(fetching, TargetState::Fetching);
        assert_eq!(
            fetching.transition(TargetState::Failed).unwrap(),
            TargetState::Failed
        );
        assert_eq!(
            fetching.transition(TargetState::Fetched).unwrap(),
            TargetState::Fetched
        );
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(TargetState::Pending.transition(TargetState::Fetched).is_err());
        assert!(TargetState::Failed.transition(TargetState::Fetching).is_err());
        assert!(TargetState::Fetched.transition(TargetState::Failed).is_err());

        match TargetState::Failed.transition(TargetState::Pending) {
            Err(ScraperError::InvalidTransition { from, to }) => {
                assert_eq!(from, TargetState::Failed);
                assert_eq!(to, TargetState::Pending);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TargetState::Pending), "pending");
        assert_eq!(format!("{}", TargetState::Failed), "failed");
    }
}
