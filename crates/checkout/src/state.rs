//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of a checkout as it advances.
///
/// State transitions:
/// ```text
/// Validating ──► Creating ──► ReservingStock ──► Finalizing ──► Done
///      │
///      └──► Aborted
/// ```
///
/// `Aborted` is reachable from `Validating` only: once the order header
/// and items exist, later failures are absorbed rather than aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// Cart lines are being re-checked against live stock.
    #[default]
    Validating,

    /// Order header and line items are being written.
    Creating,

    /// Stock decrements are being applied, best-effort.
    ReservingStock,

    /// Cart is being cleared (session and persisted mirror).
    Finalizing,

    /// Checkout completed (terminal state).
    Done,

    /// Validation failed; nothing was mutated (terminal state).
    Aborted,
}

impl CheckoutState {
    /// Returns true if the checkout can still abort without mutation.
    pub fn can_abort(&self) -> bool {
        matches!(self, CheckoutState::Validating)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Done | CheckoutState::Aborted)
    }

    /// Returns the next state in the linear placement sequence.
    pub fn next(&self) -> Option<CheckoutState> {
        match self {
            CheckoutState::Validating => Some(CheckoutState::Creating),
            CheckoutState::Creating => Some(CheckoutState::ReservingStock),
            CheckoutState::ReservingStock => Some(CheckoutState::Finalizing),
            CheckoutState::Finalizing => Some(CheckoutState::Done),
            CheckoutState::Done | CheckoutState::Aborted => None,
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Validating => "Validating",
            CheckoutState::Creating => "Creating",
            CheckoutState::ReservingStock => "ReservingStock",
            CheckoutState::Finalizing => "Finalizing",
            CheckoutState::Done => "Done",
            CheckoutState::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_validating() {
        assert_eq!(CheckoutState::default(), CheckoutState::Validating);
    }

    #[test]
    fn only_validating_can_abort() {
        assert!(CheckoutState::Validating.can_abort());
        assert!(!CheckoutState::Creating.can_abort());
        assert!(!CheckoutState::ReservingStock.can_abort());
        assert!(!CheckoutState::Finalizing.can_abort());
        assert!(!CheckoutState::Done.can_abort());
        assert!(!CheckoutState::Aborted.can_abort());
    }

    #[test]
    fn terminal_states() {
        assert!(!CheckoutState::Validating.is_terminal());
        assert!(!CheckoutState::Creating.is_terminal());
        assert!(!CheckoutState::ReservingStock.is_terminal());
        assert!(!CheckoutState::Finalizing.is_terminal());
        assert!(CheckoutState::Done.is_terminal());
        assert!(CheckoutState::Aborted.is_terminal());
    }

    #[test]
    fn next_walks_the_linear_sequence() {
        let mut state = CheckoutState::Validating;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            state = next;
            visited.push(state);
        }
        assert_eq!(
            visited,
            vec![
                CheckoutState::Validating,
                CheckoutState::Creating,
                CheckoutState::ReservingStock,
                CheckoutState::Finalizing,
                CheckoutState::Done,
            ]
        );
        assert!(CheckoutState::Aborted.next().is_none());
    }

    #[test]
    fn display() {
        assert_eq!(CheckoutState::Validating.to_string(), "Validating");
        assert_eq!(CheckoutState::ReservingStock.to_string(), "ReservingStock");
        assert_eq!(CheckoutState::Aborted.to_string(), "Aborted");
    }

    #[test]
    fn serialization_roundtrip() {
        let state = CheckoutState::Finalizing;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: CheckoutState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
