//! One-shot trigger for interactive reauthentication.

use crate::session::SessionError;

/// Fires exactly once per transition into a failed session.
///
/// The trigger compares the error observed on the previous render with the
/// current one: entering `RefreshFailed` fires, staying in it does not, and
/// a cleared error re-arms the trigger for the next failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReauthTrigger {
    last: Option<SessionError>,
}

impl ReauthTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the error state of the current render and report whether an
    /// interactive sign-in should be started.
    pub fn observe(&mut self, current: Option<SessionError>) -> bool {
        let fire = current == Some(SessionError::RefreshFailed)
            && self.last != Some(SessionError::RefreshFailed);
        self.last = current;
        fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_on_transition_into_failure() {
        let mut trigger = ReauthTrigger::new();
        assert!(!trigger.observe(None));
        assert!(trigger.observe(Some(SessionError::RefreshFailed)));
        assert!(!trigger.observe(Some(SessionError::RefreshFailed)));
        assert!(!trigger.observe(Some(SessionError::RefreshFailed)));
    }

    #[test]
    fn fires_immediately_when_first_observation_is_failure() {
        let mut trigger = ReauthTrigger::new();
        assert!(trigger.observe(Some(SessionError::RefreshFailed)));
    }

    #[test]
    fn rearms_after_error_clears() {
        let mut trigger = ReauthTrigger::new();
        assert!(trigger.observe(Some(SessionError::RefreshFailed)));
        assert!(!trigger.observe(None));
        assert!(trigger.observe(Some(SessionError::RefreshFailed)));
    }
}
