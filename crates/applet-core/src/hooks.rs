//! Hooks — decision points an embedding host can plug into.
//!
//! Every hook is optional: the default method bodies describe what happens
//! when a host does not care. Decisions are explicit enums rather than
//! booleans or magic numbers.

use std::time::Duration;

use applet_protocol::{ActivityRequest, ActivityResponse, ExecuteAction, InvocationContext};
use serde_json::Value;

use crate::overlay::ProgressOverlay;

/// Whether to go ahead with an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Veto,
}

impl Verdict {
    pub fn is_veto(self) -> bool {
        self == Verdict::Veto
    }
}

impl From<bool> for Verdict {
    fn from(allow: bool) -> Self {
        if allow {
            Verdict::Allow
        } else {
            Verdict::Veto
        }
    }
}

/// What to do after an attempt came back as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the given delay, if attempts remain.
    RetryAfter(Duration),
    /// Retry after the configured default delay, if attempts remain.
    RetryWithDefaultDelay,
    /// Stop and surface the failure.
    GiveUp,
}

impl RetryDecision {
    /// Map the numeric convention: a negative delay means give up.
    pub fn from_millis(delay_ms: i64) -> Self {
        match u64::try_from(delay_ms) {
            Ok(ms) => RetryDecision::RetryAfter(Duration::from_millis(ms)),
            Err(_) => RetryDecision::GiveUp,
        }
    }

    /// Resolve to a concrete delay, or `None` when giving up.
    pub fn delay(self, default: Duration) -> Option<Duration> {
        match self {
            RetryDecision::RetryAfter(delay) => Some(delay),
            RetryDecision::RetryWithDefaultDelay => Some(default),
            RetryDecision::GiveUp => None,
        }
    }
}

/// Host callbacks around card swaps and invocations.
///
/// All methods are synchronous and run on the invoking task.
pub trait AppletHooks: Send + Sync {
    /// Inspect or amend a request before it is sent; veto to send nothing.
    fn prepare_request(&self, _action: &ExecuteAction, _request: &mut ActivityRequest) -> Verdict {
        Verdict::Allow
    }

    /// A new card payload is about to replace the current one.
    fn card_changing(&self, _payload: &Value) -> Verdict {
        Verdict::Allow
    }

    /// A new card is on screen.
    fn card_changed(&self) {}

    /// An attempt came back as a failure; decide whether to retry.
    fn request_completed(&self, _response: &ActivityResponse) -> RetryDecision {
        RetryDecision::RetryWithDefaultDelay
    }

    /// Supply the progress overlay for an invocation; `None` uses the spinner.
    fn create_progress_overlay(&self, _context: InvocationContext) -> Option<ProgressOverlay> {
        None
    }
}

/// Hooks that accept everything and use all defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl AppletHooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_retry_convention() {
        assert_eq!(RetryDecision::from_millis(-1), RetryDecision::GiveUp);
        assert_eq!(
            RetryDecision::from_millis(0),
            RetryDecision::RetryAfter(Duration::ZERO)
        );
        assert_eq!(
            RetryDecision::from_millis(250),
            RetryDecision::RetryAfter(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_delay_resolution() {
        let default = Duration::from_secs(3);
        assert_eq!(RetryDecision::RetryWithDefaultDelay.delay(default), Some(default));
        assert_eq!(
            RetryDecision::RetryAfter(Duration::from_millis(10)).delay(default),
            Some(Duration::from_millis(10))
        );
        assert_eq!(RetryDecision::GiveUp.delay(default), None);
    }

    #[test]
    fn test_default_hooks_allow_everything() {
        let hooks = DefaultHooks;
        let action = ExecuteAction::new("go");
        let mut request =
            ActivityRequest::new("app", &action, InvocationContext::UserInteraction);

        assert_eq!(hooks.prepare_request(&action, &mut request), Verdict::Allow);
        assert_eq!(hooks.card_changing(&Value::Null), Verdict::Allow);
        assert_eq!(
            hooks.request_completed(&ActivityResponse::failure("x")),
            RetryDecision::RetryWithDefaultDelay
        );
        assert!(hooks
            .create_progress_overlay(InvocationContext::AutoRefresh)
            .is_none());
        assert!(Verdict::from(false).is_veto());
    }
}
