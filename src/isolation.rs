use std::time::Duration;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime failure reported by an embedded 3D surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderFault {
    #[error("graphics engine error: {0}")]
    Engine(String),
    #[error("rendering context was lost")]
    ContextLost,
    #[error("failed to fetch {url}")]
    ResourceFetch { url: String },
}

/// Navigation request handed to the host router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationIntent {
    /// Return to the application's root route.
    Root,
}

impl NavigationIntent {
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardState {
    Ok,
    Error,
    /// Terminal: the navigation intent has been handed out.
    RedirectIssued,
}

/// Fail-fast guard around one mounted 3D surface.
///
/// The first fault moves the guard to [`GuardState::Error`] and, when
/// redirects are enabled, arms a single redirect deadline. Further faults
/// are ignored; there is no retry.
#[derive(Debug, Clone)]
pub struct RenderGuard {
    state: GuardState,
    fault: Option<RenderFault>,
    redirect_delay: Option<Duration>,
    redirect_at: Option<Duration>,
}

impl RenderGuard {
    /// `redirect_delay` of `None` keeps the fallback on screen without navigating away.
    pub fn new(redirect_delay: Option<Duration>) -> Self {
        Self {
            state: GuardState::Ok,
            fault: None,
            redirect_delay,
            redirect_at: None,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn fault(&self) -> Option<&RenderFault> {
        self.fault.as_ref()
    }

    pub fn has_failed(&self) -> bool {
        self.state != GuardState::Ok
    }

    /// Time at which the pending redirect fires.
    pub fn redirect_deadline(&self) -> Option<Duration> {
        self.redirect_at
    }

    /// Records a fault. Returns true when this call moved the guard out of `Ok`.
    pub fn report(&mut self, fault: RenderFault, now: Duration) -> bool {
        if self.state != GuardState::Ok {
            warn!("ignoring additional render fault: {fault}");
            return false;
        }
        error!("render fault on 3D surface: {fault}");
        self.state = GuardState::Error;
        self.fault = Some(fault);
        self.redirect_at = self.redirect_delay.map(|delay| now + delay);
        true
    }

    /// Returns the navigation intent once its deadline has passed.
    pub fn poll(&mut self, now: Duration) -> Option<NavigationIntent> {
        let deadline = self.redirect_at?;
        if now < deadline {
            return None;
        }
        self.redirect_at = None;
        self.state = GuardState::RedirectIssued;
        info!("redirecting to {} after render fault", NavigationIntent::Root.path());
        Some(NavigationIntent::Root)
    }

    /// Drops any pending redirect.
    pub fn cancel(&mut self) {
        self.redirect_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(3);

    #[test]
    fn first_fault_enters_error_and_arms_redirect() {
        let mut guard = RenderGuard::new(Some(DELAY));
        assert_eq!(guard.state(), GuardState::Ok);
        assert!(guard.report(RenderFault::ContextLost, Duration::from_millis(100)));
        assert_eq!(guard.state(), GuardState::Error);
        assert_eq!(guard.redirect_deadline(), Some(Duration::from_millis(3100)));
        assert_eq!(guard.fault(), Some(&RenderFault::ContextLost));
    }

    #[test]
    fn redirect_is_issued_exactly_once() {
        let mut guard = RenderGuard::new(Some(DELAY));
        guard.report(RenderFault::Engine("shader link failed".into()), Duration::ZERO);
        assert!(!guard.report(RenderFault::ContextLost, Duration::from_secs(1)));
        assert_eq!(guard.poll(Duration::from_secs(2)), None);
        assert_eq!(guard.poll(DELAY), Some(NavigationIntent::Root));
        assert_eq!(guard.poll(Duration::from_secs(10)), None);
        assert_eq!(guard.state(), GuardState::RedirectIssued);
        assert!(!guard.report(RenderFault::ContextLost, Duration::from_secs(11)));
    }

    #[test]
    fn later_faults_do_not_push_back_the_deadline() {
        let mut guard = RenderGuard::new(Some(DELAY));
        guard.report(RenderFault::ContextLost, Duration::ZERO);
        guard.report(
            RenderFault::ResourceFetch {
                url: "/planet/scene.gltf".into(),
            },
            Duration::from_secs(2),
        );
        assert_eq!(guard.redirect_deadline(), Some(DELAY));
        assert_eq!(guard.fault(), Some(&RenderFault::ContextLost));
    }

    #[test]
    fn cancelled_guard_never_redirects() {
        let mut guard = RenderGuard::new(Some(DELAY));
        guard.report(RenderFault::ContextLost, Duration::ZERO);
        guard.cancel();
        assert_eq!(guard.poll(Duration::from_secs(60)), None);
        assert_eq!(guard.state(), GuardState::Error);
    }

    #[test]
    fn guard_without_redirect_stays_in_error() {
        let mut guard = RenderGuard::new(None);
        guard.report(RenderFault::ContextLost, Duration::ZERO);
        assert_eq!(guard.redirect_deadline(), None);
        assert_eq!(guard.poll(Duration::from_secs(60)), None);
        assert!(guard.has_failed());
    }
}
