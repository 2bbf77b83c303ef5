use std::time::Duration;

use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Pending { deadline: Duration },
    Loaded,
    /// The wait bound elapsed before the assets arrived.
    Abandoned,
    Cancelled,
}

/// Tracks asynchronous asset loading with an upper bound on the wait.
#[derive(Debug, Clone)]
pub struct LoadingGate {
    state: LoadState,
}

impl Default for LoadingGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingGate {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
        }
    }

    pub fn start(now: Duration, max_wait: Duration) -> Self {
        Self {
            state: LoadState::Pending {
                deadline: now + max_wait,
            },
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LoadState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Duration> {
        match self.state {
            LoadState::Pending { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Marks the assets as ready. Returns true if the gate was pending.
    pub fn loaded(&mut self) -> bool {
        if !self.is_pending() {
            debug!("load completion ignored in state {:?}", self.state);
            return false;
        }
        self.state = LoadState::Loaded;
        true
    }

    /// Abandons the wait once the deadline passes. Returns true on the call
    /// that performs the transition.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.state {
            LoadState::Pending { deadline } if now >= deadline => {
                warn!("asset loading exceeded its wait bound; dropping the placeholder");
                self.state = LoadState::Abandoned;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        if self.is_pending() {
            self.state = LoadState::Cancelled;
        }
    }
}
