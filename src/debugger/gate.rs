//! Preconditions shared by commands that need a stopped target.

use crate::errors::LifecycleViolation;
use crate::session::SessionState;

/// Passes only when a live target exists and is currently stopped.
pub fn ensure_stopped(state: SessionState) -> Result<(), LifecycleViolation> {
    match state {
        SessionState::Null => Err(LifecycleViolation::NoSession),
        SessionState::Initialized => Err(LifecycleViolation::NoProcess),
        SessionState::Running => Err(LifecycleViolation::ProcessRunning),
        SessionState::Suspended => Ok(()),
    }
}

/// Passes when no process exists yet, so a new one may be started.
pub fn ensure_no_process(state: SessionState) -> Result<(), LifecycleViolation> {
    if state.has_target() {
        Err(LifecycleViolation::ProcessActive)
    } else {
        Ok(())
    }
}
