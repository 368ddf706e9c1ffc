//! The room's single reaction deadline.
//!
//! Each room has at most one timed window open at a time (the engine
//! enforces one pending action). The deadline sits inside the actor's
//! `tokio::select!` loop: when unarmed it pends forever, so the loop
//! keeps processing commands without a timer branch firing. Arming
//! replaces any previous deadline, which is exactly the semantics a
//! vendetta swap needs.

use std::time::Duration;

use tokio::time::Instant;

/// A re-armable one-shot deadline.
#[derive(Debug, Default)]
pub(crate) struct Deadline {
    armed: Option<Instant>,
}

impl Deadline {
    pub(crate) fn new() -> Self {
        Self { armed: None }
    }

    /// Arms the deadline `window` from now, replacing any previous one.
    pub(crate) fn arm(&mut self, window: Duration) {
        self.armed = Some(Instant::now() + window);
    }

    /// Disarms the deadline. Idempotent.
    pub(crate) fn clear(&mut self) {
        self.armed = None;
    }

    /// Completes when the armed deadline is reached; pends forever when
    /// unarmed. Meant to be polled inside `tokio::select!`, which
    /// recreates the future each loop iteration.
    pub(crate) async fn expired(&self) {
        match self.armed {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }
}

// =====================================================================
// Tests
// =====================================================================
