//! Message types for the poller actor
//!
//! Commands travel over an mpsc channel to the single poller task;
//! request/response pairs carry a oneshot sender for the reply.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Outcome of one sweep over all registered units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Units polled successfully
    pub polled: usize,

    /// Units whose poll failed (logged and skipped)
    pub failed: usize,

    /// Entries appended to the global alert log
    pub new_alerts: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.polled == 0 && self.failed == 0
    }
}

/// Commands that can be sent to the PollerActor
#[derive(Debug)]
pub enum PollerCommand {
    /// Run a sweep right away, outside of the interval timer
    ///
    /// Used for manual "read now" requests while the timer is active.
    PollNow {
        /// Channel to send the report back
        respond_to: oneshot::Sender<SweepReport>,
    },

    /// Stop the timer
    ///
    /// A sweep already in progress completes first.
    Shutdown,
}
