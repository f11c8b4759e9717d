//! Actor-based recurring polling
//!
//! The scheduler's timer runs as an independent async task (the poller
//! actor) communicating with its owner over a Tokio mpsc channel.
//!
//! ## Architecture Overview
//!
//! ```text
//!   MonitoringScheduler ──commands──▶ PollerActor
//!          │                              │ every interval
//!          │ full_poll() (caller thread)  │ sweep()
//!          ▼                              ▼
//!        Arc<Mutex<Registry>>  (units + global alert log)
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: `PollNow` and `Shutdown` over mpsc
//! 2. **Request/Response**: oneshot channel carrying the sweep report
//! 3. **Shared state**: every sweep, timed or manual, serializes on the
//!    registry mutex

pub mod messages;
pub mod poller;
