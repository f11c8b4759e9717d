//! PollerActor - Runs the recurring sweep for a scheduler
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → sweep all units → append alerts to the global log
//!     ↑
//!     └─── Commands (PollNow, Shutdown)
//! ```
//!
//! The first tick fires immediately, so starting the poller sweeps right
//! away and then once per interval. Commands are polled before the timer,
//! so a queued Shutdown always wins over a ready tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, instrument, trace, warn};

use crate::error::{MonitorError, MonitorResult};
use crate::scheduler::Registry;

use super::messages::{PollerCommand, SweepReport};

/// Actor owning the interval timer of one scheduler
pub struct PollerActor {
    /// Units and alert log shared with the scheduler
    registry: Arc<Mutex<Registry>>,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<PollerCommand>,

    /// Time between two sweeps
    interval_duration: Duration,

    /// Set by the handle on shutdown, read under the registry lock
    stopped: Arc<AtomicBool>,
}

impl PollerActor {
    pub(crate) fn new(
        registry: Arc<Mutex<Registry>>,
        command_rx: mpsc::Receiver<PollerCommand>,
        interval_duration: Duration,
        stopped: Arc<AtomicBool>,
    ) -> Self {
        Self {
            registry,
            command_rx,
            interval_duration,
            stopped,
        }
    }

    /// Run the actor's main loop
    ///
    /// Runs until a Shutdown command arrives or every handle is dropped.
    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting poller actor");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(PollerCommand::PollNow { respond_to }) => {
                            debug!("received PollNow command");
                            // dropping respond_to reports PollerStopped to the caller
                            if let Some(report) = self.sweep() {
                                let _ = respond_to.send(report);
                            }
                        }

                        Some(PollerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.sweep();
                }
            }
        }

        debug!("poller actor stopped");
    }

    /// Sweep all units, unless the handle was shut down in the meantime
    fn sweep(&self) -> Option<SweepReport> {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        if self.stopped.load(Ordering::Acquire) {
            trace!("poller shut down, skipping sweep");
            return None;
        }
        Some(registry.sweep())
    }
}

/// Handle for controlling a PollerActor
#[derive(Debug, Clone)]
pub struct PollerHandle {
    sender: mpsc::Sender<PollerCommand>,
    abort: AbortHandle,
    stopped: Arc<AtomicBool>,
}

impl PollerHandle {
    /// Spawn the actor on the current Tokio runtime
    pub(crate) fn spawn(
        registry: Arc<Mutex<Registry>>,
        interval_duration: Duration,
    ) -> MonitorResult<Self> {
        if interval_duration.is_zero() {
            return Err(MonitorError::InvalidInterval(interval_duration));
        }
        let runtime = Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let stopped = Arc::new(AtomicBool::new(false));

        let actor = PollerActor::new(registry, cmd_rx, interval_duration, Arc::clone(&stopped));
        let task = runtime.spawn(actor.run());

        Ok(Self {
            sender: cmd_tx,
            abort: task.abort_handle(),
            stopped,
        })
    }

    /// Ask the actor for an immediate sweep and wait for its report
    pub async fn poll_now(&self) -> MonitorResult<SweepReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::PollNow { respond_to: tx })
            .await
            .map_err(|_| MonitorError::PollerStopped)?;

        rx.await.map_err(|_| MonitorError::PollerStopped)
    }

    /// Stop the actor after any in-flight sweep
    ///
    /// No sweep starts once this returns; one already holding the registry
    /// lock runs to completion.
    pub fn shutdown(self) {
        self.stopped.store(true, Ordering::Release);
        if self.sender.try_send(PollerCommand::Shutdown).is_err() {
            // queue full or actor already gone
            self.abort.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}
