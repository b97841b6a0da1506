//! Connectivity monitor
//!
//! Observes transitions between online and offline and signals the sync
//! orchestrator. There is no intermediate state: the signal is binary, and
//! a transition trigger is emitted exactly once per actual state change
//! (no duplicate "online" triggers while already online).
//!
//! The monitor also treats the client regaining foreground focus while
//! already online as an additional drain trigger, to recover from missed
//! transition events (e.g. background throttling).
//!
//! If the platform provides no reliable signal, the monitor degrades to
//! "assume online" and lets individual remote calls fail fast into the
//! offline fallback path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Capacity of the trigger channel
///
/// Triggers coalesce: if one is already waiting, dropping another loses
/// nothing, so a small buffer is enough.
const TRIGGER_BUFFER: usize = 8;

/// Binary connectivity signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    /// Remote calls are expected to succeed
    Online,
    /// Remote calls are expected to fail; mutations queue locally
    Offline,
}

impl ConnectivityState {
    /// Returns true for [`ConnectivityState::Online`]
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectivityState::Online)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityState::Online => write!(f, "online"),
            ConnectivityState::Offline => write!(f, "offline"),
        }
    }
}

/// Reason a drain cycle should be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The client transitioned from offline to online
    CameOnline,
    /// The client regained foreground focus while already online
    FocusRegained,
}

/// Platform hook supplying a real connectivity signal
///
/// Polled periodically by [`ConnectivityMonitor::run_probe`]. Absence of a
/// probe means the monitor keeps whatever state it was given manually,
/// defaulting to online.
#[async_trait::async_trait]
pub trait IConnectivityProbe: Send + Sync {
    /// Returns true if the remote service is currently reachable
    async fn is_reachable(&self) -> bool;
}

/// Observes connectivity and emits drain triggers
///
/// State is held behind a `watch` channel so any number of observers can
/// subscribe; triggers flow through a small `mpsc` channel consumed by the
/// [`SyncRunner`](crate::runner::SyncRunner).
pub struct ConnectivityMonitor {
    state_tx: watch::Sender<ConnectivityState>,
    trigger_tx: mpsc::Sender<SyncTrigger>,
}

impl ConnectivityMonitor {
    /// Creates a monitor assuming connectivity (the degraded default)
    ///
    /// # Returns
    /// A tuple of `(ConnectivityMonitor, mpsc::Receiver<SyncTrigger>)`. The
    /// receiver is handed to the runner that executes drain cycles.
    pub fn new() -> (Self, mpsc::Receiver<SyncTrigger>) {
        Self::with_initial_state(ConnectivityState::Online)
    }

    /// Creates a monitor with an explicit initial state
    pub fn with_initial_state(
        initial: ConnectivityState,
    ) -> (Self, mpsc::Receiver<SyncTrigger>) {
        let (state_tx, _) = watch::channel(initial);
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_BUFFER);

        info!(state = %initial, "Connectivity monitor created");

        (
            Self {
                state_tx,
                trigger_tx,
            },
            trigger_rx,
        )
    }

    /// Returns the current connectivity state
    pub fn state(&self) -> ConnectivityState {
        *self.state_tx.borrow()
    }

    /// Returns true while the monitor reports online
    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    /// Subscribes to state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.state_tx.subscribe()
    }

    /// Records a state observation, emitting a trigger only on transitions
    ///
    /// Setting the state it already holds is a no-op: no event, no trigger.
    /// An offline-to-online transition emits [`SyncTrigger::CameOnline`].
    pub fn set_state(&self, next: ConnectivityState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        if changed {
            info!(state = %next, "Connectivity changed");
            if next.is_online() {
                // A full buffer means a trigger is already waiting; they coalesce.
                let _ = self.trigger_tx.try_send(SyncTrigger::CameOnline);
            }
        }
    }

    /// Convenience for `set_state(Online)`
    pub fn set_online(&self) {
        self.set_state(ConnectivityState::Online);
    }

    /// Convenience for `set_state(Offline)`
    pub fn set_offline(&self) {
        self.set_state(ConnectivityState::Offline);
    }

    /// Signals that the client regained foreground focus
    ///
    /// While online this emits an extra drain trigger; while offline it
    /// does nothing (the eventual online transition will trigger instead).
    pub fn focus_regained(&self) {
        if self.is_online() {
            debug!("Focus regained while online, requesting drain");
            let _ = self.trigger_tx.try_send(SyncTrigger::FocusRegained);
        }
    }

    /// Polls a platform probe until shutdown, feeding observations in
    ///
    /// # Arguments
    /// * `probe` - The platform connectivity check
    /// * `interval` - How often to poll
    /// * `shutdown` - Token that stops the loop
    pub async fn run_probe(
        &self,
        probe: Arc<dyn IConnectivityProbe>,
        interval: Duration,
        shutdown: CancellationToken,
    ) {
        info!(interval_secs = interval.as_secs(), "Connectivity probe starting");

        let mut timer = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Connectivity probe stopping");
                    break;
                }
                _ = timer.tick() => {
                    let reachable = probe.is_reachable().await;
                    self.set_state(if reachable {
                        ConnectivityState::Online
                    } else {
                        ConnectivityState::Offline
                    });
                }
            }
        }
    }
}
