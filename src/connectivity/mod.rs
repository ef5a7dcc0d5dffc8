// ABOUTME: Connectivity monitor deriving online state from the device network signal
// ABOUTME: Reconnects the document store single-flight and debounces the preference resync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Connectivity Monitor
//!
//! The device reports `is_connected` plus a tri-state `is_internet_reachable`.
//! The layer is online when connected and reachability is not known to be
//! false.
//!
//! On offline to online:
//! - the document store network is cycled (disable, pause, enable), at most
//!   one cycle in flight process-wide;
//! - the attached [`ResyncHook`] runs after a debounce delay.
//!
//! On online to offline the pending resync is cancelled.

/// Cancellable delayed callback
pub mod debounce;

pub use debounce::DebounceTimer;

use crate::config::ConnectivityConfig;
use async_trait::async_trait;
use repsync_providers::DocumentStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Device network signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkState {
    /// Device has a network interface up
    pub is_connected: bool,
    /// Whether the internet is reachable, if known
    pub is_internet_reachable: Option<bool>,
}

impl NetworkState {
    /// Connected with unknown reachability
    #[must_use]
    pub const fn online() -> Self {
        Self {
            is_connected: true,
            is_internet_reachable: None,
        }
    }

    /// Disconnected
    #[must_use]
    pub const fn offline() -> Self {
        Self {
            is_connected: false,
            is_internet_reachable: Some(false),
        }
    }

    /// Online unless disconnected or known unreachable
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.is_connected && !matches!(self.is_internet_reachable, Some(false))
    }
}

/// Work to run after the device comes back online
#[async_trait]
pub trait ResyncHook: Send + Sync {
    /// Reconcile local and remote state
    async fn resync(&self);
}

/// Clears the reconnect flag on every exit path of the reconnect task
struct ReconnectGuard(Arc<AtomicBool>);

impl Drop for ReconnectGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct MonitorInner {
    config: ConnectivityConfig,
    online: watch::Sender<bool>,
    document_store: Option<Arc<dyn DocumentStore>>,
    reconnecting: Arc<AtomicBool>,
    debounce: DebounceTimer,
    hook: RwLock<Option<Arc<dyn ResyncHook>>>,
}

impl MonitorInner {
    fn apply(&self, state: NetworkState) {
        let online = state.is_online();
        let was_online = self.online.send_replace(online);

        match (was_online, online) {
            (false, true) => {
                info!(?state, "Device back online");
                self.start_reconnect();
                self.schedule_resync();
            }
            (true, false) => {
                warn!(?state, "Device went offline");
                if self.debounce.cancel() {
                    debug!("Cancelled pending resync");
                }
            }
            _ => debug!(?state, online, "Network state unchanged"),
        }
    }

    fn start_reconnect(&self) {
        let Some(store) = self.document_store.clone() else {
            return;
        };
        if self
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Document store reconnect already in progress");
            return;
        }

        let guard = ReconnectGuard(self.reconnecting.clone());
        let pause = self.config.reconnect_pause();
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = store.disable_network().await {
                warn!(error = %e, "Failed to disable document store network");
            }
            tokio::time::sleep(pause).await;
            match store.enable_network().await {
                Ok(()) => info!("Document store reconnected"),
                Err(e) => warn!(error = %e, "Failed to re-enable document store network"),
            }
        });
    }

    fn schedule_resync(&self) {
        let hook = self
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            self.debounce
                .schedule(self.config.resync_debounce(), async move { hook.resync().await });
        }
    }
}

/// Tracks online state and reacts to transitions
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// Create a monitor that starts out online
    ///
    /// `document_store` is cycled on reconnect when given.
    #[must_use]
    pub fn new(
        config: ConnectivityConfig,
        document_store: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        let (online, _) = watch::channel(true);
        Self {
            inner: Arc::new(MonitorInner {
                config,
                online,
                document_store,
                reconnecting: Arc::new(AtomicBool::new(false)),
                debounce: DebounceTimer::new(),
                hook: RwLock::new(None),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Current online state
    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.inner.online.borrow()
    }

    /// Stream of online state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.online.subscribe()
    }

    /// Feed a network state directly
    pub fn set_network_state(&self, state: NetworkState) {
        self.inner.apply(state);
    }

    /// Start following `signal`; a no-op while already running
    ///
    /// The signal's current value is applied immediately.
    pub fn start(&self, mut signal: watch::Receiver<NetworkState>) {
        let mut listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Connectivity monitor already running");
            return;
        }

        let initial = *signal.borrow_and_update();
        self.inner.apply(initial);

        let inner = self.inner.clone();
        *listener = Some(tokio::spawn(async move {
            while signal.changed().await.is_ok() {
                let state = *signal.borrow_and_update();
                inner.apply(state);
            }
            debug!("Network signal closed");
        }));
        info!("Connectivity monitor started");
    }

    /// Stop following the signal and cancel any pending resync; idempotent
    pub fn stop(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!("Connectivity monitor stopped");
        }
        self.inner.debounce.cancel();
    }

    /// Whether the signal listener is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Install the hook run after reconnecting, replacing any previous one
    pub fn attach_resync_hook(&self, hook: Arc<dyn ResyncHook>) {
        *self
            .inner
            .hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Remove the resync hook and cancel a pending run; idempotent
    pub fn detach_resync_hook(&self) {
        self.inner
            .hook
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.inner.debounce.cancel();
    }

    /// Whether a debounced resync is waiting
    #[must_use]
    pub fn has_pending_resync(&self) -> bool {
        self.inner.debounce.is_pending()
    }

    /// Whether a document store reconnect is in flight
    #[must_use]
    pub fn is_reconnecting(&self) -> bool {
        self.inner.reconnecting.load(Ordering::Acquire)
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
