//! Network reachability tracking and deferred sync
//!
//! `ConnectivityMonitor` holds the reachability the runtime last reported and
//! runs one-shot callbacks on the next transition to online. Reachability can
//! be reported directly with `set_online`, from a single probe with
//! `refresh`, or periodically from a background `WatchHandle`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ProbeError;

/// Last known reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reachability {
    /// Nothing reported yet
    #[default]
    Unknown,
    Online,
    Offline,
}

/// Port to whatever can tell whether the network is reachable
pub trait ReachabilityProbe: Send + Sync {
    /// `Ok(true)` when reachable. Errors mean the state is unknown.
    fn check(&self) -> BoxFuture<'_, Result<bool, ProbeError>>;
}

/// Probes reachability with an HTTP HEAD request
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// HTTP client with the probe timeout applied
    http_client: Client,
    /// URL to probe
    url: String,
}

impl HttpProbe {
    /// Creates a probe against `url`, giving up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

impl ReachabilityProbe for HttpProbe {
    fn check(&self) -> BoxFuture<'_, Result<bool, ProbeError>> {
        Box::pin(async move {
            // Any HTTP response at all means the network is up
            let response = self.http_client.head(&self.url).send().await?;
            debug!(url = %self.url, status = %response.status(), "reachability probe answered");
            Ok(true)
        })
    }
}

type Listener = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Inner {
    state: Reachability,
    listeners: Vec<Listener>,
}

/// Shared reachability state plus pending one-shot sync callbacks
#[derive(Clone, Default)]
pub struct ConnectivityMonitor {
    inner: Arc<Mutex<Inner>>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported reachability
    pub fn reachability(&self) -> Reachability {
        self.lock().state
    }

    /// `true` only when online was the last report; unknown reads as offline
    pub fn is_online(&self) -> bool {
        self.reachability() == Reachability::Online
    }

    /// Number of callbacks waiting for the next online transition
    pub fn pending_listeners(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Runs `callback` now if online, otherwise once on the next transition to
    /// online. The callback's own failures are the caller's concern.
    pub fn sync_when_online<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.state == Reachability::Online {
            drop(inner);
            callback();
        } else {
            inner.listeners.push(Box::new(callback));
            debug!(pending = inner.listeners.len(), "sync deferred until online");
        }
    }

    /// Reports a reachability change from the runtime environment.
    ///
    /// Going online from any other state fires and drops every pending
    /// listener. Listeners run after the internal lock is released, so they
    /// may register further callbacks.
    pub fn set_online(&self, online: bool) {
        let fired = {
            let mut inner = self.lock();
            let previous = inner.state;
            inner.state = if online {
                Reachability::Online
            } else {
                Reachability::Offline
            };
            if previous != inner.state {
                info!(from = ?previous, to = ?inner.state, "reachability changed");
            }
            if online && previous != Reachability::Online {
                std::mem::take(&mut inner.listeners)
            } else {
                Vec::new()
            }
        };

        for listener in fired {
            listener();
        }
    }

    /// Runs one probe and reports the outcome. A probe error counts as offline.
    pub async fn refresh<P>(&self, probe: &P) -> bool
    where
        P: ReachabilityProbe + ?Sized,
    {
        let online = match probe.check().await {
            Ok(online) => online,
            Err(e) => {
                warn!(error = %e, "reachability unknown, assuming offline");
                false
            }
        };
        self.set_online(online);
        online
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle for the background task that keeps a monitor up to date
pub struct WatchHandle {
    /// Signals the watcher to stop
    shutdown_tx: mpsc::Sender<()>,
}

impl WatchHandle {
    /// Spawns a task that probes immediately and then every `interval`,
    /// reporting each result to `monitor`
    pub fn spawn(
        monitor: ConnectivityMonitor,
        probe: Arc<dyn ReachabilityProbe>,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        monitor.refresh(probe.as_ref()).await;
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self { shutdown_tx }
    }

    /// Stops the background task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
