//! Process shutdown signalling.
//!
//! The daemon owns a single [`Shutdown`] latch and hands a
//! [`ShutdownHandle`] to each long-running task (the event loop, the
//! console reader). Once triggered the latch stays set, so a handle taken
//! late still observes the shutdown, and a handle that outlives the latch
//! treats the drop as a shutdown too.

use tokio::signal;
use tokio::sync::watch;

/// One-way shutdown latch for the whole process.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

/// A task's view of the latch. Cheap to clone.
#[derive(Clone)]
pub struct ShutdownHandle {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Set the latch. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Block until SIGINT or SIGTERM arrives, then set the latch.
    pub async fn on_signal(&self) {
        let interrupt = async {
            let _ = signal::ctrl_c().await;
            "SIGINT"
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "SIGTERM handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
            "SIGTERM"
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<&'static str>();

        let received = tokio::select! {
            name = interrupt => name,
            name = terminate => name,
        };
        tracing::info!(signal = received, "shutting down");
        self.trigger();
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    /// Resolve once the latch is set. Returns immediately when it already
    /// is, and when the [`Shutdown`] side has been dropped.
    pub async fn triggered(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
