//! Programmatic stop switch for a running proxy.

use tokio::sync::broadcast;

/// Stop switch for [`HttpServer::run`](crate::HttpServer::run).
///
/// Every receiver handed out by [`Shutdown::subscribe`] resolves once
/// [`Shutdown::trigger`] is called or the switch itself is dropped, and the
/// server then drains in-flight forwards exactly as it does on SIGINT/SIGTERM.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to pass to the server before it starts accepting.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed server to stop. A no-op when nobody listens.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
