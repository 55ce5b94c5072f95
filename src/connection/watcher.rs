use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

/// State shared between a session, its prepared statements, and its
/// cancellation watcher.
///
/// The `closed` flag and the recorded cancellation cause are the only
/// fields ever touched from outside the session's own task; everything
/// else on the connection stays single-owner.
#[derive(Debug)]
pub(crate) struct SessionShared {
    closed: AtomicBool,
    cause: Mutex<Option<Box<str>>>,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
}

impl SessionShared {
    pub(crate) fn new() -> Arc<Self> {
        let (cancel_tx, cancel_rx) = watch::channel(false);

        Arc::new(Self {
            closed: AtomicBool::new(false),
            cause: Mutex::new(None),
            cancel_tx,
            cancel_rx,
        })
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Records the cancellation cause (the first writer wins), closes the
    /// session, and wakes any operation blocked on the socket.
    pub(crate) fn cancel(&self, cause: &str) {
        self.cause
            .lock()
            .unwrap()
            .get_or_insert_with(|| cause.into());

        self.mark_closed();

        let _ = self.cancel_tx.send(true);
    }

    pub(crate) fn canceled_cause(&self) -> Option<Box<str>> {
        self.cause.lock().unwrap().clone()
    }

    /// A fresh view of the cancellation signal for one suspension point.
    pub(crate) fn cancellation(&self) -> watch::Receiver<bool> {
        self.cancel_rx.clone()
    }
}

/// Cancels a session from outside its serial call path.
///
/// Cancellation is terminal: the in-flight operation returns
/// [`Canceled`][crate::Error::Canceled] with the recorded cause, and every
/// operation after it returns [`BadConnection`][crate::Error::BadConnection].
#[derive(Debug, Clone)]
pub struct MySqlCancelHandle {
    pub(crate) shared: Arc<SessionShared>,
}

impl MySqlCancelHandle {
    pub fn cancel(&self, cause: impl Into<Box<str>>) {
        self.shared.cancel(&cause.into());
    }
}
