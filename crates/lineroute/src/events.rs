//! Exit notification.
//!
//! A handler asks the host to stop its loop with
//! [`CommandContext::request_exit`](crate::CommandContext::request_exit).
//! Once the dispatch completes, the service raises its sticky exit flag and
//! calls every listener registered with
//! [`CommandService::on_exit`](crate::CommandService::on_exit), outside of
//! the service lock.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Details of an exit requested by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitRequest {
    /// Name of the controller whose handler asked to exit.
    pub controller: String,
    /// Full template of the route that was dispatched.
    pub route: String,
}

/// Exit listener.
pub type ExitFn = Arc<dyn Fn(&ExitRequest) + Send + Sync>;

/// Listeners notified when a handler requests an exit.
#[derive(Clone, Default)]
pub(crate) struct ExitListeners {
    listeners: Vec<ExitFn>,
}

impl ExitListeners {
    pub(crate) fn push<F>(&mut self, f: F)
    where
        F: Fn(&ExitRequest) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(f));
    }

    pub(crate) fn notify(&self, request: &ExitRequest) {
        for listener in &self.listeners {
            listener(request);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for ExitListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitListeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> ExitRequest {
        ExitRequest {
            controller: "GreetingController".into(),
            route: "Say goodbye to {name}, please.".into(),
        }
    }

    #[test]
    fn test_notify_calls_every_listener_in_order() {
        let calls = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut listeners = ExitListeners::default();

        let first = Arc::clone(&calls);
        listeners.push(move |r: &ExitRequest| first.lock().push(format!("1:{}", r.controller)));
        let second = Arc::clone(&calls);
        listeners.push(move |_: &ExitRequest| second.lock().push("2".to_string()));

        listeners.notify(&request());
        assert_eq!(*calls.lock(), vec!["1:GreetingController", "2"]);
    }

    #[test]
    fn test_clone_shares_listeners() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut listeners = ExitListeners::default();
        let c = Arc::clone(&count);
        listeners.push(move |_: &ExitRequest| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let snapshot = listeners.clone();
        snapshot.notify(&request());
        listeners.notify(&request());
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(format!("{:?}", listeners), "ExitListeners { count: 1 }");
    }
}
