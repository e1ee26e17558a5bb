//! Event dispatcher - named listeners, raw frame listeners, and waiters
//!
//! One listener per event name, registering again replaces the previous
//! one. Waiters are one-shot predicates checked before the listener runs
//! and deregistered as soon as they match. A listener error goes to the
//! per-event error handler when one is registered and is logged otherwise;
//! it never takes the gateway down.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;

use crate::error::DispatchError;
use crate::events::Event;

type ListenerFn = Arc<dyn Fn(Event) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
type RawListenerFn =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
type ErrorHandlerFn = Arc<dyn Fn(Event, anyhow::Error) -> BoxFuture<'static, ()> + Send + Sync>;
type Predicate = Box<dyn Fn(&Event) -> bool + Send + Sync>;

struct Waiter {
    id: u64,
    event: String,
    predicate: Predicate,
    sender: oneshot::Sender<Event>,
}

/// Routes application events to listeners and pending waiters
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<HashMap<String, ListenerFn>>,
    raw_listeners: RwLock<HashMap<String, RawListenerFn>>,
    error_handlers: RwLock<HashMap<String, ErrorHandlerFn>>,
    waiters: Mutex<Vec<Waiter>>,
    next_waiter: AtomicU64,
}

impl EventDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register the listener for an event, replacing any previous one
    pub fn on<F, Fut>(&self, event: &str, listener: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let listener: ListenerFn = Arc::new(move |event| listener(event).boxed());
        self.listeners
            .write()
            .insert(event.to_ascii_lowercase(), listener);
    }

    /// Drop the listener for an event
    pub fn off(&self, event: &str) -> bool {
        self.listeners
            .write()
            .remove(&event.to_ascii_lowercase())
            .is_some()
    }

    /// Register a listener for the undecoded frame behind a wire tag
    pub fn on_raw<F, Fut>(&self, tag: &str, listener: F)
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let listener: RawListenerFn = Arc::new(move |payload| listener(payload).boxed());
        self.raw_listeners
            .write()
            .insert(tag.to_ascii_lowercase(), listener);
    }

    /// Register the error handler for one event's listener
    pub fn on_error<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(Event, anyhow::Error) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: ErrorHandlerFn = Arc::new(move |event, err| handler(event, err).boxed());
        self.error_handlers
            .write()
            .insert(event.to_ascii_lowercase(), handler);
    }

    #[must_use]
    pub fn has_raw(&self, tag: &str) -> bool {
        self.raw_listeners
            .read()
            .contains_key(&tag.to_ascii_lowercase())
    }

    // =========================================================================
    // Waiting
    // =========================================================================

    /// Block until an event matching the predicate fires, or time out
    pub async fn wait_for<P>(
        &self,
        event: &str,
        timeout: Duration,
        predicate: P,
    ) -> Result<Event, DispatchError>
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let id = self.next_waiter.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        self.waiters.lock().push(Waiter {
            id,
            event: event.to_ascii_lowercase(),
            predicate: Box::new(predicate),
            sender,
        });

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(event)) => Ok(event),
            Ok(Err(_)) => {
                self.remove_waiter(id);
                Err(DispatchError::WaiterDropped {
                    event: event.to_string(),
                })
            }
            Err(_) => {
                self.remove_waiter(id);
                Err(DispatchError::Timeout {
                    event: event.to_string(),
                })
            }
        }
    }

    fn remove_waiter(&self, id: u64) {
        self.waiters.lock().retain(|waiter| waiter.id != id);
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Resolve matching waiters, then run the named listener
    pub async fn dispatch(&self, event: Event) {
        let name = event.name();

        let matched = {
            let mut waiters = self.waiters.lock();
            let mut matched = Vec::new();
            let mut index = 0;
            while index < waiters.len() {
                if waiters[index].event == name && (waiters[index].predicate)(&event) {
                    matched.push(waiters.swap_remove(index));
                } else {
                    index += 1;
                }
            }
            matched
        };
        for waiter in matched {
            let _ = waiter.sender.send(event.clone());
        }

        let listener = self.listeners.read().get(name).cloned();
        if let Some(listener) = listener {
            if let Err(err) = listener(event.clone()).await {
                let handler = self.error_handlers.read().get(name).cloned();
                match handler {
                    Some(handler) => handler(event, err).await,
                    None => {
                        tracing::error!(event = name, error = %err, "unhandled listener error");
                    }
                }
            }
        }
    }

    /// Run the raw listener registered for a wire tag, if any
    pub async fn dispatch_raw(&self, tag: &str, payload: serde_json::Value) {
        let listener = self
            .raw_listeners
            .read()
            .get(&tag.to_ascii_lowercase())
            .cloned();
        if let Some(listener) = listener {
            if let Err(err) = listener(payload).await {
                tracing::warn!(tag, error = %err, "raw listener error");
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.read().len())
            .field("raw_listeners", &self.raw_listeners.read().len())
            .field("waiters", &self.waiters.lock().len())
            .finish_non_exhaustive()
    }
}
