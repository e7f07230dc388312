//! File-creation notifications.
//!
//! `CreateEvents` is the host side: it fans a newly created file out to every subscriber.
//! `Subscription` is the handle a subscriber keeps; dropping it or calling `unsubscribe`
//! removes the callback. `CreationTrigger` owns at most one subscription and toggles it on the
//! `trigger_on_file_creation` flag, so enabling twice never registers the handler twice.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, trace};

use crate::file::FileDescriptor;

type Listener = Arc<dyn Fn(&FileDescriptor) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Broadcast point for "a file was created" notifications.
#[derive(Clone, Default)]
pub struct CreateEvents {
    registry: Arc<Mutex<Registry>>,
}

impl CreateEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FileDescriptor) + Send + Sync + 'static,
    {
        let mut reg = lock(&self.registry);
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, Arc::new(callback)));
        trace!(id, listeners = reg.listeners.len(), "create listener subscribed");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
            active: true,
        }
    }

    /// Deliver `file` to every current subscriber, in subscription order.
    /// Callbacks run outside the registry lock, so a callback may subscribe or unsubscribe.
    pub fn emit(&self, file: &FileDescriptor) -> usize {
        let listeners: Vec<Listener> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in &listeners {
            listener(file);
        }
        debug!(path = %file.path, delivered = listeners.len(), "create event emitted");
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

impl fmt::Debug for CreateEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle to one registered callback.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
    active: bool,
}

impl Subscription {
    /// Remove the callback. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).listeners.retain(|(id, _)| *id != self.id);
            trace!(id = self.id, "create listener unsubscribed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Runtime toggle for the reactive relocation handler.
pub struct CreationTrigger {
    events: CreateEvents,
    handler: Arc<dyn Fn(&FileDescriptor) + Send + Sync>,
    subscription: Option<Subscription>,
}

impl CreationTrigger {
    /// Build a trigger that is initially disabled.
    pub fn new<F>(events: CreateEvents, handler: F) -> Self
    where
        F: Fn(&FileDescriptor) + Send + Sync + 'static,
    {
        Self {
            events,
            handler: Arc::new(handler),
            subscription: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.subscription.is_some()) {
            (true, false) => {
                let handler = Arc::clone(&self.handler);
                self.subscription = Some(self.events.subscribe(move |f| handler(f)));
                debug!("creation trigger enabled");
            }
            (false, true) => {
                self.subscription = None;
                debug!("creation trigger disabled");
            }
            _ => {}
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }
}

impl fmt::Debug for CreationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationTrigger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
