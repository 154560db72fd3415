//! Synchronous event bus and the event-expectation test helper
//!
//! Listeners are keyed by `(source, event name)` and invoked in registration
//! order. `expect_event` registers a one-shot listener around a callback and
//! asserts the event fired during the callback's own execution window.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::{EventName, EventSource};

/// Opaque token identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Listener {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    listeners: HashMap<(EventSource, EventName), Vec<Listener>>,
}

/// Synchronous listener table for harness-visible events
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a persistent listener.
    pub fn on<F>(&self, source: EventSource, name: EventName, callback: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(source, name, Arc::new(callback), false)
    }

    /// Registers a listener that is removed after its first fire.
    pub fn once<F>(&self, source: EventSource, name: EventName, callback: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(source, name, Arc::new(callback), true)
    }

    /// Unsubscribes a listener; returns whether it was still registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        let mut removed = false;
        for listeners in state.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|l| l.id != id);
            removed |= listeners.len() != before;
        }
        removed
    }

    /// Fires an event, invoking every matching listener in registration
    /// order. Returns the number of listeners invoked.
    pub fn trigger(&self, source: &EventSource, name: &EventName) -> usize {
        // Collect callbacks before invoking so listeners may re-enter the bus.
        let callbacks: Vec<Callback> = {
            let mut state = self.state.lock();
            match state.listeners.get_mut(&(source.clone(), name.clone())) {
                Some(listeners) => {
                    let callbacks = listeners.iter().map(|l| l.callback.clone()).collect();
                    listeners.retain(|l| !l.once);
                    callbacks
                }
                None => Vec::new(),
            }
        };

        let fired = callbacks.len();
        for callback in callbacks {
            callback();
        }
        fired
    }

    /// Asserts that `callback` triggers the named event on the named source.
    ///
    /// Registers a one-shot listener flipping a flag, runs the callback
    /// synchronously, unsubscribes, then panics (failing the containing
    /// test) if the event never fired. Firing more than once still passes;
    /// events fired after the callback returns do not count.
    pub fn expect_event<F>(&self, source: EventSource, name: EventName, callback: F)
    where
        F: FnOnce(),
    {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let token = self.once(source.clone(), name.clone(), move || {
            flag.store(true, Ordering::SeqCst);
        });

        callback();

        self.off(token);
        assert!(
            fired.load(Ordering::SeqCst),
            "expected event `{name}` to be triggered on `{source}` during the callback"
        );
    }

    fn register(
        &self,
        source: EventSource,
        name: EventName,
        callback: Callback,
        once: bool,
    ) -> ListenerId {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.listeners.entry((source, name)).or_default().push(Listener {
            id,
            once,
            callback,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn source(s: &str) -> EventSource {
        EventSource::try_new(s.to_string()).unwrap()
    }

    fn name(s: &str) -> EventName {
        EventName::try_new(s.to_string()).unwrap()
    }

    #[test]
    fn trigger_invokes_matching_listeners_only() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        bus.on(source("entries"), name("after_save"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.trigger(&source("entries"), &name("after_save")), 1);
        assert_eq!(bus.trigger(&source("entries"), &name("after_delete")), 0);
        assert_eq!(bus.trigger(&source("users"), &name("after_save")), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn once_listeners_fire_a_single_time() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        bus.once(source("entries"), name("after_save"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.trigger(&source("entries"), &name("after_save"));
        bus.trigger(&source("entries"), &name("after_save"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_removes_a_listener() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let token = bus.on(source("entries"), name("after_save"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bus.off(token));
        assert!(!bus.off(token));
        bus.trigger(&source("entries"), &name("after_save"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn expect_event_passes_when_the_callback_fires_the_event() {
        let bus = EventBus::new();
        bus.expect_event(source("entries"), name("after_save"), || {
            bus.trigger(&source("entries"), &name("after_save"));
        });
    }

    #[test]
    fn expect_event_passes_when_the_event_fires_more_than_once() {
        let bus = EventBus::new();
        bus.expect_event(source("entries"), name("after_save"), || {
            bus.trigger(&source("entries"), &name("after_save"));
            bus.trigger(&source("entries"), &name("after_save"));
        });
    }

    #[test]
    #[should_panic(expected = "expected event `after_save` to be triggered")]
    fn expect_event_fails_when_the_event_never_fires() {
        let bus = EventBus::new();
        bus.expect_event(source("entries"), name("after_save"), || {
            // Trigger something else entirely.
            bus.trigger(&source("entries"), &name("after_delete"));
        });
    }

    #[test]
    fn expect_event_window_is_exactly_the_callback() {
        let bus = EventBus::new();
        bus.expect_event(source("entries"), name("after_save"), || {
            bus.trigger(&source("entries"), &name("after_save"));
        });

        // The one-shot listener is gone; later fires reach no listener.
        assert_eq!(bus.trigger(&source("entries"), &name("after_save")), 0);
    }
}
