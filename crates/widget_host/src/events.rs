//! Locally owned event streams for lifecycle and checklist notifications.

use std::{cell::RefCell, rc::Rc};

/// Listener callback stored by [`EventStream`].
pub type EventListener<T> = Rc<dyn Fn(&T)>;

/// Single-threaded multi-subscriber event stream.
///
/// Subscribers are invoked synchronously, in subscription order, each time a
/// value is emitted, so forwarding through a stream preserves emission order.
/// There is no per-listener unsubscription; streams are dropped wholesale
/// when the owning session is torn down.
pub struct EventStream<T> {
    listeners: Rc<RefCell<Vec<EventListener<T>>>>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<T> Default for EventStream<T> {
    fn default() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T> EventStream<T> {
    /// Registers a listener invoked for every subsequent emission.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Emits a value to every current listener.
    pub fn emit(&self, value: &T) {
        // Snapshot first so a listener that subscribes re-entrantly does not
        // deadlock the borrow.
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(value);
        }
    }

    /// Drops all listeners.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_observe_emissions_in_subscription_order() {
        let stream = EventStream::<String>::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            stream.subscribe(move |value: &String| {
                seen.borrow_mut().push(format!("{tag}:{value}"));
            });
        }

        stream.emit(&"a".to_string());
        stream.emit(&"b".to_string());

        assert_eq!(
            *seen.borrow(),
            vec!["first:a", "second:a", "first:b", "second:b"]
        );
    }

    #[test]
    fn clear_drops_all_listeners() {
        let stream = EventStream::<()>::default();
        stream.subscribe(|()| {});
        assert_eq!(stream.listener_count(), 1);
        stream.clear();
        assert_eq!(stream.listener_count(), 0);
    }

    #[test]
    fn re_entrant_subscription_does_not_panic() {
        let stream = EventStream::<()>::default();
        let inner = stream.clone();
        stream.subscribe(move |()| inner.subscribe(|()| {}));
        stream.emit(&());
        assert_eq!(stream.listener_count(), 2);
    }
}
