// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::rc::Rc;

use crate::store::Value;

/// A store change.
///
/// `path: None` means "something changed, re-check everything".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeNotification {
    pub value: Option<Value>,
    pub path: Option<String>,
}

impl ChangeNotification {
    pub fn new(value: Option<Value>, path: Option<String>) -> Self {
        Self { value, path }
    }

    /// A notification with no path.
    pub fn everything() -> Self {
        Self::default()
    }
}

pub type Listener = Rc<dyn Fn(&ChangeNotification)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

enum Subscriber {
    /// The engine's own re-synchronization pass.
    Resync,
    External { id: ListenerId, listener: Listener },
}

/// One delivery of a publish, in registration order.
pub(crate) enum Delivery {
    Resync,
    External(Listener),
}

/// Synchronous, ordered publish/subscribe.
///
/// The re-synchronization subscriber is registered at construction, so it
/// always runs first; external listeners follow in subscription order.
/// Every publish is delivered to every subscriber; nothing is coalesced.
pub struct ChangeBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self {
            subscribers: vec![Subscriber::Resync],
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&ChangeNotification) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber::External {
            id,
            listener: Rc::new(listener),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|s| !matches!(s, Subscriber::External { id: other, .. } if *other == id));
        self.subscribers.len() != before
    }

    /// Subscriber count, the engine's own included.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Snapshot of the subscribers for one publish. Listeners added while a
    /// publish is running see the next one.
    pub(crate) fn deliveries(&self) -> Vec<Delivery> {
        self.subscribers
            .iter()
            .map(|s| match s {
                Subscriber::Resync => Delivery::Resync,
                Subscriber::External { listener, .. } => Delivery::External(Rc::clone(listener)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_resync_is_first_and_listeners_keep_order() {
        let mut bus = ChangeBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b"] {
            let seen = seen.clone();
            bus.subscribe(move |n| seen.borrow_mut().push((name, n.path.clone())));
        }

        let deliveries = bus.deliveries();
        assert!(matches!(deliveries[0], Delivery::Resync));
        let notification = ChangeNotification::new(None, Some("x".into()));
        for delivery in deliveries {
            if let Delivery::External(listener) = delivery {
                listener(&notification);
            }
        }
        assert_eq!(
            *seen.borrow(),
            vec![("a", Some("x".to_string())), ("b", Some("x".to_string()))]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = ChangeBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.len(), 2);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.len(), 1);
    }
}
