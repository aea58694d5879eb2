// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Synchronous change notification.
//!
//! [`Observable::notify`] calls every listener before it returns.  A listener
//! that triggers another notification does not re-enter the dispatch loop:
//! the nested value is queued and delivered, in order, once the current round
//! finishes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

pub struct Observable<E> {
    listeners: RefCell<Vec<(ListenerId, Listener<E>)>>,
    removed: RefCell<Vec<ListenerId>>,
    queue: RefCell<VecDeque<E>>,
    dispatching: Cell<bool>,
    generation: Cell<u64>,
    next_id: Cell<u64>,
}

impl<E> Default for Observable<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
            generation: Cell::new(0),
            next_id: Cell::new(0),
        }
    }
}

impl<E> fmt::Debug for Observable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("listeners", &self.listener_count())
            .field("generation", &self.generation.get())
            .finish()
    }
}

impl<E> Observable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(index) = listeners.iter().position(|(lid, _)| *lid == id) {
            listeners.remove(index);
            return true;
        }
        if self.dispatching.get() && id.0 < self.next_id.get() {
            // Taken out for the running dispatch; drop it when it comes back.
            self.removed.borrow_mut().push(id);
            return true;
        }
        false
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of notifications delivered so far.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn notify(&self, event: E) {
        self.queue.borrow_mut().push_back(event);
        if self.dispatching.replace(true) {
            return;
        }
        loop {
            let Some(event) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.generation.set(self.generation.get() + 1);
            let mut running = std::mem::take(&mut *self.listeners.borrow_mut());
            for (_, listener) in running.iter_mut() {
                listener(&event);
            }
            let mut listeners = self.listeners.borrow_mut();
            let added = std::mem::take(&mut *listeners);
            let removed = std::mem::take(&mut *self.removed.borrow_mut());
            running.retain(|(id, _)| !removed.contains(id));
            running.extend(added);
            *listeners = running;
        }
        self.dispatching.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn listeners_run_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let obs = Observable::<u32>::new();
        let l1 = log.clone();
        obs.subscribe(move |v| l1.borrow_mut().push(("a", *v)));
        let l2 = log.clone();
        obs.subscribe(move |v| l2.borrow_mut().push(("b", *v)));
        obs.notify(7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
        assert_eq!(obs.generation(), 1);
    }

    #[test]
    fn nested_notifications_are_queued() {
        let obs = Rc::new(Observable::<u32>::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::downgrade(&obs);
        let l1 = log.clone();
        obs.subscribe(move |v| {
            l1.borrow_mut().push(*v);
            if *v == 1 {
                if let Some(obs) = inner.upgrade() {
                    obs.notify(2);
                }
            }
        });
        let l2 = log.clone();
        obs.subscribe(move |v| l2.borrow_mut().push(*v * 10));

        obs.notify(1);
        // The nested value is delivered after every listener saw the first.
        assert_eq!(*log.borrow(), vec![1, 10, 2, 20]);
        assert_eq!(obs.generation(), 2);
    }

    #[test]
    fn unsubscribe_during_dispatch() {
        let obs = Rc::new(Observable::<u32>::new());
        let count = Rc::new(Cell::new(0));
        let id_slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&obs);
        let slot = id_slot.clone();
        let c = count.clone();
        let id = obs.subscribe(move |_| {
            c.set(c.get() + 1);
            if let (Some(obs), Some(id)) = (weak.upgrade(), slot.get()) {
                obs.unsubscribe(id);
            }
        });
        id_slot.set(Some(id));

        obs.notify(0);
        obs.notify(0);
        assert_eq!(count.get(), 1);
        assert_eq!(obs.listener_count(), 0);
        assert!(!obs.unsubscribe(id));
    }

    #[test]
    fn subscribe_during_dispatch_takes_effect_next_round() {
        let obs = Rc::new(Observable::<u32>::new());
        let count = Rc::new(Cell::new(0));
        let weak = Rc::downgrade(&obs);
        let c = count.clone();
        obs.subscribe(move |_| {
            if let Some(obs) = weak.upgrade() {
                let c = c.clone();
                obs.subscribe(move |_| c.set(c.get() + 1));
            }
        });
        obs.notify(0);
        assert_eq!(count.get(), 0);
        assert_eq!(obs.listener_count(), 2);
    }
}
