//! Named publish/subscribe registry shared by the views.

use indexmap::IndexMap;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::selection::KeySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventName {
    CategorySelected,
    RegionSelected,
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategorySelected => f.write_str("categorySelected"),
            Self::RegionSelected => f.write_str("regionSelected"),
        }
    }
}

type Handler<P> = Rc<dyn Fn(&P)>;

/// Synchronous event bus. Handlers run in registration order.
///
/// The handler list is snapshotted before dispatch, so a handler may emit or register on the
/// same bus; handlers registered during an emit first run on the next emit.
pub struct EventBus<N, P> {
    handlers: RefCell<IndexMap<N, Vec<Handler<P>>>>,
}

/// The dashboard's bus: every event carries a set of keys.
pub type Dispatcher = EventBus<EventName, KeySet>;

impl<N, P> Default for EventBus<N, P> {
    fn default() -> Self {
        Self {
            handlers: RefCell::new(IndexMap::new()),
        }
    }
}

impl<N, P> fmt::Debug for EventBus<N, P>
where
    N: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        f.debug_map()
            .entries(handlers.iter().map(|(name, list)| (name, list.len())))
            .finish()
    }
}

impl<N, P> EventBus<N, P>
where
    N: Eq + Hash + Copy + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, event: N, handler: impl Fn(&P) + 'static) {
        self.handlers
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(Rc::new(handler));
    }

    pub fn emit(&self, event: N, payload: &P) {
        let snapshot = self
            .handlers
            .borrow()
            .get(&event)
            .cloned()
            .unwrap_or_default();
        tracing::debug!(event = %event, handlers = snapshot.len(), "emit");
        for handler in snapshot {
            handler(payload);
        }
    }

    pub fn handler_count(&self, event: N) -> usize {
        self.handlers.borrow().get(&event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn handlers_run_in_registration_order_with_the_same_payload() {
        let bus = Dispatcher::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = log.clone();
            bus.register(EventName::CategorySelected, move |keys: &KeySet| {
                log.borrow_mut().push((tag, keys.clone()));
            });
        }
        let payload = KeySet::from(["Vandalism".to_string()]);
        bus.emit(EventName::CategorySelected, &payload);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], ("first", payload.clone()));
        assert_eq!(log[1], ("second", payload));
    }

    #[test]
    fn emitting_without_handlers_is_silent() {
        let bus = Dispatcher::new();
        bus.emit(EventName::RegionSelected, &KeySet::new());
        assert_eq!(bus.handler_count(EventName::RegionSelected), 0);
    }

    #[test]
    fn events_are_routed_by_name() {
        let bus = Dispatcher::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        bus.register(EventName::RegionSelected, move |_| h.set(h.get() + 1));
        bus.emit(EventName::CategorySelected, &KeySet::new());
        assert_eq!(hits.get(), 0);
        bus.emit(EventName::RegionSelected, &KeySet::new());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handlers_may_reenter_the_bus() {
        let bus = Rc::new(Dispatcher::new());
        let regions = Rc::new(Cell::new(0));

        let r = regions.clone();
        bus.register(EventName::RegionSelected, move |_| r.set(r.get() + 1));

        let weak = Rc::downgrade(&bus);
        bus.register(EventName::CategorySelected, move |keys: &KeySet| {
            if let Some(bus) = weak.upgrade() {
                bus.emit(EventName::RegionSelected, keys);
                bus.register(EventName::RegionSelected, |_| {});
            }
        });

        bus.emit(EventName::CategorySelected, &KeySet::new());
        assert_eq!(regions.get(), 1);
        assert_eq!(bus.handler_count(EventName::RegionSelected), 2);
    }
}
