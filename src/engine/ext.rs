//! Side-Channel Component State
//!
//! Presentation layers (renderers, widget trees) often need to associate
//! derived state with a component: a sprite handle, a GPU buffer id, a
//! cached layout. That state belongs to the presentation subsystem, not
//! to the component's own data definition, so it lives here: an
//! [`ExtStore`] maps component instance ids to externally owned values.
//!
//! The store subscribes to `COMPONENT_REMOVED` and evicts an entry the
//! moment its component is detached, so a later re-attach always starts
//! from a clean slate. Dropping the store unsubscribes it.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::component::ComponentHandle;
use crate::engine::events::{EventBus, Payload};
use crate::engine::types::{ComponentId, SubscriptionId, COMPONENT_REMOVED};


/// Externally owned per-component state, keyed by component identity.
///
/// Entries are evicted automatically when the component is detached from
/// its entity. One store holds one value type; a presentation layer
/// typically owns one store per derived-state concern.
pub struct ExtStore<T: 'static> {
    entries: Rc<RefCell<HashMap<ComponentId, T>>>,
    bus: EventBus,
    subscription: SubscriptionId,
}

impl<T: 'static> ExtStore<T> {
    /// Creates an empty store watching `bus` for detachments.
    pub fn new(bus: &EventBus) -> Self {
        let entries: Rc<RefCell<HashMap<ComponentId, T>>> = Rc::new(RefCell::new(HashMap::new()));

        let weak = Rc::downgrade(&entries);
        let subscription = bus.subscribe(COMPONENT_REMOVED, move |event: &Payload| {
            if let (Some(entries), Some(component)) =
                (weak.upgrade(), event.downcast_ref::<ComponentHandle>())
            {
                entries.borrow_mut().remove(&component.id());
            }
        });

        Self { entries, bus: bus.clone(), subscription }
    }

    /// Associates `value` with `component`, returning any previous value.
    pub fn insert(&self, component: &ComponentHandle, value: T) -> Option<T> {
        self.entries.borrow_mut().insert(component.id(), value)
    }

    /// Shared access to the value associated with `component`.
    pub fn get(&self, component: &ComponentHandle) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.entries.borrow(), |entries| entries.get(&component.id())).ok()
    }

    /// Exclusive access to the value associated with `component`.
    pub fn get_mut(&self, component: &ComponentHandle) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.entries.borrow_mut(), |entries| {
            entries.get_mut(&component.id())
        })
        .ok()
    }

    /// Removes and returns the value associated with `component`.
    pub fn remove(&self, component: &ComponentHandle) -> Option<T> {
        self.entries.borrow_mut().remove(&component.id())
    }

    /// Returns `true` if a value is associated with `component`.
    pub fn contains(&self, component: &ComponentHandle) -> bool {
        self.entries.borrow().contains_key(&component.id())
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<T: 'static> Drop for ExtStore<T> {
    fn drop(&mut self) {
        self.bus.unsubscribe(COMPONENT_REMOVED, self.subscription);
    }
}
