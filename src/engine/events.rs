//! Synchronous Publish/Subscribe Event Bus
//!
//! This module provides the message router that drives the runtime: the
//! update loop, component lifecycle notifications, and any
//! application-defined signalling all travel through one [`EventBus`].
//!
//! ## Design
//! - Dispatch is **synchronous and depth-first**: every callback for an
//!   id runs to completion, in subscription order, before `publish`
//!   returns to its caller.
//! - Event ids are **auto-registered** on first use; publishing to an id
//!   nobody has subscribed to is legal and invokes zero callbacks.
//! - **Latched** events store their most recent payload; a subscriber
//!   that registers after the fact still receives that payload exactly
//!   once, synchronously inside `subscribe`.
//! - `subscribe` returns a [`SubscriptionId`] token and `unsubscribe` is
//!   best-effort: removing an unknown pairing is a silent no-op.
//!
//! ## Re-entrancy
//! Callbacks may publish, subscribe, and unsubscribe freely. The
//! subscriber list for an id is snapshotted before iteration, so mutation
//! during an in-flight publish never corrupts dispatch; subscribers added
//! mid-flight only see future publishes.
//!
//! ## Invariants
//! - Callbacks for one id fire in subscription order.
//! - The same closure subscribed twice fires twice; there is no dedup.
//! - At most one latched payload is stored per id; newer overwrites older.
//!
//! ## Concurrency
//! The bus is single-threaded by design. Handles are `Rc`-backed clones
//! of one shared bus; a multi-threaded host must confine the bus (and
//! everything reachable from it) to one thread.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use crate::engine::types::{EventId, SubscriptionId};


/// Type-erased event payload.
///
/// Subscribers recover the concrete type with `payload.downcast_ref`.
/// Payloads are reference-counted so that latched records and in-flight
/// dispatch can share one allocation.
pub type Payload = Rc<dyn Any>;

/// Wraps a value into a [`Payload`].
///
/// Events without data conventionally carry `payload(())`.
pub fn payload<T: Any>(value: T) -> Payload {
    Rc::new(value)
}

type Callback = Rc<dyn Fn(&Payload)>;

/// One registered (token, callback) pair on a channel.
struct Subscriber {
    token: SubscriptionId,
    callback: Callback,
}

#[derive(Default)]
struct BusState {
    channels: RefCell<HashMap<EventId, Vec<Subscriber>>>,
    latched: RefCell<HashMap<EventId, Payload>>,
    next_token: Cell<SubscriptionId>,
}

/// Cheaply clonable handle to a shared event bus.
///
/// ## Role
/// The bus is the explicitly constructed context object of the runtime:
/// it is created once per simulation and handed (by clone) to every
/// entity, engine, and system that participates. Clones share state, so
/// two independent buses never observe each other's events; this is what
/// allows multiple independent simulations in one process.
#[derive(Clone)]
pub struct EventBus {
    state: Rc<BusState>,
}

impl EventBus {
    /// Creates an empty bus with no channels and no latched records.
    pub fn new() -> Self {
        Self { state: Rc::new(BusState::default()) }
    }

    /// Registers `callback` for `id` and returns its subscription token.
    ///
    /// ## Behavior
    /// - Unknown ids are registered on the fly; this never fails.
    /// - If a latched payload exists for `id`, `callback` is invoked with
    ///   it exactly once, synchronously, before this method returns, in
    ///   addition to being registered for future publishes.
    ///
    /// ## Ordering
    /// Callbacks fire in subscription order. Subscribing the same closure
    /// again yields an independent registration that fires independently.
    pub fn subscribe(&self, id: EventId, callback: impl Fn(&Payload) + 'static) -> SubscriptionId {
        let token = self.state.next_token.get();
        self.state.next_token.set(token + 1);

        let callback: Callback = Rc::new(callback);
        {
            let mut channels = self.state.channels.borrow_mut();
            Self::channel(&mut channels, id)
                .push(Subscriber { token, callback: Rc::clone(&callback) });
        }
        debug!("event {id}: subscription {token} registered");

        // Replay outside of any borrow: the callback may re-enter the bus.
        let replay = self.state.latched.borrow().get(&id).cloned();
        if let Some(stored) = replay {
            debug!("event {id}: latched payload replayed to subscription {token}");
            callback(&stored);
        }

        token
    }

    /// Removes the registration identified by (`id`, `subscription`).
    ///
    /// Best-effort: unknown ids and tokens never subscribed (or already
    /// removed) are silent no-ops. Unsubscribing during an in-flight
    /// publish of the same id does not affect the snapshot being
    /// dispatched.
    pub fn unsubscribe(&self, id: EventId, subscription: SubscriptionId) {
        if let Some(subscribers) = self.state.channels.borrow_mut().get_mut(&id) {
            let before = subscribers.len();
            subscribers.retain(|s| s.token != subscription);
            if subscribers.len() < before {
                debug!("event {id}: subscription {subscription} removed");
            }
        }
    }

    /// Invokes every current subscriber of `id` with `payload`.
    ///
    /// ## Semantics
    /// The subscriber list is snapshotted first, then each callback runs
    /// to completion in subscription order. Callbacks registered by a
    /// callback in the same dispatch do not receive this publish.
    pub fn publish(&self, id: EventId, payload: Payload) {
        let snapshot: Vec<Callback> = {
            let mut channels = self.state.channels.borrow_mut();
            Self::channel(&mut channels, id)
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect()
        };

        trace!("event {id}: publishing to {} subscriber(s)", snapshot.len());
        for callback in snapshot {
            callback(&payload);
        }
    }

    /// Publishes `payload` and stores it as the latched record for `id`.
    ///
    /// Every subscriber registered after this call still receives the
    /// payload once, immediately upon subscribing, until a newer
    /// `publish_latched` for the same id overwrites the record.
    pub fn publish_latched(&self, id: EventId, payload: Payload) {
        self.publish(id, Rc::clone(&payload));
        debug!("event {id}: latched payload stored");
        self.state.latched.borrow_mut().insert(id, payload);
    }

    /// Returns the latched payload for `id`, if one is stored.
    pub fn latched(&self, id: EventId) -> Option<Payload> {
        self.state.latched.borrow().get(&id).cloned()
    }

    /// Returns the number of live registrations for `id`.
    pub fn subscriber_count(&self, id: EventId) -> usize {
        self.state
            .channels
            .borrow()
            .get(&id)
            .map_or(0, |subscribers| subscribers.len())
    }

    /// Returns `true` if `other` is a handle to the same shared bus.
    pub fn same_bus(&self, other: &EventBus) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn channel<'a>(
        channels: &'a mut HashMap<EventId, Vec<Subscriber>>,
        id: EventId,
    ) -> &'a mut Vec<Subscriber> {
        channels.entry(id).or_insert_with(|| {
            debug!("event {id} registered");
            Vec::new()
        })
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
