//! System Abstractions
//!
//! A **system** is a unit of logic run once per tick. Systems are plain
//! `UPDATE` subscribers: registration order is execution order, and every
//! system runs to completion before the next one starts. There is no
//! scheduler; the synchronous bus *is* the schedule.
//!
//! [`FnSystem`] lets gameplay and simulation logic be written as plain
//! closures without a dedicated type, which is the preferred form for
//! most systems.

use std::cell::RefCell;

use crate::engine::events::{EventBus, Payload};
use crate::engine::manager::{Engine, UpdateEvent};
use crate::engine::types::{Seconds, SubscriptionId, UPDATE};


/// A unit of executable logic run once per tick.
///
/// Systems receive the publishing engine and the tick's time step; they
/// query entities and components through the engine and mutate component
/// data in place. A system must not trigger a nested tick from inside
/// `run`.
pub trait System: 'static {
    /// Human-readable name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Executes the system logic for one tick.
    fn run(&mut self, engine: &Engine, dt: Seconds);
}

/// A concrete [`System`] backed by a function or closure.
pub struct FnSystem<F>
where
    F: FnMut(&Engine, Seconds) + 'static,
{
    name: &'static str,
    f: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&Engine, Seconds) + 'static,
{
    /// Creates a new function-backed system.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> System for FnSystem<F>
where
    F: FnMut(&Engine, Seconds) + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&mut self, engine: &Engine, dt: Seconds) {
        (self.f)(engine, dt)
    }
}

/// Subscribes `system` to the bus's `UPDATE` event.
///
/// The system runs once per tick, synchronously, in registration order
/// relative to other `UPDATE` subscribers. The returned token can be
/// passed to `EventBus::unsubscribe` to retire the system.
pub fn register_system<S: System>(bus: &EventBus, system: S) -> SubscriptionId {
    let system = RefCell::new(system);
    bus.subscribe(UPDATE, move |event: &Payload| {
        if let Some(update) = event.downcast_ref::<UpdateEvent>() {
            system.borrow_mut().run(&update.engine, update.dt);
        }
    })
}
