//! Engine: Entity Registry, Component Mirror, and Tick Driver
//!
//! This module defines the top-level orchestration object of the runtime,
//! responsible for:
//!
//! * registering entities (insertion-ordered, identity-unique),
//! * maintaining a cross-entity component index (the *mirror*) fed purely
//!   by `COMPONENT_ADDED` / `COMPONENT_REMOVED` events,
//! * driving the tick by publishing `UPDATE`,
//! * announcing its own lifecycle through latched `SETUP` and `TEARDOWN`
//!   events.
//!
//! ## Handles
//! [`Engine`] is a cheaply clonable strong handle over shared state;
//! [`EngineRef`] is the weak counterpart carried inside latched payloads
//! so the bus never keeps an engine alive through its own latch records.
//!
//! ## Mirror policy
//! The mirror is a global component index over the bus the engine
//! observes: every attach announced on that bus lands in the mirror,
//! whether or not the owning entity is registered with this engine. This
//! keeps the index purely event-driven; entity registration only affects
//! the entity-level AND query.
//!
//! ## Lifecycle
//! Construction subscribes the mirror handlers before anything else, then
//! publishes a latched `SETUP` carrying an [`EngineRef`]; any collaborator
//! that subscribes to `SETUP` later still receives it exactly once.
//! [`Engine::shutdown`] is the explicit teardown point: it unsubscribes
//! the mirror handlers, publishes a latched `TEARDOWN`, clears the
//! registry and mirror, and marks the engine torn down. Afterwards
//! mutating operations and `update` fail with `EngineTornDown`; queries
//! stay infallible and observe the cleared state.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;

use crate::engine::component::{ComponentHandle, ComponentKind};
use crate::engine::entity::EntityHandle;
use crate::engine::error::{
    DuplicateEntityError, ECSResult, EngineTornDownError, UnknownEntityError,
};
use crate::engine::events::{payload, EventBus, Payload};
use crate::engine::types::{Seconds, COMPONENT_ADDED, COMPONENT_REMOVED, SETUP, TEARDOWN, UPDATE};


/// Payload of the `UPDATE` event: one synchronous tick.
///
/// Carries a strong engine handle; `UPDATE` is never latched, so the
/// payload lives only for the duration of the dispatch unless a
/// subscriber deliberately keeps it.
pub struct UpdateEvent {
    /// Engine that published the tick.
    pub engine: Engine,

    /// Time step for this tick, in seconds.
    pub dt: Seconds,
}

/// Payload of the latched `SETUP` event.
///
/// Carries a weak handle: the latch record outlives any particular
/// engine, and must not keep one alive.
pub struct SetupEvent {
    /// Weak handle to the engine that was constructed.
    pub engine: EngineRef,
}

/// Mirror of every component announced on the bus, with a per-kind index
/// built from each component's query kinds at attach time.
#[derive(Default)]
struct Mirror {
    all: Vec<ComponentHandle>,
    by_kind: HashMap<ComponentKind, Vec<ComponentHandle>>,
}

impl Mirror {
    fn insert(&mut self, component: &ComponentHandle) {
        self.all.push(component.clone());
        for kind in component.query_kinds() {
            self.by_kind.entry(kind).or_default().push(component.clone());
        }
    }

    fn remove(&mut self, component: &ComponentHandle) {
        self.all.retain(|c| !c.same_instance(component));
        for kind in component.query_kinds() {
            if let Some(bucket) = self.by_kind.get_mut(&kind) {
                bucket.retain(|c| !c.same_instance(component));
            }
        }
    }
}

struct EngineState {
    bus: EventBus,
    entities: RefCell<Vec<EntityHandle>>,
    mirror: RefCell<Mirror>,
    subscriptions: Cell<(u64, u64)>,
    torn_down: Cell<bool>,
}

/// Strong handle to a shared engine.
///
/// Clones share state. Construct with [`Engine::new`]; tear down with
/// [`Engine::shutdown`].
#[derive(Clone)]
pub struct Engine {
    state: Rc<EngineState>,
}

/// Weak handle to an engine, carried inside latched payloads.
#[derive(Clone)]
pub struct EngineRef {
    state: Weak<EngineState>,
}

impl EngineRef {
    /// Upgrades to a strong handle if the engine is still alive.
    pub fn upgrade(&self) -> Option<Engine> {
        self.state.upgrade().map(|state| Engine { state })
    }
}

impl Engine {
    /// Creates an engine bound to `bus`.
    ///
    /// Subscribes the mirror handlers to `COMPONENT_ADDED` and
    /// `COMPONENT_REMOVED` before anything else, then publishes a latched
    /// `SETUP` carrying a weak handle to the new engine.
    pub fn new(bus: &EventBus) -> Engine {
        debug!("engine: initialization");
        let engine = Engine {
            state: Rc::new(EngineState {
                bus: bus.clone(),
                entities: RefCell::new(Vec::new()),
                mirror: RefCell::new(Mirror::default()),
                subscriptions: Cell::new((0, 0)),
                torn_down: Cell::new(false),
            }),
        };

        let weak = Rc::downgrade(&engine.state);
        let added = bus.subscribe(COMPONENT_ADDED, move |event: &Payload| {
            if let (Some(state), Some(component)) =
                (weak.upgrade(), event.downcast_ref::<ComponentHandle>())
            {
                state.mirror.borrow_mut().insert(component);
            }
        });

        let weak = Rc::downgrade(&engine.state);
        let removed = bus.subscribe(COMPONENT_REMOVED, move |event: &Payload| {
            if let (Some(state), Some(component)) =
                (weak.upgrade(), event.downcast_ref::<ComponentHandle>())
            {
                state.mirror.borrow_mut().remove(component);
            }
        });

        engine.state.subscriptions.set((added, removed));
        bus.publish_latched(SETUP, payload(SetupEvent { engine: engine.downgrade() }));
        engine
    }

    /// Returns a weak handle to this engine.
    pub fn downgrade(&self) -> EngineRef {
        EngineRef { state: Rc::downgrade(&self.state) }
    }

    /// The bus this engine publishes and observes on.
    pub fn bus(&self) -> &EventBus {
        &self.state.bus
    }

    /// Returns `true` if `other` is a handle to the same engine.
    pub fn same_engine(&self, other: &Engine) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Registers `entity` with this engine.
    ///
    /// ## Errors
    /// `DuplicateEntity` if the same handle is already registered
    /// (identity comparison); `EngineTornDown` after `shutdown`.
    pub fn add_entity(&self, entity: &EntityHandle) -> ECSResult<()> {
        self.guard("add_entity")?;

        let mut entities = self.state.entities.borrow_mut();
        if entities.iter().any(|e| Rc::ptr_eq(e, entity)) {
            return Err(DuplicateEntityError { entity: entity.name().to_string() }.into());
        }
        entities.push(entity.clone());
        Ok(())
    }

    /// Unregisters `entity` from this engine.
    ///
    /// ## Errors
    /// `UnknownEntity` if the handle was never registered;
    /// `EngineTornDown` after `shutdown`.
    pub fn remove_entity(&self, entity: &EntityHandle) -> ECSResult<()> {
        self.guard("remove_entity")?;

        let mut entities = self.state.entities.borrow_mut();
        let position = entities.iter().position(|e| Rc::ptr_eq(e, entity));
        match position {
            Some(index) => {
                entities.remove(index);
                Ok(())
            }
            None => Err(UnknownEntityError { entity: entity.name().to_string() }.into()),
        }
    }

    /// Publishes one `UPDATE` tick with `dt`.
    ///
    /// All subscribed systems run synchronously, in subscription order,
    /// before this method returns.
    ///
    /// ## Errors
    /// `EngineTornDown` after `shutdown`.
    pub fn update(&self, dt: Seconds) -> ECSResult<()> {
        self.guard("update")?;
        self.state
            .bus
            .publish(UPDATE, payload(UpdateEvent { engine: self.clone(), dt }));
        Ok(())
    }

    /// Registered entities holding at least one component of **every**
    /// kind in `kinds`, in registration order.
    ///
    /// The empty list matches every registered entity.
    pub fn entities_with_components(&self, kinds: &[ComponentKind]) -> Vec<EntityHandle> {
        self.state
            .entities
            .borrow()
            .iter()
            .filter(|entity| kinds.iter().all(|&kind| entity.has_components_of_kind(kind)))
            .cloned()
            .collect()
    }

    /// Every mirrored component indexed under `kind` (concrete or
    /// declared base kind), in mirror insertion order.
    pub fn components_by_kind(&self, kind: ComponentKind) -> Vec<ComponentHandle> {
        self.state
            .mirror
            .borrow()
            .by_kind
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.state.entities.borrow().len()
    }

    /// Number of distinct components currently mirrored.
    pub fn component_count(&self) -> usize {
        self.state.mirror.borrow().all.len()
    }

    /// Tears the engine down.
    ///
    /// Unsubscribes the mirror handlers, publishes a latched `TEARDOWN`
    /// (late subscribers still observe shutdown), clears the registry and
    /// mirror, and rejects all further mutating operations.
    ///
    /// ## Errors
    /// `EngineTornDown` if called twice.
    pub fn shutdown(&self) -> ECSResult<()> {
        self.guard("shutdown")?;
        debug!("engine: deinitialization");

        self.state.torn_down.set(true);
        let (added, removed) = self.state.subscriptions.get();
        self.state.bus.unsubscribe(COMPONENT_ADDED, added);
        self.state.bus.unsubscribe(COMPONENT_REMOVED, removed);

        self.state.bus.publish_latched(TEARDOWN, payload(()));

        self.state.entities.borrow_mut().clear();
        *self.state.mirror.borrow_mut() = Mirror::default();
        Ok(())
    }

    /// Returns `true` after `shutdown` has run.
    pub fn is_torn_down(&self) -> bool {
        self.state.torn_down.get()
    }

    fn guard(&self, operation: &'static str) -> ECSResult<()> {
        if self.state.torn_down.get() {
            return Err(EngineTornDownError { operation }.into());
        }
        Ok(())
    }
}
