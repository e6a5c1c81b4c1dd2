//! Core Runtime Types and Identifiers
//!
//! This module defines the **fundamental identifier types and event id
//! constants** shared across the runtime: the event bus, the component
//! model, entities, and the engine.
//!
//! ## Design Philosophy
//!
//! The runtime is designed around:
//!
//! - **Opaque numeric identifiers** for events, subscriptions, and
//!   component instances,
//! - **An open event id space** where application-specific ids coexist
//!   with the standard lifecycle ids without central registration,
//! - **Small, copyable values** that are cheap to pass through event
//!   payloads and log lines.
//!
//! ## Standard Event Ids
//!
//! The lifecycle ids below are a stable contract for the lifetime of a
//! process. `ENTITY_ADDED` and `ENTITY_REMOVED` are reserved in the id
//! space but are not currently published by the engine; collaborators
//! must not rely on them firing.

/// Opaque token naming a class of pub/sub event.
///
/// Ids are auto-registered by the bus on first use; applications may mint
/// their own ids freely (see [`FIRST_USER_EVENT`]).
pub type EventId = u32;

/// Token identifying one subscription on the bus.
///
/// Returned by `EventBus::subscribe` and consumed by
/// `EventBus::unsubscribe`. Tokens are unique per bus instance.
pub type SubscriptionId = u64;

/// Unique identifier for a component *instance* (not its type).
///
/// Assigned once at construction and never reused within a process, so it
/// is safe as a key in side-channel maps that outlive the component.
pub type ComponentId = u64;

/// Simulation time step, in seconds.
pub type Seconds = f64;

/// A component was attached to an entity. Payload: `ComponentHandle`.
pub const COMPONENT_ADDED: EventId = 1;
/// A component was detached from an entity. Payload: `ComponentHandle`.
pub const COMPONENT_REMOVED: EventId = 2;
/// Reserved; not published by the engine.
pub const ENTITY_ADDED: EventId = 3;
/// Reserved; not published by the engine.
pub const ENTITY_REMOVED: EventId = 4;
/// One simulation tick. Payload: `UpdateEvent`.
pub const UPDATE: EventId = 5;
/// Engine construction, published latched. Payload: `SetupEvent`.
pub const SETUP: EventId = 6;
/// Engine shutdown, published latched. Payload: `()`.
pub const TEARDOWN: EventId = 7;

/// Conventional start of the application-defined event id range.
///
/// Ids below this value are reserved for the runtime; ids at or above it
/// are never interpreted by the runtime itself.
pub const FIRST_USER_EVENT: EventId = 1000;
