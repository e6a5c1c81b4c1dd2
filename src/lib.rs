//! # ECS Runtime
//!
//! Synchronous Entity-Component-System runtime driven by a
//! publish/subscribe event bus.
//!
//! ## Design Goals
//! - Strict single-ownership of components by entities
//! - Synchronous, subscription-ordered event delivery with latched
//!   (replay-to-late-subscriber) lifecycle events
//! - Explicitly constructed context (no global bus, no singleton engine),
//!   so multiple independent simulations can coexist in one process
//! - Type-tagged component queries with opt-in polymorphic matching
//!
//! The runtime is single-threaded and cooperative: one logical thread of
//! control drives the tick, and every callback runs to completion before
//! control returns to the publisher.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Event bus

pub use engine::events::{
    payload,
    EventBus,
    Payload,
};

// Component model

pub use engine::component::{
    Attachment,
    Component,
    ComponentHandle,
    ComponentKind,
};

// Entities and the engine

pub use engine::entity::{Entity, EntityHandle};

pub use engine::manager::{
    Engine,
    EngineRef,
    SetupEvent,
    UpdateEvent,
};

// Systems and side-channel state

pub use engine::systems::{register_system, FnSystem, System};
pub use engine::ext::ExtStore;

// Errors

pub use engine::error::{
    AlreadyAttachedError,
    AlreadyOwnedError,
    ComponentNotFoundError,
    DuplicateEntityError,
    ECSError,
    ECSResult,
    EngineTornDownError,
    NotAttachedError,
    UnknownEntityError,
};

// Identifier types and standard event ids

pub use engine::types::{
    ComponentId,
    EventId,
    Seconds,
    SubscriptionId,
    COMPONENT_ADDED,
    COMPONENT_REMOVED,
    ENTITY_ADDED,
    ENTITY_REMOVED,
    FIRST_USER_EVENT,
    SETUP,
    TEARDOWN,
    UPDATE,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used runtime types.
///
/// Import with:
/// ```rust
/// use ecs_runtime::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        payload,
        register_system,
        Attachment,
        Component,
        ComponentHandle,
        ComponentKind,
        ECSError,
        ECSResult,
        Engine,
        Entity,
        EntityHandle,
        EventBus,
        FnSystem,
        SetupEvent,
        System,
        UpdateEvent,
    };
}
