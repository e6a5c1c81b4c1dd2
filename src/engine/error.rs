//! Error types for the ownership model and engine lifecycle.
//!
//! This module declares focused, composable error types used across the
//! component attachment, entity registry, and engine lifecycle paths. Each
//! error carries enough context to make failures actionable while
//! remaining small and cheap to pass around or convert into the aggregate
//! [`ECSError`].
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode (e.g.
//!   attaching a component that already has an owner, removing an entity
//!   the engine never saw).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into [`ECSError`]
//!   so call sites can use `?` freely.
//! * **Actionability:** Structured fields (offending component kind,
//!   owning entity name) make logs useful without reproducing the issue.
//!
//! ## Propagation policy
//! All of these are programmer-error-class contract violations. They are
//! surfaced immediately and synchronously to the caller of the violating
//! operation, never swallowed or retried, and the violating operation has
//! no effect. The event bus itself never raises: unknown event ids are
//! auto-registered and unsubscribing an unknown pairing is a silent no-op.
//! That asymmetry (strict ownership, lenient plumbing) is intentional.

use std::fmt;

use crate::engine::component::ComponentKind;
use crate::engine::types::ComponentId;


/// Returned when a component's attachment state is set while it is
/// already attached to an entity.
///
/// Reached through the component base API directly; the entity-level
/// guard surfaces the same misuse as [`AlreadyOwnedError`] first.
///
/// ### Fields
/// * `component`: Instance id of the offending component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyAttachedError {
    /// Instance id of the offending component.
    pub component: ComponentId,
}

impl fmt::Display for AlreadyAttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component #{} is already attached to an entity", self.component)
    }
}

impl std::error::Error for AlreadyAttachedError {}

/// Returned when a component's attachment state is cleared while it is
/// not attached to any entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAttachedError {
    /// Instance id of the offending component.
    pub component: ComponentId,
}

impl fmt::Display for NotAttachedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component #{} is not attached to an entity", self.component)
    }
}

impl std::error::Error for NotAttachedError {}

/// Returned by `Entity::add_component` when the component already belongs
/// to an entity (including the entity the call was made on).
///
/// ### Fields
/// * `kind`: Kind of the component that was offered.
/// * `owner`: Name of the entity that currently owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlreadyOwnedError {
    /// Kind of the component that was offered.
    pub kind: ComponentKind,

    /// Name of the entity that currently owns the component.
    pub owner: String,
}

impl fmt::Display for AlreadyOwnedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "component of kind {} already belongs to entity '{}'",
            self.kind, self.owner
        )
    }
}

impl std::error::Error for AlreadyOwnedError {}

/// Returned by `Entity::remove_component` when the component is not held
/// by the entity.
///
/// No partial mutation occurs: membership is verified before the index,
/// the attachment state, or the bus are touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNotFoundError {
    /// Kind of the component that was looked up.
    pub kind: ComponentKind,

    /// Name of the entity the lookup ran against.
    pub entity: String,
}

impl fmt::Display for ComponentNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "component of kind {} is not held by entity '{}'",
            self.kind, self.entity
        )
    }
}

impl std::error::Error for ComponentNotFoundError {}

/// Returned when the same entity handle is registered twice with one
/// engine. Comparison is by handle identity, not by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntityError {
    /// Name of the entity that was offered twice.
    pub entity: String,
}

impl fmt::Display for DuplicateEntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity '{}' is already registered with the engine", self.entity)
    }
}

impl std::error::Error for DuplicateEntityError {}

/// Returned when an entity handle is removed from an engine it was never
/// registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityError {
    /// Name of the entity that was looked up.
    pub entity: String,
}

impl fmt::Display for UnknownEntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity '{}' is not registered with the engine", self.entity)
    }
}

impl std::error::Error for UnknownEntityError {}

/// Returned when an engine operation runs after `shutdown`.
///
/// ### Fields
/// * `operation`: Name of the rejected operation, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTornDownError {
    /// Name of the rejected operation.
    pub operation: &'static str,
}

impl fmt::Display for EngineTornDownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine is torn down; {} rejected", self.operation)
    }
}

impl std::error::Error for EngineTornDownError {}

/// Aggregate error for all runtime operations.
///
/// Wraps the structured failure modes of the ownership model and the
/// engine lifecycle. `From<T>` conversions are implemented for every
/// underlying error so call sites can write `?` and still return a
/// single, expressive type.
///
/// ### Display
/// `Display` messages are concise single lines suitable for logs. For
/// deep inspection, prefer `Debug`, which retains full structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ECSError {
    /// A component's attachment state was set twice.
    AlreadyAttached(AlreadyAttachedError),

    /// A component's attachment state was cleared while unset.
    NotAttached(NotAttachedError),

    /// A component offered to an entity already has an owner.
    AlreadyOwned(AlreadyOwnedError),

    /// A component removal targeted an entity that does not hold it.
    ComponentNotFound(ComponentNotFoundError),

    /// An entity handle was registered twice with one engine.
    DuplicateEntity(DuplicateEntityError),

    /// An entity removal targeted an engine that never saw the handle.
    UnknownEntity(UnknownEntityError),

    /// An operation ran against an engine after `shutdown`.
    TornDown(EngineTornDownError),
}

impl fmt::Display for ECSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ECSError::AlreadyAttached(e) => write!(f, "{e}"),
            ECSError::NotAttached(e) => write!(f, "{e}"),
            ECSError::AlreadyOwned(e) => write!(f, "{e}"),
            ECSError::ComponentNotFound(e) => write!(f, "{e}"),
            ECSError::DuplicateEntity(e) => write!(f, "{e}"),
            ECSError::UnknownEntity(e) => write!(f, "{e}"),
            ECSError::TornDown(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ECSError {}

impl From<AlreadyAttachedError> for ECSError {
    fn from(e: AlreadyAttachedError) -> Self { ECSError::AlreadyAttached(e) }
}

impl From<NotAttachedError> for ECSError {
    fn from(e: NotAttachedError) -> Self { ECSError::NotAttached(e) }
}

impl From<AlreadyOwnedError> for ECSError {
    fn from(e: AlreadyOwnedError) -> Self { ECSError::AlreadyOwned(e) }
}

impl From<ComponentNotFoundError> for ECSError {
    fn from(e: ComponentNotFoundError) -> Self { ECSError::ComponentNotFound(e) }
}

impl From<DuplicateEntityError> for ECSError {
    fn from(e: DuplicateEntityError) -> Self { ECSError::DuplicateEntity(e) }
}

impl From<UnknownEntityError> for ECSError {
    fn from(e: UnknownEntityError) -> Self { ECSError::UnknownEntity(e) }
}

impl From<EngineTornDownError> for ECSError {
    fn from(e: EngineTornDownError) -> Self { ECSError::TornDown(e) }
}

/// Result alias used across the runtime.
pub type ECSResult<T> = Result<T, ECSError>;
