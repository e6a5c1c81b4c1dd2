//! Component Model
//!
//! This module defines the unit of typed data the runtime manages:
//! the [`Component`] trait, the [`Attachment`] base state every component
//! embeds, the [`ComponentKind`] type tag used as the query key, and the
//! shared [`ComponentHandle`] the rest of the runtime passes around.
//!
//! ## Design
//! - A component is a plain struct embedding an [`Attachment`] and
//!   implementing [`Component`]. The attachment carries the instance id
//!   and the back-reference to the owning entity.
//! - Kinds are **explicit type tags** ([`ComponentKind::of::<T>`]) rather
//!   than runtime type inspection. Polymorphic matching is opt-in: a
//!   component declares the base kinds it should also answer queries for
//!   via [`Component::base_kinds`], and the entity/engine indexes are
//!   built from those declarations at attach time.
//! - Handles are `Rc<RefCell<dyn Component>>` wrappers: cheap to clone,
//!   compared by identity, downcast on access.
//!
//! ## Invariants
//! - A component instance is owned by at most one entity at a time.
//! - Attaching an already-attached component and detaching a
//!   never-attached component are hard errors.
//! - Instance ids are unique for the lifetime of the process.
//!
//! ## Example
//! ```ignore
//! struct Position {
//!     attachment: Attachment,
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl Component for Position {
//!     fn kind(&self) -> ComponentKind { ComponentKind::of::<Position>() }
//!     fn attachment(&self) -> &Attachment { &self.attachment }
//!     fn attachment_mut(&mut self) -> &mut Attachment { &mut self.attachment }
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::entity::{Entity, EntityHandle};
use crate::engine::error::{AlreadyAttachedError, NotAttachedError};
use crate::engine::types::ComponentId;


/// Stable type tag identifying a component kind.
///
/// Carries the Rust `TypeId` for matching and the type name for
/// diagnostics. Obtained with [`ComponentKind::of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentKind {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    /// Returns the kind tag for component type `T`.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Rust type name backing this kind, for diagnostics.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Monotonic source of component instance ids.
static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Attachment state embedded in every component.
///
/// Tracks the instance id and the (weak) back-reference to the owning
/// entity. The weak reference keeps the ownership graph acyclic: entities
/// own their components strongly, components refer back weakly.
#[derive(Debug)]
pub struct Attachment {
    id: ComponentId,
    parent: Option<Weak<Entity>>,
}

impl Default for Attachment {
    fn default() -> Self {
        Self::new()
    }
}

impl Attachment {
    /// Creates detached attachment state with a fresh instance id.
    pub fn new() -> Self {
        Self {
            id: NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed),
            parent: None,
        }
    }

    /// Instance id of the component this state belongs to.
    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Current owning entity, or `None` when detached (or when the owner
    /// has been dropped without detaching; see [`Attachment::is_attached`]).
    pub fn parent(&self) -> Option<EntityHandle> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Returns `true` while an owner is recorded.
    ///
    /// Stays `true` even if the owning entity has been dropped: entity
    /// destruction does not cascade into detachment, so a component
    /// stranded this way must be detached explicitly before it can be
    /// attached elsewhere.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// Records `parent` as the owner.
    pub(crate) fn attach(&mut self, parent: Weak<Entity>) -> Result<(), AlreadyAttachedError> {
        if self.parent.is_some() {
            return Err(AlreadyAttachedError { component: self.id });
        }
        self.parent = Some(parent);
        Ok(())
    }

    /// Clears the owner record.
    pub(crate) fn detach(&mut self) -> Result<(), NotAttachedError> {
        if self.parent.is_none() {
            return Err(NotAttachedError { component: self.id });
        }
        self.parent = None;
        Ok(())
    }
}

/// A unit of typed data attachable to exactly one entity.
///
/// Implementors embed an [`Attachment`] and expose it through the two
/// accessors; `kind` returns the tag for the concrete type. Override
/// [`Component::base_kinds`] to additionally answer queries for declared
/// base kinds (the runtime's replacement for subclass matching).
pub trait Component: Any {
    /// Tag of the concrete component type.
    fn kind(&self) -> ComponentKind;

    /// Base kinds this component also answers queries for.
    ///
    /// Evaluated once per attach; the declared kinds are folded into the
    /// entity and engine indexes alongside the concrete kind.
    fn base_kinds(&self) -> Vec<ComponentKind> {
        Vec::new()
    }

    /// Shared view of the attachment state.
    fn attachment(&self) -> &Attachment;

    /// Exclusive view of the attachment state.
    fn attachment_mut(&mut self) -> &mut Attachment;
}

/// Shared, identity-compared handle to a component instance.
///
/// Cloning a handle never clones the component. Typed access goes through
/// [`ComponentHandle::read`] / [`ComponentHandle::write`]; the returned
/// guards follow `RefCell` discipline and must not be held across
/// structural calls (attach, detach, publish).
#[derive(Clone)]
pub struct ComponentHandle {
    inner: Rc<RefCell<dyn Component>>,
}

impl ComponentHandle {
    /// Wraps a freshly constructed component into a handle.
    pub fn new<C: Component>(component: C) -> Self {
        Self { inner: Rc::new(RefCell::new(component)) }
    }

    /// Instance id of the component.
    pub fn id(&self) -> ComponentId {
        self.inner.borrow().attachment().id()
    }

    /// Tag of the concrete component type.
    pub fn kind(&self) -> ComponentKind {
        self.inner.borrow().kind()
    }

    /// Every kind this component is indexed under: the concrete kind
    /// followed by the declared base kinds, deduplicated.
    pub fn query_kinds(&self) -> Vec<ComponentKind> {
        let component = self.inner.borrow();
        let concrete = component.kind();
        let mut kinds = vec![concrete];
        for base in component.base_kinds() {
            if !kinds.contains(&base) {
                kinds.push(base);
            }
        }
        kinds
    }

    /// Returns `true` if this component answers queries for `kind`.
    pub fn matches(&self, kind: ComponentKind) -> bool {
        let component = self.inner.borrow();
        component.kind() == kind || component.base_kinds().contains(&kind)
    }

    /// Current owning entity, if any.
    pub fn parent(&self) -> Option<EntityHandle> {
        self.inner.borrow().attachment().parent()
    }

    /// Returns `true` while an owner is recorded (see
    /// [`Attachment::is_attached`]).
    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attachment().is_attached()
    }

    /// Returns `true` if `other` refers to the same component instance.
    pub fn same_instance(&self, other: &ComponentHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Shared typed access to the component data.
    ///
    /// Returns `None` if the component is not a `T`.
    pub fn read<T: Component>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.inner.borrow(), |component| {
            let any: &dyn Any = component;
            any.downcast_ref::<T>()
        })
        .ok()
    }

    /// Exclusive typed access to the component data.
    ///
    /// Returns `None` if the component is not a `T`.
    pub fn write<T: Component>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.inner.borrow_mut(), |component| {
            let any: &mut dyn Any = component;
            any.downcast_mut::<T>()
        })
        .ok()
    }

    /// Shared type-erased access.
    pub fn borrow(&self) -> Ref<'_, dyn Component> {
        self.inner.borrow()
    }

    /// Exclusive type-erased access.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Component> {
        self.inner.borrow_mut()
    }

    pub(crate) fn attach(&self, parent: Weak<Entity>) -> Result<(), AlreadyAttachedError> {
        self.inner.borrow_mut().attachment_mut().attach(parent)
    }

    pub(crate) fn detach(&self) -> Result<(), NotAttachedError> {
        self.inner.borrow_mut().attachment_mut().detach()
    }
}

impl fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let component = self.inner.borrow();
        write!(
            f,
            "ComponentHandle {{ id: {}, kind: {} }}",
            component.attachment().id(),
            component.kind()
        )
    }
}
