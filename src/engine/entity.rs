//! Entity: Named Container of Components
//!
//! An [`Entity`] owns zero or more components, indexed by kind, and is
//! the sole authority allowed to attach or detach them. Attach and detach
//! are announced on the bus (`COMPONENT_ADDED` / `COMPONENT_REMOVED`) so
//! that engines and other collaborators can maintain derived state.
//!
//! Entities are created standalone; components may be attached before the
//! entity is registered with an engine. Destroying an entity does not
//! cascade into detaching its components.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;

use crate::engine::component::{ComponentHandle, ComponentKind};
use crate::engine::error::{AlreadyOwnedError, ComponentNotFoundError, ECSResult};
use crate::engine::events::{payload, EventBus};
use crate::engine::types::{COMPONENT_ADDED, COMPONENT_REMOVED};


/// Shared, identity-compared handle to an entity.
pub type EntityHandle = Rc<Entity>;

/// Named container owning components grouped by kind.
///
/// The name is for diagnostics only and need not be unique. The kind
/// index holds each component under its concrete kind and every declared
/// base kind, in attach order per kind.
pub struct Entity {
    name: String,
    bus: EventBus,
    // Handed to components as their parent back-reference on attach.
    weak_self: Weak<Entity>,
    index: RefCell<HashMap<ComponentKind, Vec<ComponentHandle>>>,
}

impl Entity {
    /// Creates an empty entity bound to `bus`.
    pub fn new(name: impl Into<String>, bus: &EventBus) -> EntityHandle {
        Rc::new_cyclic(|weak| Self {
            name: name.into(),
            bus: bus.clone(),
            weak_self: weak.clone(),
            index: RefCell::new(HashMap::new()),
        })
    }

    /// Diagnostic name of this entity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bus this entity announces lifecycle events on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Attaches `component` to this entity.
    ///
    /// ## Errors
    /// `AlreadyOwned` if the component currently records any owner,
    /// including this entity; the call then has no effect.
    ///
    /// ## Events
    /// Publishes `COMPONENT_ADDED` with the handle as payload after the
    /// component is indexed.
    pub fn add_component(&self, component: &ComponentHandle) -> ECSResult<()> {
        if component.is_attached() {
            let owner = component
                .parent()
                .map(|entity| entity.name().to_string())
                .unwrap_or_else(|| String::from("<dropped entity>"));
            return Err(AlreadyOwnedError { kind: component.kind(), owner }.into());
        }

        component.attach(self.weak_self.clone())?;
        {
            let mut index = self.index.borrow_mut();
            for kind in component.query_kinds() {
                index.entry(kind).or_default().push(component.clone());
            }
        }

        debug!("entity '{}': {:?} attached", self.name, component);
        self.bus.publish(COMPONENT_ADDED, payload(component.clone()));
        Ok(())
    }

    /// Detaches `component` from this entity.
    ///
    /// Membership is verified before anything is mutated, so a failing
    /// call has no effect. Lookup is keyed by the component's concrete
    /// kind rather than scanning every bucket.
    ///
    /// ## Errors
    /// `ComponentNotFound` if this entity does not hold the component.
    ///
    /// ## Events
    /// Publishes `COMPONENT_REMOVED` with the handle as payload after the
    /// component is de-indexed and detached.
    pub fn remove_component(&self, component: &ComponentHandle) -> ECSResult<()> {
        // query_kinds always leads with the concrete kind.
        let kinds = component.query_kinds();
        let concrete = kinds[0];

        {
            let mut index = self.index.borrow_mut();
            let held = index
                .get(&concrete)
                .is_some_and(|bucket| bucket.iter().any(|c| c.same_instance(component)));
            if !held {
                return Err(ComponentNotFoundError {
                    kind: concrete,
                    entity: self.name.clone(),
                }
                .into());
            }

            for kind in &kinds {
                if let Some(bucket) = index.get_mut(kind) {
                    bucket.retain(|c| !c.same_instance(component));
                }
            }
        }

        component.detach()?;
        debug!("entity '{}': {:?} detached", self.name, component);
        self.bus.publish(COMPONENT_REMOVED, payload(component.clone()));
        Ok(())
    }

    /// Components indexed under `kind`, in attach order.
    ///
    /// Never fails; returns an empty vector for kinds this entity has
    /// never held.
    pub fn components_by_kind(&self, kind: ComponentKind) -> Vec<ComponentHandle> {
        self.index.borrow().get(&kind).cloned().unwrap_or_default()
    }

    /// First component indexed under `kind`, if any.
    pub fn first_component(&self, kind: ComponentKind) -> Option<ComponentHandle> {
        self.index.borrow().get(&kind).and_then(|bucket| bucket.first().cloned())
    }

    /// Returns `true` if at least one component is indexed under `kind`.
    pub fn has_components_of_kind(&self, kind: ComponentKind) -> bool {
        self.index
            .borrow()
            .get(&kind)
            .is_some_and(|bucket| !bucket.is_empty())
    }

    /// Read-only borrowed view of the full kind index.
    ///
    /// For iteration by external systems. The guard follows `RefCell`
    /// discipline: holding it across `add_component`/`remove_component`
    /// on this entity will panic.
    pub fn component_map(&self) -> Ref<'_, HashMap<ComponentKind, Vec<ComponentHandle>>> {
        self.index.borrow()
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity {{ name: '{}' }}", self.name)
    }
}
