//! End-to-end scenario: a small vehicle simulation assembled from the
//! public surface only, the way a host application would wire it up.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ecs_runtime::prelude::*;
use ecs_runtime::{EventId, ExtStore, FIRST_USER_EVENT, UPDATE};

/// Application-defined event: all initial components exist, presentation
/// state may now be built.
const INIT_GRAPHICS: EventId = FIRST_USER_EVENT;

struct Position {
    attachment: Attachment,
    x: f64,
    y: f64,
    rot: f64,
}

impl Position {
    fn handle(x: f64, y: f64) -> ComponentHandle {
        ComponentHandle::new(Self { attachment: Attachment::new(), x, y, rot: 0.0 })
    }
}

impl Component for Position {
    fn kind(&self) -> ComponentKind {
        ComponentKind::of::<Position>()
    }

    fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    fn attachment_mut(&mut self) -> &mut Attachment {
        &mut self.attachment
    }
}

struct Control {
    attachment: Attachment,
    throttle: f64,
}

impl Control {
    fn handle(throttle: f64) -> ComponentHandle {
        ComponentHandle::new(Self { attachment: Attachment::new(), throttle })
    }
}

impl Component for Control {
    fn kind(&self) -> ComponentKind {
        ComponentKind::of::<Control>()
    }

    fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    fn attachment_mut(&mut self) -> &mut Attachment {
        &mut self.attachment
    }
}

struct Visual {
    attachment: Attachment,
    #[allow(dead_code)]
    color: (u8, u8, u8),
}

impl Visual {
    fn handle(color: (u8, u8, u8)) -> ComponentHandle {
        ComponentHandle::new(Self { attachment: Attachment::new(), color })
    }
}

impl Component for Visual {
    fn kind(&self) -> ComponentKind {
        ComponentKind::of::<Visual>()
    }

    fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    fn attachment_mut(&mut self) -> &mut Attachment {
        &mut self.attachment
    }
}

/// Moves every controlled entity: throttle advances the x coordinate,
/// and the hull turns one degree per tick.
fn control_system(engine: &Engine, dt: f64) {
    for control in engine.components_by_kind(ComponentKind::of::<Control>()) {
        let Some(owner) = control.parent() else { continue };
        let Some(position) = owner.first_component(ComponentKind::of::<Position>()) else {
            continue;
        };

        let throttle = control.read::<Control>().expect("control component").throttle;
        let mut position = position.write::<Position>().expect("position component");
        position.x += throttle * dt;
        position.rot += 1.0;
    }
}

#[test]
fn five_ticks_advance_the_car_by_five() -> ECSResult<()> {
    let bus = EventBus::new();
    let engine = Engine::new(&bus);

    register_system(&bus, FnSystem::new("control", control_system));

    let car = Entity::new("car1", &bus);
    let position = Position::handle(0.0, 0.0);
    car.add_component(&position)?;
    car.add_component(&Control::handle(1.0))?;
    car.add_component(&Visual::handle((255, 0, 0)))?;
    engine.add_entity(&car)?;

    for _ in 0..5 {
        engine.update(1.0)?;
    }

    let data = position.read::<Position>().expect("position component");
    assert_eq!(data.x, 5.0);
    assert_eq!(data.y, 0.0);
    assert_eq!(data.rot, 5.0);
    Ok(())
}

#[test]
fn systems_run_in_registration_order_each_tick() -> ECSResult<()> {
    let bus = EventBus::new();
    let engine = Engine::new(&bus);
    let trace: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&trace);
    register_system(&bus, FnSystem::new("input", move |_: &Engine, _| {
        log.borrow_mut().push("input");
    }));
    let log = Rc::clone(&trace);
    register_system(&bus, FnSystem::new("control", move |_: &Engine, _| {
        log.borrow_mut().push("control");
    }));

    engine.update(1.0)?;
    engine.update(1.0)?;
    assert_eq!(*trace.borrow(), vec!["input", "control", "input", "control"]);
    Ok(())
}

#[test]
fn presentation_state_lives_beside_components_and_follows_their_lifecycle() -> ECSResult<()> {
    let bus = EventBus::new();
    let engine = Engine::new(&bus);

    // The presentation layer owns its per-component state in a side
    // channel keyed by component identity.
    let sprites: Rc<ExtStore<u32>> = Rc::new(ExtStore::new(&bus));
    let next_sprite = Rc::new(Cell::new(100u32));

    let renderer_sprites = Rc::clone(&sprites);
    let renderer_ids = Rc::clone(&next_sprite);
    bus.subscribe(INIT_GRAPHICS, move |event| {
        let Some(update) = event.downcast_ref::<UpdateEvent>() else { return };
        for visual in update.engine.components_by_kind(ComponentKind::of::<Visual>()) {
            renderer_sprites.insert(&visual, renderer_ids.get());
            renderer_ids.set(renderer_ids.get() + 1);
        }
    });

    let car = Entity::new("car1", &bus);
    let visual = Visual::handle((255, 0, 0));
    car.add_component(&visual)?;
    engine.add_entity(&car)?;

    // All initial components exist; let the renderer build its handles.
    bus.publish(INIT_GRAPHICS, payload(UpdateEvent { engine: engine.clone(), dt: 0.0 }));
    assert_eq!(sprites.len(), 1);
    assert_eq!(*sprites.get(&visual).expect("sprite built"), 100);

    // Detach clears the derived state, so a re-attach starts clean.
    car.remove_component(&visual)?;
    assert!(sprites.is_empty());
    assert!(!sprites.contains(&visual));

    car.add_component(&visual)?;
    assert!(sprites.get(&visual).is_none());
    Ok(())
}

#[test]
fn a_tick_observes_component_changes_made_by_earlier_systems() -> ECSResult<()> {
    let bus = EventBus::new();
    let engine = Engine::new(&bus);

    let car = Entity::new("car1", &bus);
    let spare = Entity::new("spare", &bus);
    let control = Control::handle(1.0);
    car.add_component(&control)?;
    engine.add_entity(&car)?;
    engine.add_entity(&spare)?;

    // First subscriber re-parents the control component mid-tick.
    let from = car.clone();
    let to = spare.clone();
    let handle = control.clone();
    let relocated = Rc::new(Cell::new(false));
    let done = Rc::clone(&relocated);
    bus.subscribe(UPDATE, move |_| {
        if !done.get() {
            from.remove_component(&handle).expect("control is on car1");
            to.add_component(&handle).expect("control is detached");
            done.set(true);
        }
    });

    // Second subscriber sees the move reflected within the same tick.
    let owner_name = Rc::new(RefCell::new(String::new()));
    let probe = Rc::clone(&owner_name);
    bus.subscribe(UPDATE, move |event| {
        let Some(update) = event.downcast_ref::<UpdateEvent>() else { return };
        let holders = update
            .engine
            .entities_with_components(&[ComponentKind::of::<Control>()]);
        if let Some(first) = holders.first() {
            *probe.borrow_mut() = first.name().to_string();
        }
    });

    engine.update(1.0)?;
    assert_eq!(*owner_name.borrow(), "spare");
    let owner = control.parent().expect("control stays attached");
    assert!(Rc::ptr_eq(&owner, &spare));
    Ok(())
}
