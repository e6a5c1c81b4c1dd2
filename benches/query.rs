#![allow(dead_code)]

use criterion::*;
use std::hint::black_box;

use ecs_runtime::prelude::*;

struct Position {
    attachment: Attachment,
    x: f64,
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

/// Builds an engine with `entities` registered entities. Every entity has
/// a position; every other entity also has a control.
fn setup_world(entities: usize) -> (EventBus, Engine) {
    let bus = EventBus::new();
    let engine = Engine::new(&bus);

    for index in 0..entities {
        let entity = Entity::new(format!("agent{index}"), &bus);
        entity
            .add_component(&ComponentHandle::new(Position {
                attachment: Attachment::new(),
                x: index as f64,
            }))
            .unwrap();

        if index % 2 == 0 {
            entity
                .add_component(&ComponentHandle::new(Control {
                    attachment: Attachment::new(),
                    throttle: 1.0,
                }))
                .unwrap();
        }

        engine.add_entity(&entity).unwrap();
    }

    (bus, engine)
}

fn query_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    for entities in [100usize, 1_000, 10_000] {
        let (_bus, engine) = setup_world(entities);

        group.bench_function(format!("components_by_kind_{entities}"), |b| {
            b.iter(|| black_box(engine.components_by_kind(ComponentKind::of::<Position>())));
        });

        group.bench_function(format!("entities_with_components_{entities}"), |b| {
            let kinds = [
                ComponentKind::of::<Position>(),
                ComponentKind::of::<Control>(),
            ];
            b.iter(|| black_box(engine.entities_with_components(&kinds)));
        });
    }

    group.finish();
}

criterion_group!(benches, query_benchmark);
criterion_main!(benches);
