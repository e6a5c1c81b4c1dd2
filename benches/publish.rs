use criterion::*;
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use ecs_runtime::prelude::*;
use ecs_runtime::{EventId, FIRST_USER_EVENT};

const TICK: EventId = FIRST_USER_EVENT;

fn publish_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");

    for subscribers in [1usize, 16, 256] {
        group.bench_function(format!("fan_out_{subscribers}"), |b| {
            let bus = EventBus::new();
            let sink = Rc::new(Cell::new(0u64));

            for _ in 0..subscribers {
                let sink = Rc::clone(&sink);
                bus.subscribe(TICK, move |_| sink.set(sink.get().wrapping_add(1)));
            }

            b.iter(|| bus.publish(TICK, payload(black_box(1u32))));
        });
    }

    group.bench_function("publish_no_subscribers", |b| {
        let bus = EventBus::new();
        b.iter(|| bus.publish(TICK, payload(black_box(1u32))));
    });

    group.bench_function("latched_subscribe_replay", |b| {
        let bus = EventBus::new();
        bus.publish_latched(TICK, payload(1u32));

        b.iter(|| {
            let token = bus.subscribe(TICK, |event| {
                black_box(event.downcast_ref::<u32>());
            });
            bus.unsubscribe(TICK, token);
        });
    });

    group.finish();
}

criterion_group!(benches, publish_benchmark);
criterion_main!(benches);
