// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use understory_inertia::{
    AxisInertia, InertiaIntegrator, InertiaParameters, InertiaProcessor, Stop, TranslationInertia,
};

fn params() -> InertiaParameters {
    let mut params = InertiaParameters::new(Point::new(100.0, 100.0), 0);
    params.translation = Some(TranslationInertia {
        initial_velocity: Vec2::new(2.0, -1.0),
        stop: Stop::Deceleration(0.001),
    });
    params.rotation = Some(AxisInertia {
        initial_velocity: 0.002,
        stop: Stop::Distance(1.5),
    });
    params.expansion = Some(AxisInertia {
        initial_velocity: 0.1,
        stop: Stop::Deceleration(0.0001),
    });
    params.initial_radius = 60.0;
    params
}

fn bench_inertia(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_inertia");

    group.bench_function("processor_new", |b| {
        let params = params();
        b.iter(|| black_box(InertiaProcessor::new(black_box(&params))));
    });

    group.bench_function("advance_to_rest_16ms", |b| {
        let params = params();
        b.iter(|| {
            let mut processor = InertiaProcessor::new(&params);
            let mut now = 0;
            while !processor.is_complete() {
                now += 16;
                black_box(processor.advance(now));
            }
            now
        });
    });

    group.finish();
}

criterion_group!(benches, bench_inertia);
criterion_main!(benches);
