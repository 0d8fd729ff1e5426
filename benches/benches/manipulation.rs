// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use understory_manipulation::{
    ManipulationConfig, ManipulationLogic, ManipulationModes, ManipulationPivot,
};

/// `n` contacts on a circle that drifts, turns and breathes with `frame`.
fn contacts(n: u32, frame: u32) -> Vec<(u32, Point)> {
    let t = f64::from(frame);
    let center = Point::new(400.0 + t * 0.5, 300.0 - t * 0.25);
    let radius = 80.0 + (t * 0.05).sin() * 20.0;
    (0..n)
        .map(|i| {
            let a = t * 0.01 + core::f64::consts::TAU * f64::from(i) / f64::from(n);
            (i, center + Vec2::new(a.cos(), a.sin()) * radius)
        })
        .collect()
}

fn bench_logic(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_manipulation");
    group.sample_size(50);

    for &n in &[1_u32, 2, 5, 10] {
        let frames: Vec<_> = (0..256).map(|f| contacts(n, f)).collect();

        group.bench_function(format!("process_256_frames(n={n})"), |b| {
            b.iter_batched(
                || {
                    let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
                    logic.seed(&frames[0], 0);
                    logic
                },
                |mut logic| {
                    for (i, positions) in frames.iter().enumerate().skip(1) {
                        black_box(logic.process(positions, 16 * i as u64));
                    }
                    black_box(logic.cumulative());
                },
                BatchSize::SmallInput,
            );
        });
    }

    let frames: Vec<_> = (0..256).map(|f| contacts(1, f)).collect();
    group.bench_function("process_256_frames_pivot(n=1)", |b| {
        b.iter_batched(
            || {
                let mut logic = ManipulationLogic::new(&ManipulationConfig::default());
                logic.set_pivot(ManipulationPivot::new(Point::new(400.0, 300.0), 50.0).ok());
                logic.set_modes(ManipulationModes::ALL);
                logic.seed(&frames[0], 0);
                logic
            },
            |mut logic| {
                for (i, positions) in frames.iter().enumerate().skip(1) {
                    black_box(logic.process(positions, 16 * i as u64));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_logic);
criterion_main!(benches);
