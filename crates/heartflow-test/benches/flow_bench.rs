//! Benchmarks for the Heartflow frame pipeline

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use heartflow_core::{
    CanvasPoint, DisplayConfig, FrameTime, Handedness, PathConfig, SimConfig, VelocityConfig,
};
use heartflow_sim::{
    CoordinateMapper, DrawList, FlowEngine, PathBuilder, Rgba, SolidColor, TrackedPoint,
    VelocityEstimator,
};
use heartflow_test::{recorded_frames, PerformerConfig};

fn bench_engine_tick(c: &mut Criterion) {
    let frames = recorded_frames(PerformerConfig::dancing(), 1, 600);
    let sampler = SolidColor(Rgba::WHITE);

    c.bench_function("engine_tick_warm", |b| {
        b.iter_batched(
            || {
                // Warm up to a steady population first
                let mut engine = FlowEngine::with_seed(SimConfig::default(), 7).unwrap();
                let mut canvas = DrawList::new();
                for (i, f) in frames.iter().take(300).enumerate() {
                    canvas.clear();
                    engine.tick(f.as_ref(), FrameTime::from_millis(i as i64 * 16), &sampler, &mut canvas);
                }
                (engine, canvas)
            },
            |(mut engine, mut canvas)| {
                for (i, f) in frames.iter().skip(300).take(10).enumerate() {
                    canvas.clear();
                    black_box(engine.tick(
                        f.as_ref(),
                        FrameTime::from_millis((300 + i) as i64 * 16),
                        &sampler,
                        &mut canvas,
                    ));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_velocity_estimate(c: &mut Criterion) {
    let mut estimator = VelocityEstimator::new(VelocityConfig::default());
    let key = TrackedPoint::hand(Handedness::Right, 8);

    c.bench_function("velocity_estimate", |b| {
        let mut t = 0i64;
        b.iter(|| {
            t += 16;
            let p = CanvasPoint::new((t % 960) as f32, 100.0);
            black_box(estimator.estimate(key, p, FrameTime::from_millis(t)))
        })
    });
}

fn bench_path_rebuild(c: &mut Criterion) {
    let frames = recorded_frames(PerformerConfig::dancing(), 2, 64);
    let mapper = CoordinateMapper::new(&DisplayConfig::default());
    let mut builder = PathBuilder::new(mapper, PathConfig::default());

    c.bench_function("path_rebuild", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % frames.len();
            black_box(builder.rebuild(frames[i].as_ref()))
        })
    });
}

criterion_group!(
    benches,
    bench_engine_tick,
    bench_velocity_estimate,
    bench_path_rebuild
);
criterion_main!(benches);
