use criterion::{black_box, criterion_group, criterion_main, Criterion};
use steptrace_core::{StepTiming, StepsPerMm};
use steptrace_reconstruct::{merge_events, ForwardIntegrator, InverseQuantizer, SquarePath};

fn bench_pipeline(c: &mut Criterion) {
    let path = SquarePath {
        steps_per_side: 25_000,
        step_time: 0.0001,
        lift_z: true,
    };
    let streams = path.peaks().expect("square path");
    let integrator = ForwardIntegrator::new(StepsPerMm::default()).expect("calibration");
    let quantizer =
        InverseQuantizer::new(StepsPerMm::default(), StepTiming::default()).expect("timing");
    let merged = merge_events(&streams);
    let cloud = integrator.integrate(&merged).expect("forward");

    c.bench_function("merge_100k_events", |b| {
        b.iter(|| merge_events(black_box(&streams)))
    });

    c.bench_function("forward_100k_events", |b| {
        b.iter(|| integrator.integrate(black_box(&merged)))
    });

    c.bench_function("inverse_100k_points", |b| {
        b.iter(|| quantizer.quantize(black_box(&cloud)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
