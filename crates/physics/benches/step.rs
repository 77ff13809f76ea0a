use criterion::{black_box, criterion_group, criterion_main, Criterion};
use physics::Environment;

fn bench_env_step(c: &mut Criterion) {
    let mut env = Environment::new("tests/data/fulcrum.json", 0, 1.0 / 240.0, true)
        .expect("fulcrum scene should load");
    env.reset();
    let mut t = 0.0_f32;
    c.bench_function("environment step", |b| {
        b.iter(|| {
            t += 0.01;
            let result = env.step(black_box(t.sin()));
            if result.terminated || result.truncated {
                env.reset();
            }
            black_box(result.reward)
        });
    });
}

fn bench_reset(c: &mut Criterion) {
    let mut env = Environment::new("tests/data/fulcrum.json", 0, 1.0 / 240.0, true)
        .expect("fulcrum scene should load");
    c.bench_function("environment reset", |b| b.iter(|| black_box(env.reset())));
}

criterion_group!(benches, bench_env_step, bench_reset);
criterion_main!(benches);
