use criterion::*;


criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = generator_benchmark::generator_benchmark, unique_benchmark::unique_benchmark
}

criterion_main!(benches);
