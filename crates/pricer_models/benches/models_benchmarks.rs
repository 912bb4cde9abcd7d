//! Criterion benchmarks for closed-form model quantities.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pricer_models::analytical::black_price;
use pricer_models::instruments::OptionType;
use pricer_models::models::TwoStateMarkovChain;

fn bench_black(c: &mut Criterion) {
    c.bench_function("black_price_call", |b| {
        b.iter(|| {
            black_price(
                black_box(0.03),
                black_box(0.035),
                black_box(5.0),
                black_box(0.2),
                OptionType::Call,
            )
        })
    });
}

fn bench_state_probability(c: &mut Criterion) {
    let model = TwoStateMarkovChain::new(0.15, 0.70, 0.3, 4.0, 1.0, 1.0, 1.0).unwrap();
    c.bench_function("state_probability", |b| {
        b.iter(|| model.state_probability(black_box(2.5)))
    });
}

criterion_group!(benches, bench_black, bench_state_probability);
criterion_main!(benches);
