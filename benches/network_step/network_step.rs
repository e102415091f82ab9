use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use epigraph::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

static SEED: u64 = 123;
static TICKS: usize = 300;
static CONNECTION_PROBABILITY: f64 = 0.15;

fn build_network(cities: usize, rate_function: RateFunction) -> Network {
    let mut network = Network::new(true);
    for i in 0..cities {
        let city = Population::new(format!("city{i}"), 100_010)
            .with_disease("flu", CompartmentCounts::new(100_000, 10, 0, 0), 0.01)
            .expect("counts match the total")
            .with_rate_function(rate_function);
        network.add_node(city).expect("city names are unique");
    }
    network.generate_edges(CONNECTION_PROBABILITY, &mut SmallRng::seed_from_u64(SEED));
    network
}

fn run_epidemic(mut network: Network) -> Network {
    let mut flu = Disease::new("flu", 0.05, 0.01, 0.02, 0.001);
    for _ in 0..TICKS {
        network.step(&mut flu);
    }
    network
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("network step");
    for rate_function in [RateFunction::Simple, RateFunction::Ratio, RateFunction::Erf] {
        for cities in [10, 100] {
            group.bench_with_input(
                BenchmarkId::new(rate_function.to_string(), cities),
                &cities,
                |bencher, &cities| {
                    bencher.iter_batched(
                        || build_network(cities, rate_function),
                        run_epidemic,
                        criterion::BatchSize::LargeInput,
                    );
                },
            );
        }
    }
    group.finish();
}

criterion_group!(network_benches, criterion_benchmark);
criterion_main!(network_benches);
