use criterion::{criterion_group, criterion_main, Criterion};
use doe_campaign::{Campaign, RandomProposer};
use doe_space::{Objective, Parameter, ParameterDomain, SearchSpace, Target, TargetMode};

fn make_campaign() -> Campaign {
    let parameters = (0..8)
        .map(|idx| {
            Parameter::new(
                format!("p{idx}"),
                ParameterDomain::Discrete {
                    levels: (0..16).map(|level| level as f64).collect(),
                    tolerance: 0.25,
                },
            )
            .expect("parameter")
        })
        .collect();
    let space = SearchSpace::new(parameters).expect("space");
    let objective =
        Objective::new(vec![Target::new("kpi", TargetMode::Max, None).expect("target")])
            .expect("objective");
    Campaign::new(space, objective).with_proposer(RandomProposer::new(4242))
}

fn bench_recommend(c: &mut Criterion) {
    let mut cached = make_campaign();
    let _ = cached.recommend(32).expect("warmup");
    c.bench_function("recommend_cache_hit", |b| {
        b.iter(|| {
            let _ = cached.recommend(32).expect("recommend");
        });
    });

    let mut fresh = make_campaign();
    let mut flip = false;
    c.bench_function("recommend_fresh_proposal", |b| {
        b.iter(|| {
            // Alternating batch sizes defeats the single-slot cache, so each
            // call exercises the full proposal path.
            flip = !flip;
            let quantity = if flip { 32 } else { 33 };
            let _ = fresh.recommend(quantity).expect("recommend");
        });
    });
}

criterion_group!(benches, bench_recommend);
criterion_main!(benches);
