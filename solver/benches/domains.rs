use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fdsolve::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn count_bound(xs: &[VarRef], domains: &Domains) -> usize {
    xs.iter().filter(|&&x| domains.is_bound(x)).count()
}

fn count_present(xs: &[(VarRef, IntCst)], domains: &Domains) -> usize {
    let mut count = 0;
    for &(x, v) in xs {
        if domains.contains(x, v) {
            count += 1;
        }
    }
    count
}

pub fn read_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2398248538438434234);
    let mut domains = Domains::new();
    let mut variables = Vec::new();
    let mut values = Vec::new();

    for _ in 0..100 {
        let dom_start = rng.random_range(-50..50);
        let dom_size = rng.random_range(0..30);
        let var = domains.new_var(dom_start, dom_start + dom_size);
        for _ in 0..5 {
            let _ = domains.remove(var, rng.random_range(-50..80), Cause::Decision);
            variables.push(var);
            values.push((var, rng.random_range(-50..80)));
        }
    }
    values.shuffle(&mut rng);
    variables.shuffle(&mut rng);

    c.bench_function("domains-count-bound", |b| {
        b.iter(|| count_bound(black_box(&variables), black_box(&domains)))
    });
    c.bench_function("domains-count-present", |b| {
        b.iter(|| count_present(black_box(&values), black_box(&domains)))
    });
}

fn apply_all(domains: &mut Domains, updates: &[(VarRef, IntCst, IntCst)]) {
    for &(var, lo, hi) in updates {
        let _ = domains.remove_range(var, lo, hi, Cause::Decision);
    }
}

pub fn write_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2398248538438434234);
    let mut domains = Domains::new();
    let mut variables: Vec<VarRef> = (0..1000).map(|_| domains.new_var(0, 1000)).collect();
    let mut updates = Vec::new();

    for i in 10..400 {
        variables.shuffle(&mut rng);
        for &v in &variables {
            let lo = rng.random_range(0..1000);
            let width = rng.random_range(0..(i / 10));
            if rng.random_bool(0.5) {
                updates.push((v, lo, lo + width));
            } else {
                updates.push((v, 0, i / 4));
            }
        }
    }
    updates.shuffle(&mut rng);

    // updates are spread over save points to exercise the trail
    domains.save_state();
    c.bench_function("domains-writes", |b| {
        b.iter(|| {
            let doms = &mut domains.clone();
            apply_all(black_box(doms), black_box(&updates))
        });
    });

    apply_all(&mut domains, &updates);
    let base = domains;
    c.bench_function("domains-backtrack", |b| {
        b.iter(|| black_box(&mut base.clone()).reset());
    });
}

pub fn search_benchmark(c: &mut Criterion) {
    c.bench_function("queens-8-all", |b| {
        b.iter(|| {
            let n = 8;
            let mut m = Manager::new();
            let q = m.new_vars(n, 0, n as IntCst - 1);
            let up: Vec<_> = (0..n).map(|i| m.intermediate(q[i] + i as IntCst)).collect();
            let down: Vec<_> = (0..n).map(|i| m.intermediate(q[i] - i as IntCst)).collect();
            m.add(all_different(q.clone()));
            m.add(all_different(up));
            m.add(all_different(down));
            m.add_goal(label(q, VarOrder::FirstFail, ValueOrder::Min));
            let mut count = 0;
            while m.next_solution() {
                count += 1;
            }
            count
        })
    });
}

criterion_group!(benches, read_benchmark, write_benchmark, search_benchmark);

criterion_main!(benches);
