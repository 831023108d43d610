use fdsolve::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn queens(n: usize) -> (Manager, Vec<IntVar>) {
    let mut m = Manager::new();
    let q = m.new_vars(n, 0, n as IntCst - 1);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (j - i) as IntCst;
            m.add(neq(q[i], q[j]));
            m.add(neq_offset(q[i], q[j], d));
            m.add(neq_offset(q[i], q[j], -d));
        }
    }
    m.add_goal(label(q.clone(), VarOrder::Lexical, ValueOrder::Min));
    (m, q)
}

fn values(m: &Manager, vars: &[IntVar]) -> Vec<IntCst> {
    vars.iter().map(|&v| m.value(v).unwrap()).collect()
}

fn domains(m: &Manager) -> Vec<Domain> {
    m.variables().map(|v| m.domain(v).clone()).collect()
}

#[test]
fn minimization_improves_strictly() {
    let mut m = Manager::new();
    let xs = m.new_vars(3, 0, 9);
    m.add(all_different(xs.clone()));
    let cost = m.intermediate(xs[0] * 3 + xs[1] * 2 - xs[2] + 20);
    m.minimize(cost);
    m.add_goal(label(xs.clone(), VarOrder::Lexical, ValueOrder::Max));

    let mut costs = Vec::new();
    while m.next_solution() {
        let value = m.value(cost).unwrap();
        assert_eq!(m.best_objective(), Some(value));
        costs.push(value);
    }
    assert!(costs.len() > 1);
    assert!(costs.windows(2).all(|w| w[0] > w[1]), "{costs:?}");
    // x0 = 0, x1 = 1, x2 = 9
    assert_eq!(costs.last(), Some(&13));
    assert_eq!(m.best_objective(), Some(13));

    // the bound survives a restart: no solution improves on the optimum
    m.restart();
    assert!(!m.next_solution());
    assert_eq!(m.last_result(), Some(SearchResult::Exhausted));
}

#[test]
fn maximization() {
    let mut m = Manager::new();
    let x = m.new_var(0, 20);
    let y = m.new_var(0, 20);
    m.add((x + y).leq(25));
    m.add(lt(y, x));
    m.maximize(y);
    m.add_goal(label([x, y], VarOrder::Lexical, ValueOrder::Min));
    let mut last = None;
    while m.next_solution() {
        let value = m.value(y);
        assert!(value > last);
        last = value;
    }
    // y < x and x + y <= 25
    assert_eq!(last, Some(12));
    assert_eq!(m.best_objective(), Some(12));
}

#[test]
fn backtrack_budget() {
    let (mut reference, q) = queens(8);
    assert!(reference.next_solution());
    let first = values(&reference, &q);
    let needed = reference.stats().num_backtracks;
    assert!(needed >= 4, "not enough backtracks to test limits");

    let (mut m, q) = queens(8);
    m.set_backtrack_limit(needed / 2);
    assert!(!m.next_solution());
    assert_eq!(m.last_result(), Some(SearchResult::LimitReached));
    assert!(m.stats().num_backtracks <= needed / 2);

    // resume, one backtrack at a time
    loop {
        let before = m.stats().num_backtracks;
        m.set_backtrack_limit(1);
        match m.solve_next() {
            SearchResult::LimitReached => assert!(m.stats().num_backtracks <= before + 1),
            SearchResult::Solution => break,
            SearchResult::Exhausted => panic!("solution missed"),
        }
    }
    assert_eq!(values(&m, &q), first);
    assert_eq!(m.stats().num_backtracks, needed);
}

#[test]
fn budget_applies_when_resuming_after_a_solution() {
    let (mut m, q) = queens(6);
    assert!(m.next_solution());
    let first = values(&m, &q);
    let before = m.stats().num_backtracks;
    m.set_backtrack_limit(0);
    assert_eq!(m.solve_next(), SearchResult::LimitReached);
    assert_eq!(m.stats().num_backtracks, before);
    // still on the previous solution
    assert_eq!(values(&m, &q), first);

    m.clear_limits();
    assert!(m.next_solution());
    assert_ne!(values(&m, &q), first);
}

#[test]
fn interrupted_enumeration_matches() {
    let (mut reference, q) = queens(6);
    let mut expected = Vec::new();
    while reference.next_solution() {
        expected.push(values(&reference, &q));
    }

    let (mut m, q) = queens(6);
    let mut found = Vec::new();
    let mut interruptions = 0;
    loop {
        m.set_backtrack_limit(3);
        match m.solve_next() {
            SearchResult::Solution => found.push(values(&m, &q)),
            SearchResult::LimitReached => interruptions += 1,
            SearchResult::Exhausted => break,
        }
    }
    assert!(interruptions > 0);
    assert_eq!(found, expected);
}

#[test]
fn time_limit() {
    let (mut m, q) = queens(8);
    m.set_time_limit(Duration::ZERO);
    assert!(m.has_limits());
    assert_eq!(m.solve_next(), SearchResult::LimitReached);
    assert!(!m.next_solution());
    m.clear_limits();
    assert!(m.next_solution());
    assert_eq!(values(&m, &q), vec![0, 4, 7, 5, 2, 6, 1, 3]);
}

#[test]
fn exhaustion_restores_domains() {
    let (mut m, _) = queens(6);
    let before = domains(&m);
    while m.next_solution() {}
    assert_eq!(domains(&m), before);
    assert_eq!(m.depth(), 0);

    // interrupted in the middle of the search, then restarted
    m.restart();
    m.set_backtrack_limit(5);
    assert_eq!(m.solve_next(), SearchResult::LimitReached);
    assert!(m.depth() > 1);
    m.restart();
    assert_eq!(domains(&m), before);
    let vars: Vec<IntVar> = m.variables().collect();
    assert!(m.add(lt(vars[0], vars[1])));
    m.clear_limits();
    assert!(m.next_solution());
}

#[test]
fn nested_choice_points_are_undone() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut domains = Domains::new();
    let vars: Vec<VarRef> = (0..10).map(|_| domains.new_var(0, 50)).collect();
    domains.remove(vars[0], 25, Cause::Encoding).unwrap();

    let mut snapshots = Vec::new();
    for _ in 0..20 {
        let snapshot: Vec<Domain> = vars.iter().map(|&v| domains.domain(v).clone()).collect();
        snapshots.push(snapshot);
        domains.save_state();
        for _ in 0..10 {
            let var = vars[rng.random_range(0..vars.len())];
            let lo = rng.random_range(0..50);
            let hi = lo + rng.random_range(0..5);
            let _ = domains.remove_range(var, lo, hi, Cause::Decision);
            if rng.random_bool(0.1) {
                let _ = domains.set_lb(var, rng.random_range(0..50), Cause::Decision);
            }
        }
    }
    while let Some(snapshot) = snapshots.pop() {
        domains.restore_last();
        let current: Vec<Domain> = vars.iter().map(|&v| domains.domain(v).clone()).collect();
        assert_eq!(current, snapshot);
    }
    assert_eq!(domains.current_decision_level().to_int(), 0);
    assert!(!domains.contains(vars[0], 25));
}

/// Posts random constraints and checks that incremental propagation reaches the same fixpoint as
/// propagating every constraint from scratch.
#[test]
fn propagation_is_confluent() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..50 {
        let mut m = Manager::new();
        let xs: Vec<IntVar> = (0..6)
            .map(|_| {
                let lb = rng.random_range(-5..5);
                m.new_var(lb, lb + rng.random_range(1..12))
            })
            .collect();
        let pick = |rng: &mut StdRng| xs[rng.random_range(0..xs.len())];
        for _ in 0..6 {
            let (x, y) = (pick(&mut rng), pick(&mut rng));
            if x == y {
                continue;
            }
            let offset = rng.random_range(-3..3);
            let constraint = match rng.random_range(0..5) {
                0 => neq_offset(x, y, offset),
                1 => Constraint::LeqOffset(x, y, offset),
                2 => eq_offset(x, y, offset),
                3 => all_different([x, y, pick(&mut rng)]),
                _ => (x * 2 - y * 3 + pick(&mut rng)).leq(offset),
            };
            if !m.add(constraint) {
                break;
            }
            assert!(m.check_fixpoint());
        }
        for _ in 0..5 {
            if !m.is_consistent() {
                break;
            }
            let x = pick(&mut rng);
            let v = rng.random_range(-5..15);
            if m.remove(x, v) {
                assert!(m.check_fixpoint());
            }
        }
    }
}

#[test]
fn goals_survive_restart() {
    let mut m = Manager::new();
    let x = m.new_var(0, 4);
    let y = m.new_var(0, 4);
    m.add(neq(x, y));
    m.add_goal(instantiate(x, ValueOrder::Max));
    m.add_goal(instantiate(y, ValueOrder::Min));
    assert!(m.next_solution());
    assert_eq!((m.value(x), m.value(y)), (Some(4), Some(0)));
    assert!(m.next_solution());
    assert_eq!((m.value(x), m.value(y)), (Some(4), Some(1)));
    m.restart();
    assert!(m.next_solution());
    assert_eq!((m.value(x), m.value(y)), (Some(4), Some(0)));
    assert_eq!(m.stats().num_restarts, 1);
}
