use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use policy_gate::condition::ConditionSpec;
use policy_gate::manager::{MemoryPolicyManager, PolicyManager};
use policy_gate::pattern::{match_wildcard, Matcher, RegexMatcher, SimpleMatcher};
use policy_gate::policy::PolicyOptions;
use policy_gate::role::Role;
use policy_gate::{Enforcer, Request, Subject};
use std::sync::Arc;

fn populated_manager(count: usize) -> Arc<MemoryPolicyManager> {
    let manager = Arc::new(MemoryPolicyManager::new());
    for i in 0..count {
        let policy = PolicyOptions::new()
            .with_name(format!("policy_{:04}", i))
            .with_role(Role::new(format!("team{}", i)).into_ref())
            .set_resources([format!("team{}.<[a-z]+>", i)])
            .set_actions(["read", "write"])
            .with_condition(ConditionSpec::new("mfa", "bool").with_option("value", true))
            .allow()
            .build()
            .unwrap();
        manager.create(policy).unwrap();
    }
    manager
}

fn bench_wildcard(c: &mut Criterion) {
    let mut group = c.benchmark_group("wildcard");

    group.bench_function("exact", |b| {
        b.iter(|| match_wildcard(black_box("documents.read"), black_box("documents.read")))
    });

    group.bench_function("trailing_star", |b| {
        b.iter(|| match_wildcard(black_box("documents.*"), black_box("documents.read")))
    });

    group.bench_function("many_stars", |b| {
        b.iter(|| match_wildcard(black_box("*a*b*c*d*"), black_box("xxaxxbxxcxxdxx")))
    });

    group.finish();
}

fn bench_matchers(c: &mut Criterion) {
    let definitions = vec!["files.<[a-z]+>.read".to_string(), "reports.*".to_string()];
    let simple = SimpleMatcher::new();
    let regex = RegexMatcher::new();

    // Warm up cache
    regex.match_policy(Some(&definitions), "files.a.read").unwrap();

    let mut group = c.benchmark_group("match_policy");
    group.bench_function("simple", |b| {
        b.iter(|| simple.match_policy(Some(&definitions), black_box("reports.q1")).unwrap())
    });
    group.bench_function("regex_cached", |b| {
        b.iter(|| regex.match_policy(Some(&definitions), black_box("files.summary.read")).unwrap())
    });
    group.finish();
}

fn bench_enforce(c: &mut Criterion) {
    let mut group = c.benchmark_group("enforce");

    for count in [10usize, 100, 1000] {
        let enforcer = Enforcer::new(populated_manager(count), Arc::new(RegexMatcher::new()));
        let subject = Subject::new("alice").with_role(Role::new(format!("team{}", count / 2)).into_ref());
        let request = Request::new(format!("team{}.wiki", count / 2), "read", subject)
            .with_metadata("mfa", true);

        group.bench_with_input(BenchmarkId::from_parameter(count), &request, |b, request| {
            b.iter(|| enforcer.enforce(black_box(request)).unwrap())
        });
    }

    group.finish();
}

fn bench_effective_roles(c: &mut Criterion) {
    let root = Role::new("level_0").into_ref();
    let mut current = root.clone();
    for level in 1..100 {
        let next = Role::new(format!("level_{}", level)).into_ref();
        current.add_role(next.clone()).unwrap();
        current = next;
    }
    // Close the loop
    current.add_role(root.clone()).unwrap();

    c.bench_function("effective_roles_cycle_100", |b| {
        b.iter(|| black_box(root.effective_role_ids()))
    });
}

criterion_group!(
    benches,
    bench_wildcard,
    bench_matchers,
    bench_enforce,
    bench_effective_roles
);
criterion_main!(benches);
