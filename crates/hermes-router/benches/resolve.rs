//! Resolution benchmarks.
//!
//! Run with: `cargo bench -p hermes-router`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hermes_core::{Invocation, Reply, TypeSpec, Value};
use hermes_router::{PathGenerator, Registration, Registry, RequestTriple, Resolver};
use http::Method;

async fn noop(_inv: Invocation) -> anyhow::Result<Reply> {
    Ok(Reply::empty())
}

fn build_registry(num_resources: usize) -> Arc<Registry> {
    let registry = Arc::new(Registry::new());

    for i in 0..num_resources {
        let name = format!("resource{i}");

        registry.register(
            &name,
            Registration::builder()
                .verb(Method::GET)
                .media("text/html")
                .positional(TypeSpec::Integer)
                .handler(noop)
                .build()
                .unwrap(),
        );
        registry.register(
            &name,
            Registration::builder()
                .verb(Method::GET)
                .media("application/json")
                .positional(TypeSpec::Integer)
                .keyword_default("format", TypeSpec::Symbol, Value::symbol("short"))
                .handler(noop)
                .build()
                .unwrap(),
        );
        registry.register(
            &name,
            Registration::builder()
                .verb(Method::PUT)
                .media("application/json")
                .positional(TypeSpec::Integer)
                .handler(noop)
                .build()
                .unwrap(),
        );
    }

    registry
}

fn request(accept: &str, query: &str) -> RequestTriple {
    RequestTriple::new(Method::GET, vec!["12345".to_string()])
        .with_accept(accept)
        .with_query(query)
}

fn bench_resolve_html(c: &mut Criterion) {
    let resolver = Resolver::new(build_registry(100));
    let request = request("text/html", "");

    c.bench_function("resolve_html", |b| {
        b.iter(|| black_box(resolver.resolve("resource50", &request)));
    });
}

fn bench_resolve_json_with_keyword(c: &mut Criterion) {
    let resolver = Resolver::new(build_registry(100));
    let request = request("application/json, text/html;q=0.5", "format=long");

    c.bench_function("resolve_json_keyword", |b| {
        b.iter(|| black_box(resolver.resolve("resource50", &request)));
    });
}

fn bench_resolve_not_allowed(c: &mut Criterion) {
    let resolver = Resolver::new(build_registry(100));
    let request = RequestTriple::new(Method::DELETE, vec!["1".to_string()]);

    c.bench_function("resolve_405", |b| {
        b.iter(|| black_box(resolver.resolve("resource50", &request)));
    });
}

fn bench_generate(c: &mut Criterion) {
    let generator = PathGenerator::new(build_registry(100));
    let values = [Value::Integer(12345)];

    c.bench_function("generate", |b| {
        b.iter(|| black_box(generator.generate("resource50", &values, &[])));
    });
}

fn bench_registry_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_size");

    for size in [10, 100, 1000] {
        let resolver = Resolver::new(build_registry(size));
        let request = request("*/*", "");

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(resolver.resolve("resource5", &request)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_html,
    bench_resolve_json_with_keyword,
    bench_resolve_not_allowed,
    bench_generate,
    bench_registry_size,
);
criterion_main!(benches);
