use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depsolve_semver::{Requirement, Version};

fn bench_version_parse(c: &mut Criterion) {
    c.bench_function("version_parse_strict", |b| {
        b.iter(|| Version::parse(black_box("1.7.3-rc.1+build.42")))
    });
}

fn bench_requirement_parse(c: &mut Criterion) {
    c.bench_function("requirement_parse_range", |b| {
        b.iter(|| Requirement::parse(black_box("numpy >= 1.3.0, numpy <= 2.0.0")))
    });
}

criterion_group!(benches, bench_version_parse, bench_requirement_parse);
criterion_main!(benches);
