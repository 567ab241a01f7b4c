//! Benchmarks for domain decomposition and record normalization.

use certscan_core::record::{Field, FIELD_COUNT};
use certscan_core::{NormalizedCert, RawRecord, SuffixSet};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const SUFFIXES: &[&str] = &[
    "com", "net", "org", "uk", "co.uk", "ac.uk", "jp", "co.jp", "de", "au", "com.au", "br",
    "com.br", "kawasaki.jp", "edu",
];

const DOMAINS: &[&str] = &[
    "example.com",
    "www.example.co.uk",
    "a.b.c.d.example.com.au",
    "mail.google.com",
    "WWW.EXAMPLE.ORG.",
    "intranet.local",
    "co.uk",
    "deep.sub.domain.city.kawasaki.jp",
];

fn suffix_set() -> SuffixSet {
    SuffixSet::from_suffixes(SUFFIXES.iter().copied()).expect("suffix set")
}

fn bench_decompose(c: &mut Criterion) {
    let set = suffix_set();
    let mut group = c.benchmark_group("decompose");

    for domain in DOMAINS {
        group.bench_with_input(BenchmarkId::from_parameter(domain), domain, |b, d| {
            b.iter(|| set.decompose(black_box(d)))
        });
    }
    group.finish();
}

fn record(san_count: usize) -> RawRecord {
    let mut fields = vec![String::new(); FIELD_COUNT];
    fields[Field::CertificateId.index()] = "1".into();
    fields[Field::Subject.index()] = "CN=www.example.com, O=Example, Inc, L=Springfield, C=US".into();
    fields[Field::Issuer.index()] = "CN=Example CA, O=Example Trust".into();
    fields[Field::NotValidBefore.index()] = "2014-01-01 00:00:00".into();
    fields[Field::NotValidAfter.index()] = "2016-01-01 00:00:00".into();
    fields[Field::CertificatePolicies.index()] = "Policy: 2.23.140.1.2.2\n  CPS: https://example.com/cps".into();
    fields[Field::SubjectAltName.index()] = (0..san_count)
        .map(|i| format!("DNS:host{i}.example{}.com", i % 7))
        .collect::<Vec<_>>()
        .join(", ");
    RawRecord::new(fields)
}

fn bench_normalize(c: &mut Criterion) {
    let set = suffix_set();
    let mut group = c.benchmark_group("normalize");

    for san_count in [1, 10, 100] {
        let raw = record(san_count);
        group.throughput(Throughput::Elements(san_count as u64));
        group.bench_with_input(BenchmarkId::new("san_entries", san_count), &raw, |b, raw| {
            b.iter(|| NormalizedCert::from_record(black_box(raw), &set))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decompose, bench_normalize);
criterion_main!(benches);
