use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use xmlarena::{Document, ParseFlags, TextEscape};

const SRC: &str = include_str!("../tests/good.xml");

/// A few hundred copies of the fixture catalogue under one root
fn large_source() -> Vec<u8> {
    let body = SRC.trim_start_matches(|c| c != '\n');
    let mut src = String::from("<library>");
    for _ in 0..500 {
        src.push_str(body);
    }
    src.push_str("</library>");
    src.into_bytes()
}

fn parse(src: &[u8], flags: ParseFlags) {
    let mut buffer = src.to_vec();
    let mut document = Document::new();
    document.parse(&mut buffer, flags).unwrap();
    black_box(document.node_count());
}

fn criterion_benchmark(c: &mut Criterion) {
    let src = large_source();

    c.bench_function("parse_default", |b| {
        b.iter(|| parse(black_box(&src), ParseFlags::default()));
    });

    c.bench_function("parse_normalized", |b| {
        let flags = ParseFlags::default() | ParseFlags::NORMALIZE_SPACE;
        b.iter(|| parse(black_box(&src), flags));
    });

    let mut buffer = src.clone();
    let mut document = Document::new();
    document.parse(&mut buffer, ParseFlags::default()).unwrap();
    let mut output = Vec::with_capacity(src.len());

    c.bench_function("print_verbatim", |b| {
        b.iter(|| {
            output.clear();
            document.print(&mut output).unwrap();
            black_box(output.len());
        });
    });

    c.bench_function("print_entities", |b| {
        b.iter(|| {
            output.clear();
            document.print_with(&mut output, TextEscape::Entities).unwrap();
            black_box(output.len());
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
