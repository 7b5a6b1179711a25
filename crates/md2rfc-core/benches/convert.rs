//! Benchmarks for document conversion performance.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use md2rfc_core::Converter;

/// Generate a draft with the given structure.
fn generate_draft(sections: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(200 + sections * paragraphs_per_section * 200);
    md.push_str("%%%\n");
    md.push_str("title = \"Benchmark Draft\"\n");
    md.push_str("docName = \"draft-benchmark-00\"\n");
    md.push_str("ipr = \"trust200902\"\n");
    md.push_str("category = \"info\"\n");
    md.push_str("%%%\n\n");
    md.push_str("A> Synthetic document for throughput measurements.\n\n");
    md.push_str("{mainmatter}\n\n");

    for i in 0..sections {
        md.push_str(&format!("# Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "Paragraph {j} in section {i} cites [@!RFC2119] and marks \
                 an index entry(((entry, {i}))). It has **bold** and *italic* runs.\n\n"
            ));
        }
    }
    md
}

fn bench_convert_simple(c: &mut Criterion) {
    let converter = Converter::new();
    let source = "# Hello\n\nSimple content with *emphasis*.\n";

    c.bench_function("convert_simple_markdown", |b| {
        b.iter(|| converter.convert(source));
    });
}

fn bench_convert_varying_sizes(c: &mut Criterion) {
    let converter = Converter::new();

    let mut group = c.benchmark_group("convert_by_size");

    for (sections, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let source = generate_draft(sections, paragraphs);

        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("draft", format!("{sections}s_{paragraphs}p")),
            &source,
            |b, source| b.iter(|| converter.convert(source)),
        );
    }

    group.finish();
}

fn bench_convert_dialect_features(c: &mut Criterion) {
    let converter = Converter::new();
    let source = r#"%%%
title = "Feature Mix"
docName = "draft-features-00"
%%%

A> Every dialect construct in one document.

{mainmatter}

# Tables

| Name | Value | Notes |
|:-----|------:|-------|
| one  |     1 | first |
| two  |     2 | last  |

# Definitions

Cookie
: A pseudo-random value passed in an OPT option.

Server Secret
: Input to the server cookie computation [@?RFC1035].

{#rules}
# Rules

{type="abnf"}
```
cookie = client-cookie [server-cookie]
```

The keyword rules of [@!RFC2119] apply(((keywords))).

{backmatter}
"#;

    c.bench_function("convert_dialect_features", |b| {
        b.iter(|| converter.convert(source));
    });
}

fn bench_convert_large_document(c: &mut Criterion) {
    let converter = Converter::new();
    let source = generate_draft(100, 5); // ~100KB document

    let mut group = c.benchmark_group("large_document");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("convert", |b| {
        b.iter(|| converter.convert(&source));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_convert_simple,
    bench_convert_varying_sizes,
    bench_convert_dialect_features,
    bench_convert_large_document,
);

criterion_main!(benches);
