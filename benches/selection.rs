//! Selection benchmarks
//!
//! Measures the cost of building a document against the cost of querying it:
//! - Parsing a generated listing in HTML and XML mode (10, 100, 1000 rows)
//! - Building many selectors from one cached source versus an uncached one
//! - Chained queries and regex extraction over an already parsed document
//!
//! Run benchmarks: `cargo bench --bench selection`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use xsel::{ParseMode, Response, Selector, Source};

/// A well-formed listing with `rows` product rows, parseable as both HTML and XML.
fn generate_listing(rows: usize) -> String {
    let mut page = String::from("<html><head><title>Listing</title></head><body><table>");
    for i in 0..rows {
        page.push_str(&format!(
            r#"<tr class="row" data-id="{i}"><td><a href="/item/{i}">Item {i}</a></td><td class="price">{}.{:02}</td></tr>"#,
            i * 3,
            i % 100
        ));
    }
    page.push_str("</table></body></html>");
    page
}

/// A source with no document cache, so every selector re-parses.
struct Uncached(Vec<u8>);

impl Source for Uncached {
    fn body(&self) -> &[u8] {
        &self.0
    }
}

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for rows in [10, 100, 1000] {
        let page = generate_listing(rows);
        group.throughput(Throughput::Bytes(page.len() as u64));

        for mode in [ParseMode::Html, ParseMode::Xml] {
            group.bench_with_input(BenchmarkId::new(mode.to_string(), rows), &page, |b, page| {
                b.iter(|| Selector::from_text(black_box(page), mode).expect("listing parses"))
            });
        }
    }

    group.finish();
}

/// Many root selectors from one source: the cache should make this nearly free.
fn benchmark_document_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_cache");
    let page = generate_listing(200);
    let selectors = 50;
    group.throughput(Throughput::Elements(selectors as u64));

    group.bench_function("cached", |b| {
        b.iter(|| {
            let response = Response::from_text(&page);
            for _ in 0..selectors {
                black_box(Selector::from_source(&response, ParseMode::Html).expect("listing parses"));
            }
        })
    });

    group.bench_function("uncached", |b| {
        let source = Uncached(page.clone().into_bytes());
        b.iter(|| {
            for _ in 0..selectors {
                black_box(Selector::from_source(&source, ParseMode::Html).expect("listing parses"));
            }
        })
    });

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let root = Selector::html(&generate_listing(1000));

    group.bench_function("descendant_predicate", |b| {
        b.iter(|| root.query(black_box("//tr[@class='row'][position() mod 2 = 0]")).expect("valid query"))
    });

    let rows = root.query("//tr").expect("valid query");
    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("chained_relative", |b| {
        b.iter(|| rows.query(black_box("td/a/@href")).expect("valid query").extract())
    });

    let prices = rows.query("td[@class='price']/text()").expect("valid query");
    group.bench_function("regex_extract", |b| {
        b.iter(|| prices.re(black_box(r"(\d+)\.(?P<extract>\d+)")).expect("valid pattern"))
    });

    group.bench_function("count", |b| {
        b.iter(|| root.query(black_box("count(//a[starts-with(@href, '/item/1')])")).expect("valid query"))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_document_cache,
    benchmark_queries
);
criterion_main!(benches);
