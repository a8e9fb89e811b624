//! Transform throughput benchmarks
//!
//! Measures the XML + CSS -> XSL-FO transform with varying:
//! - Table sizes (10, 100, 1000 rows)
//! - Batch sizes for `transform_many` (1, 16, 64 documents)
//!
//! Run benchmarks: `cargo bench --bench transform_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use foprep::{InMemoryStylesheetSource, TransformJob, Transformer};
use std::hint::black_box;
use std::sync::Arc;

const STYLES: &str = r#"
@import "base.css";
table { border-collapse: collapse; width: 100% }
tr:nth-child(even) { background-color: #eeeeee }
tr.total > td { font-weight: bold }
td.num { text-align: end }
td:first-child { padding-start: 2pt }
"#;

const BASE: &str = "td { padding: 1pt; font-size: 9pt } block { space-after: 4pt }";

fn transformer() -> Transformer {
    let source = InMemoryStylesheetSource::new()
        .with_sheet("report.css", STYLES)
        .with_sheet("base.css", BASE);
    Transformer::builder()
        .with_source(Arc::new(source))
        .build()
        .expect("Failed to build transformer")
}

/// A report with a title block and a table of `rows` rows.
fn report(rows: usize) -> String {
    let mut xml = String::from("<root><block class=\"title\">Report</block><table>");
    for i in 0..rows {
        xml.push_str(&format!(
            "<tr><td>Item {}</td><td class=\"num\">{}</td></tr>",
            i,
            i * 100
        ));
    }
    xml.push_str("<tr class=\"total\"><td>Total</td><td class=\"num\">0</td></tr></table></root>");
    xml
}

fn benchmark_table_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_rows");
    let transformer = transformer();

    for rows in [10, 100, 1000] {
        let xml = report(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &xml, |b, xml| {
            b.iter(|| {
                transformer
                    .transform(black_box(xml), &["report.css"], None)
                    .expect("transform failed")
            });
        });
    }
    group.finish();
}

fn benchmark_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform_many");
    let transformer = transformer();
    let xml = report(100);

    for batch in [1, 16, 64] {
        let jobs: Vec<TransformJob> = (0..batch)
            .map(|_| TransformJob::new(xml.clone()).with_stylesheet("report.css"))
            .collect();
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("documents", batch), &jobs, |b, jobs| {
            b.iter(|| transformer.transform_many(black_box(jobs)));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_table_sizes, benchmark_batches);
criterion_main!(benches);
