// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use idf_lite_model::RecordReader;
use idf_lite_parser::{bundled_schema, IdfParser, IdfWriter, RecordScanner};

/// Generate a plant with `count` district cooling loops
fn generate_idf(count: usize) -> String {
    let mut out = String::from("Version,9.6;\n\n");
    for i in 0..count {
        out.push_str(&format!(
            "Node,\n  Inlet {i},                !- Name\n\
             \x20 ;                        !- Setpoint Manager Name\n\n\
             Node,\n  Outlet {i};               !- Name\n\n\
             DistrictCooling,\n  Plant {i},                !- Name\n\
             \x20 Inlet {i},                !- Chilled Water Inlet Node Name\n\
             \x20 Outlet {i},               !- Chilled Water Outlet Node Name\n\
             \x20 Autosize;                !- Nominal Capacity {{W}}\n\n"
        ));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let schema = bundled_schema().unwrap();
    let parser = IdfParser::new(schema);
    let mut group = c.benchmark_group("parse_idf");

    for count in [10, 100, 1000] {
        let content = generate_idf(count);
        group.bench_with_input(BenchmarkId::new("scan", count), &content, |b, content| {
            b.iter(|| RecordScanner::count_records(black_box(content)))
        });
        group.bench_with_input(BenchmarkId::new("read", count), &content, |b, content| {
            b.iter(|| parser.read(black_box(content)).unwrap())
        });
    }
    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let parser = IdfParser::new(bundled_schema().unwrap());
    let collection = parser.read(&generate_idf(1000)).unwrap();
    let writer = IdfWriter::new();
    c.bench_function("write_idf_1000", |b| {
        b.iter(|| writer.write_collection(black_box(&collection)))
    });
}

criterion_group!(benches, bench_parse, bench_write);
criterion_main!(benches);
