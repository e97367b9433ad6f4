//! A benchmark for aligning and encoding user records.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use predictor::align::{FeatureSchema, Record};
use predictor::dataset::{Table, Value};
use predictor::encoding::EncoderTable;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn survey(rows: usize) -> Table {
    let majors = ["Engineering", "Medicine", "Arts", "Law"];
    let mut rng = StdRng::seed_from_u64(7);
    let mut text = String::from("Gender,Major,StudyHours,Attendance\n");
    for _ in 0..rows {
        let gender = if rng.gen_bool(0.5) { "Male" } else { "Female" };
        let major = majors[rng.gen_range(0..majors.len())];
        let hours: u32 = rng.gen_range(0..40);
        let attendance: u32 = rng.gen_range(50..101);
        text += &format!("{},{},{},{}\n", gender, major, hours, attendance);
    }
    Table::parse(&text, ',').unwrap()
}

fn test_schema(table: &Table) {
    black_box(FeatureSchema::from_table(table).unwrap());
}

fn test_align(schema: &FeatureSchema, encoders: &EncoderTable) {
    let record = Record::new()
        .with("Major", Value::Category("Law".into()))
        .with("StudyHours", Value::Number(12.0));
    let row = schema.align(&record).unwrap();
    let encoded: Vec<f64> = row
        .iter()
        .map(|(name, val)| encoders.encode_value(name, val).unwrap())
        .collect();
    black_box(encoded);
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let table = survey(10_000);
    c.bench_function("schema of 10k rows", |b| b.iter(|| test_schema(&table)));

    let schema = FeatureSchema::from_table(&table).unwrap();
    let encoders = EncoderTable::fit(&table);
    c.bench_function("align one record", |b| {
        b.iter(|| test_align(&schema, &encoders))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
