//! Integration tests for writing fixture files to disk.
//!
//! These tests exercise the atomic writer and the end-to-end pipeline
//! against real directories under `target/`.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]


use camino::Utf8Path;
use chrono::TimeDelta;
use order_fixtures::{
    ORDER_WINDOW_DAYS, Order, OrderFixturesSettings, OrderGenerator, PipelineError, RecordWriter,
    Subtotal, WriteError, run_pipeline,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rstest::{fixture, rstest};
use serde::Serialize;
use test_support::{entry_names, fixture_clock, fixture_now, read_output, unique_temp_dir};

#[derive(Serialize)]
struct Row {
    id: u32,
    name: &'static str,
}

#[fixture]
fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(1_500)
}

#[test]
fn writes_uniform_records_with_header() {
    let dir = unique_temp_dir("rows").expect("temp dir");
    let writer = RecordWriter::open_ambient(&dir).expect("open dir");
    let rows = [
        Row { id: 1, name: "a" },
        Row { id: 2, name: "b" },
        Row { id: 3, name: "c" },
    ];

    let summary = writer
        .write(Utf8Path::new("rows.csv"), &rows)
        .expect("write rows");

    let contents = read_output(&dir, "rows.csv").expect("read rows");
    assert_eq!(
        contents,
        "\"id\", \"name\",\n1, \"a\",\n2, \"b\",\n3, \"c\",\n"
    );
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.bytes, contents.len());
}

#[test]
fn empty_records_leave_no_file_behind() {
    let dir = unique_temp_dir("empty").expect("temp dir");
    let writer = RecordWriter::open_ambient(&dir).expect("open dir");
    let rows: [Row; 0] = [];

    let err = writer
        .write(Utf8Path::new("rows.csv"), &rows)
        .expect_err("empty write must fail");

    assert!(matches!(err, WriteError::EmptyRecords));
    assert!(entry_names(&dir).expect("list dir").is_empty());
}

#[test]
fn overwrites_existing_file_and_cleans_temp_files() {
    let dir = unique_temp_dir("overwrite").expect("temp dir");
    let writer = RecordWriter::open_ambient(&dir).expect("open dir");

    writer
        .write(Utf8Path::new("rows.csv"), &[Row { id: 1, name: "old" }])
        .expect("first write");
    writer
        .write(Utf8Path::new("rows.csv"), &[Row { id: 2, name: "new" }])
        .expect("second write");

    let contents = read_output(&dir, "rows.csv").expect("read rows");
    assert_eq!(contents, "\"id\", \"name\",\n2, \"new\",\n");
    assert_eq!(entry_names(&dir).expect("list dir"), vec!["rows.csv"]);
}

#[test]
fn rejects_nested_file_names() {
    let dir = unique_temp_dir("nested").expect("temp dir");
    let writer = RecordWriter::open_ambient(&dir).expect("open dir");

    let err = writer
        .write(Utf8Path::new("sub/rows.csv"), &[Row { id: 1, name: "a" }])
        .expect_err("nested path must fail");

    assert!(matches!(err, WriteError::Io { .. }));
}

#[test]
fn missing_directory_is_reported() {
    let dir = unique_temp_dir("missing").expect("temp dir");

    let err = RecordWriter::open_ambient(&dir.join("does-not-exist")).expect_err("must fail");

    assert!(matches!(err, WriteError::Io { .. }));
}

#[rstest]
fn writes_orders_in_fixture_layout(mut rng: ChaCha8Rng) {
    let dir = unique_temp_dir("orders").expect("temp dir");
    let mut generator = OrderGenerator::new(fixture_clock());
    generator.set_user_id_list((1..=30).collect());
    generator.generate(&mut rng, 200);

    RecordWriter::open_ambient(&dir)
        .expect("open dir")
        .write(Utf8Path::new("orders.csv"), generator.orders())
        .expect("write orders");

    let contents = read_output(&dir, "orders.csv").expect("read orders");
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("\"id\", \"userId\", \"orderQty\", \"subtotal\", \"date\", \"timestamp\",")
    );
    let first_order = generator.orders().first().expect("orders generated");
    let expected_first_row = format!(
        "1, {}, {}, \"{}\", \"{}\", {},",
        first_order.user_id().expect("user assigned"),
        first_order.order_qty(),
        first_order.subtotal(),
        first_order.date().to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        first_order.timestamp()
    );
    assert_eq!(lines.next(), Some(expected_first_row.as_str()));
    assert_eq!(contents.lines().count(), 201);
    assert!(contents.ends_with(",\n"));
}

#[test]
fn unassigned_orders_write_an_empty_user_field() {
    let dir = unique_temp_dir("guest").expect("temp dir");
    let date = fixture_now() - TimeDelta::days(ORDER_WINDOW_DAYS);
    let orders = [Order::new(1, None, 3, Subtotal::from_units(75), date)];

    RecordWriter::open_ambient(&dir)
        .expect("open dir")
        .write(Utf8Path::new("orders.csv"), &orders)
        .expect("write orders");

    let contents = read_output(&dir, "orders.csv").expect("read orders");
    assert_eq!(
        contents.lines().nth(1),
        Some(
            format!(
                "1, , 3, \"225.00\", \"2024-10-19T09:30:00Z\", {},",
                date.timestamp_millis()
            )
            .as_str()
        )
    );
}

#[rstest]
fn pipeline_writes_the_configured_file(mut rng: ChaCha8Rng) {
    let dir = unique_temp_dir("pipeline").expect("temp dir");
    let settings = OrderFixturesSettings {
        user_count: 200,
        order_count: 1_000,
        output_path: Some(dir.join("orders.csv").into_string()),
        ..OrderFixturesSettings::default()
    };

    let outcome = run_pipeline(&settings, fixture_clock(), &mut rng).expect("pipeline runs");

    assert_eq!(outcome.user_count, 200);
    assert_eq!(outcome.order_count, 1_000);
    assert_eq!(outcome.unassigned_orders, 0);
    assert!(outcome.ordering_users <= 200);
    let contents = read_output(&dir, "orders.csv").expect("read orders");
    assert_eq!(contents.len(), outcome.bytes_written);
    assert_eq!(contents.lines().count(), 1_001);
}

#[rstest]
fn pipeline_without_users_writes_guest_orders(mut rng: ChaCha8Rng) {
    let dir = unique_temp_dir("no-users").expect("temp dir");
    let settings = OrderFixturesSettings {
        user_count: 0,
        order_count: 5,
        output_path: Some(dir.join("orders.csv").into_string()),
        ..OrderFixturesSettings::default()
    };

    let outcome = run_pipeline(&settings, fixture_clock(), &mut rng).expect("pipeline runs");

    assert_eq!(outcome.unassigned_orders, 5);
    assert_eq!(outcome.ordering_users, 0);
}

#[rstest]
fn pipeline_surfaces_missing_output_directory(mut rng: ChaCha8Rng) {
    let dir = unique_temp_dir("absent").expect("temp dir");
    let settings = OrderFixturesSettings {
        user_count: 5,
        order_count: 5,
        output_path: Some(dir.join("absent").join("orders.csv").into_string()),
        ..OrderFixturesSettings::default()
    };

    let result = run_pipeline(&settings, fixture_clock(), &mut rng);

    assert!(matches!(result, Err(PipelineError::Write(WriteError::Io { .. }))));
}

#[test]
fn seeded_runs_write_identical_files() {
    let dir = unique_temp_dir("seeded").expect("temp dir");
    let settings_for = |file_name: &str| OrderFixturesSettings {
        user_count: 300,
        order_count: 2_000,
        output_path: Some(dir.join(file_name).into_string()),
        seed: Some(77),
        ..OrderFixturesSettings::default()
    };

    for file_name in ["first.csv", "second.csv"] {
        let settings = settings_for(file_name);
        let seed = settings.seed.expect("seed configured");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_pipeline(&settings, fixture_clock(), &mut rng).expect("pipeline runs");
    }

    let first = read_output(&dir, "first.csv").expect("read first");
    let second = read_output(&dir, "second.csv").expect("read second");
    assert_eq!(first, second);
    assert_eq!(first.lines().count(), 2_001);
}
