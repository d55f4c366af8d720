//! Performance benchmarks for the Evaluation Engine.
//!
//! Covers the pure derivation pipeline (work rate, payout) and the
//! `/work-rate` endpoint end to end.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{Datelike, NaiveDate, NaiveTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use evaluation_engine::api::{AppState, create_router};
use evaluation_engine::calculation::{EvaluationBook, calculate_payout, calculate_work_rate};
use evaluation_engine::config::ConfigLoader;
use evaluation_engine::models::{
    DailyAttendanceRecord, Grade, Period, ShortenedWorkHourRecord, ShortenedWorkType,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/default").expect("Failed to load config")
}

/// Creates one absence per weekday of January 2024, cycling through
/// the configured attendance types.
fn create_daily_records(count: usize) -> Vec<DailyAttendanceRecord> {
    let types = ["결근", "병가", "오전반차", "오후반차", "반반차"];
    let weekdays: Vec<NaiveDate> = Period::new(2024, 1)
        .unwrap()
        .days()
        .filter(|d| d.weekday().number_from_monday() <= 5)
        .collect();
    weekdays
        .into_iter()
        .cycle()
        .take(count)
        .enumerate()
        .map(|(i, date)| DailyAttendanceRecord {
            unique_id: format!("d-{}", i),
            date,
            attendance_type: types[i % types.len()].to_string(),
        })
        .collect()
}

fn create_shortened_record() -> ShortenedWorkHourRecord {
    ShortenedWorkHourRecord {
        unique_id: "s-1".to_string(),
        start_date: NaiveDate::from_ymd_opt(2023, 12, 18).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        work_type: ShortenedWorkType::Care,
    }
}

/// Benchmark: work rate for one month with a growing number of records.
fn bench_work_rate(c: &mut Criterion) {
    let loader = load_config();
    let config = loader.config();
    let period = Period::new(2024, 1).unwrap();
    let shortened = vec![create_shortened_record()];

    let mut group = c.benchmark_group("work_rate");
    for count in [0usize, 5, 22] {
        let daily = create_daily_records(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &daily, |b, daily| {
            b.iter(|| {
                black_box(calculate_work_rate(
                    "emp_bench",
                    period,
                    daily,
                    &shortened,
                    config.attendance_types(),
                    config.holiday_calendar(),
                ))
            })
        });
    }
    group.finish();
}

/// Benchmark: single payout calculation.
fn bench_payout(c: &mut Criterion) {
    let loader = load_config();
    let scale = loader.grading_scale();
    let grade = Grade::new("A+");
    let base = Decimal::from(3_250_000);
    let rate = Decimal::new(8_636, 4);

    c.bench_function("payout", |b| {
        b.iter(|| black_box(calculate_payout(Some(&grade), base, rate, scale, 1)))
    });
}

/// Benchmark: grading a 1000-member evaluation book and checking group budgets.
fn bench_evaluation_book(c: &mut Criterion) {
    let loader = load_config();
    let scale = loader.grading_scale();
    let grades = ["S", "A+", "A", "B+", "B", "B-", "C", "C-", "D"];

    let mut group = c.benchmark_group("evaluation_book");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("grade_1000", |b| {
        b.iter(|| {
            let mut book = EvaluationBook::new(Period::new(2024, 1).unwrap());
            for i in 0..1000 {
                let employee_id = format!("emp_{:04}", i);
                book.enroll(
                    &employee_id,
                    &format!("team_{}", i % 20),
                    Decimal::from(2_000_000),
                    Decimal::ONE,
                )
                .unwrap();
                book.assign_grade(&employee_id, Some(grades[i % grades.len()]), scale, 1)
                    .unwrap();
            }
            black_box(book.group_score_overages())
        })
    });
    group.finish();
}

/// Benchmark: `/work-rate` through the router.
fn bench_work_rate_endpoint(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));
    let body = serde_json::json!({
        "employee_id": "emp_bench",
        "year": 2024,
        "month": 1,
        "daily_records": create_daily_records(5),
        "shortened_records": [create_shortened_record()]
    })
    .to_string();

    c.bench_function("work_rate_endpoint", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/work-rate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_work_rate,
    bench_payout,
    bench_evaluation_book,
    bench_work_rate_endpoint
);
criterion_main!(benches);
