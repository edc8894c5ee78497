//! Criterion benchmarks for normalization and aggregation

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::hint::black_box;

use orderpulse::services::normalizer::normalize_all;
use orderpulse::services::projection::revenue_projection;
use orderpulse::services::{Aggregator, Insights};
use orderpulse::types::{OrderBundle, ReportClock, ServiceType};

const CITIES: [(&str, f64, f64); 4] = [
    ("Dubai", 25.2, 55.27),
    ("Abu Dhabi", 24.45, 54.38),
    ("Sharjah", 25.34, 55.42),
    ("Riyadh", 24.71, 46.67),
];

const STATUSES: [&str; 4] = [
    "Payment confirmed",
    "Completed",
    "Pending payment",
    "Sent to vendor",
];

/// Synthetic raw records spread over the last ~120 days
fn synthetic_records(count: usize) -> Vec<Value> {
    let start = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let (city, lat, lng) = CITIES[i % CITIES.len()];
            let created = start - Duration::hours((i % 2880) as i64);
            let mut record = json!({
                "id": i,
                "documentId": format!("doc-{}", i),
                "total": 100 + (i % 37) * 25,
                "paymentStatus": STATUSES[i % STATUSES.len()],
                "requestStatus": if i % 11 == 0 { "pending" } else { "completed" },
                "createdAt": created.to_rfc3339(),
                "customer": {
                    "fullName": format!("Customer {}", i % 97),
                    "email": format!("c{}@example.com", i % 97),
                },
                "location": {"city": city, "country": "UAE", "lat": lat, "lng": lng},
            });
            match i % 3 {
                0 => record["hours"] = json!(4),
                1 => record["carType"] = json!("sedan"),
                _ => record["property_type"] = json!("villa"),
            }
            record
        })
        .collect()
}

fn bundle_of(records: &[Value]) -> OrderBundle {
    let mut by_service: BTreeMap<ServiceType, Vec<_>> = BTreeMap::new();
    for order in normalize_all(records, None) {
        by_service.entry(order.service_type()).or_default().push(order);
    }
    OrderBundle::from_services(by_service)
}

fn bench_normalize(c: &mut Criterion) {
    let records = synthetic_records(10_000);

    let mut group = c.benchmark_group("normalizer");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("normalize_all", |b| {
        b.iter(|| normalize_all(black_box(&records), None));
    });
    group.finish();
}

fn bench_aggregates(c: &mut Criterion) {
    let clock = ReportClock::utc(Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap());

    let mut group = c.benchmark_group("aggregator");
    for size in [1_000usize, 10_000] {
        let bundle = bundle_of(&synthetic_records(size));
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("dashboard_stats", size), &bundle, |b, o| {
            b.iter(|| Aggregator::dashboard_stats(black_box(&o.orders), None, &clock));
        });
        group.bench_with_input(BenchmarkId::new("weekly_sales", size), &bundle, |b, o| {
            b.iter(|| Aggregator::weekly_sales(black_box(&o.orders), &clock));
        });
        group.bench_with_input(BenchmarkId::new("top_products", size), &bundle, |b, o| {
            b.iter(|| Aggregator::top_products(black_box(o), 10));
        });
        group.bench_with_input(BenchmarkId::new("insights", size), &bundle, |b, o| {
            b.iter(|| {
                let orders = black_box(&o.orders);
                (
                    Insights::top_cities_by_revenue(orders, 10),
                    Insights::peak_hours(orders, &clock, 5),
                    Insights::high_value_customers(orders, 10),
                )
            });
        });
        group.bench_with_input(BenchmarkId::new("projection", size), &bundle, |b, o| {
            b.iter(|| revenue_projection(black_box(&o.orders), &clock, 6));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_aggregates);
criterion_main!(benches);
