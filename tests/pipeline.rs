//! End-to-end: exported files → loader → aggregates

use chrono::{TimeZone, Utc};
use std::path::PathBuf;

use orderpulse::services::accessors::is_cancelled;
use orderpulse::services::projection::revenue_projection;
use orderpulse::services::{Aggregator, DataLoaderService, Insights};
use orderpulse::sources::FileTransport;
use orderpulse::types::{OrderBundle, ReportClock, ServiceType};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn clock() -> ReportClock {
    ReportClock::utc(Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap())
}

async fn load() -> OrderBundle {
    let loader = DataLoaderService::new(FileTransport::new(fixtures()));
    let result = loader.load().await.unwrap();
    assert!(result.failed_services.is_empty());
    assert_eq!(result.coupons_applied, 1);
    result.bundle
}

#[tokio::test]
async fn test_bundle_partitioning() {
    let bundle = load().await;

    assert_eq!(bundle.orders.len(), 8);
    let ids = |service| -> Vec<String> {
        bundle
            .service_orders(service)
            .iter()
            .map(|o| o.document_id.clone())
            .collect()
    };
    assert_eq!(ids(ServiceType::Nannies), vec!["n-1", "n-2", "n-3"]);
    assert_eq!(ids(ServiceType::GearRefresh), vec!["g-1", "g-2", "g-3"]);
    // n-5 came from the nannies endpoint but carries home-care fields
    assert_eq!(ids(ServiceType::HomeCare), vec!["n-5", "h-1"]);
    assert!(bundle.orders.iter().all(|o| !is_cancelled(o)));
}

#[tokio::test]
async fn test_coupon_applied_to_gear_order() {
    let bundle = load().await;

    let gear = &bundle.service_orders(ServiceType::GearRefresh)[0];
    assert_eq!(gear.coupon_code.as_deref(), Some("SPRING50"));
    assert_eq!(gear.total, 200.0);
    assert_eq!(gear.original_price, 250.0);
}

#[tokio::test]
async fn test_dashboard_across_services() {
    let bundle = load().await;

    let stats = Aggregator::dashboard_stats(&bundle.orders, None, &clock());

    assert_eq!(stats.total_revenue, 1550.0);
    assert_eq!(stats.total_orders, 6);
    assert_eq!(stats.completed_orders, 3);
    assert_eq!(stats.pending_orders, 2);
    assert_eq!(stats.cancelled_orders, 0);
    assert!((stats.revenue_change - 350.0 / 1200.0 * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_weekly_sales_from_files() {
    let bundle = load().await;

    let series = Aggregator::weekly_sales(&bundle.orders, &clock());

    assert_eq!(series.len(), 7);
    assert_eq!(series[0].date, "Mar 14");
    assert_eq!(series[0].current, 200.0);
    assert_eq!(series[4].current, 400.0);
    assert_eq!(series.iter().map(|p| p.current).sum::<f64>(), 600.0);
}

#[tokio::test]
async fn test_rankings_from_files() {
    let bundle = load().await;

    let products = Aggregator::top_products(&bundle, 10);
    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Weekly Nanny",
            "Villa - 4 Rooms",
            "Car Seat Installation (AED 250)",
            "Daily Nanny",
            "Apartment - 2 Rooms",
        ]
    );

    let customers = Insights::high_value_customers(&bundle.orders, 3);
    assert_eq!(customers[0].name, "Sarah Johnson");
    assert_eq!(customers[0].total_spent, 1600.0);
    assert_eq!(customers[1].name, "Fatima Ali");

    let cities = Insights::top_cities_by_revenue(&bundle.orders, 5);
    assert_eq!(cities[0].city, "Dubai");
    assert_eq!(cities[0].order_count, 3);
    assert_eq!(cities[1].city, "Abu Dhabi");

    let markers = Insights::geographic_markers(&bundle);
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].total_revenue, 1600.0);
}

#[tokio::test]
async fn test_projection_from_files() {
    let bundle = load().await;

    let points = revenue_projection(&bundle.orders, &clock(), 3);

    assert_eq!(points.len(), 6);
    assert_eq!(points[1].actual, Some(250.0));
    assert_eq!(points[2].actual, Some(1200.0));
    // (250*2 + 1200*3) / 5 = 820, plus 1% growth for the first month
    assert!((points[3].projected - 828.2).abs() < 1e-9);
}
