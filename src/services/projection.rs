//! Weighted-average revenue projection

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::services::accessors::{counts_toward_revenue, order_total};
use crate::types::{in_month, Order, OrderBundle, ProjectionPoint, ReportClock, ServiceType};

/// Recency weights for the three historical months, oldest first
const HISTORY_WEIGHTS: [f64; 3] = [1.0, 2.0, 3.0];

const MONTHLY_GROWTH: f64 = 0.01;
const LOWER_BOUND: f64 = 0.85;
const UPPER_BOUND: f64 = 1.15;

/// Assumed revenue per order when turning revenue into order counts
pub const AVERAGE_ORDER_VALUE: f64 = 300.0;

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

fn confirmed_revenue_in(orders: &[Order], clock: &ReportClock, year: i32, month: u32) -> f64 {
    orders
        .iter()
        .filter(|o| counts_toward_revenue(o))
        .filter(|o| {
            o.created_at
                .as_ref()
                .is_some_and(|ts| in_month(clock.local_date(ts), year, month))
        })
        .map(order_total)
        .sum()
}

/// Three completed months of history followed by `months_ahead` projected
/// months. Empty when the history has no revenue at all.
pub fn revenue_projection(
    orders: &[Order],
    clock: &ReportClock,
    months_ahead: u32,
) -> Vec<ProjectionPoint> {
    let history: Vec<(String, f64)> = (1..=HISTORY_WEIGHTS.len() as i32)
        .rev()
        .map(|back| {
            let (year, month) = clock.month_offset(-back);
            (
                month_label(year, month),
                confirmed_revenue_in(orders, clock, year, month),
            )
        })
        .collect();

    let (weighted, weights) = history
        .iter()
        .zip(HISTORY_WEIGHTS)
        .filter(|((_, revenue), _)| *revenue > 0.0)
        .fold((0.0, 0.0), |(sum, total_weight), ((_, revenue), weight)| {
            (sum + revenue * weight, total_weight + weight)
        });
    if weights == 0.0 {
        return Vec::new();
    }
    let average = weighted / weights;

    let mut points: Vec<ProjectionPoint> = history
        .into_iter()
        .map(|(month, revenue)| ProjectionPoint {
            month,
            projected: revenue,
            actual: Some(revenue),
        })
        .collect();

    for i in 1..=months_ahead {
        let (year, month) = clock.month_offset(i as i32 - 1);
        let projected = (average * (1.0 + MONTHLY_GROWTH * i as f64))
            .clamp(average * LOWER_BOUND, average * UPPER_BOUND);
        points.push(ProjectionPoint {
            month: month_label(year, month),
            projected,
            actual: None,
        });
    }

    points
}

/// Per-service revenue projection re-expressed as approximate order counts
pub fn service_growth_projection(
    bundle: &OrderBundle,
    clock: &ReportClock,
    months_ahead: u32,
) -> BTreeMap<ServiceType, Vec<ProjectionPoint>> {
    ServiceType::ALL
        .into_iter()
        .map(|service| {
            let points = revenue_projection(bundle.service_orders(service), clock, months_ahead)
                .into_iter()
                .map(|p| ProjectionPoint {
                    month: p.month,
                    projected: p.projected / AVERAGE_ORDER_VALUE,
                    actual: p.actual.map(|a| a / AVERAGE_ORDER_VALUE),
                })
                .collect();
            (service, points)
        })
        .collect()
}
