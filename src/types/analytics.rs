//! Derived analytics value types
//!
//! Plain values returned by the aggregation engine. None of them has an
//! identity beyond its contents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{Order, PaymentStatus, ServiceType};

/// Normalized orders, flattened and partitioned by service
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderBundle {
    pub orders: Vec<Order>,
    pub by_service: BTreeMap<ServiceType, Vec<Order>>,
}

impl OrderBundle {
    /// Build a bundle from per-service lists. Every service gets an entry,
    /// and `orders` is flattened in service declaration order.
    pub fn from_services(mut by_service: BTreeMap<ServiceType, Vec<Order>>) -> Self {
        for service in ServiceType::ALL {
            by_service.entry(service).or_default();
        }
        let orders = by_service.values().flatten().cloned().collect();
        Self { orders, by_service }
    }

    pub fn service_orders(&self, service: ServiceType) -> &[Order] {
        self.by_service
            .get(&service)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bundle restricted to a single service (other services empty)
    pub fn only(&self, service: ServiceType) -> Self {
        let mut by_service = BTreeMap::new();
        by_service.insert(service, self.service_orders(service).to_vec());
        Self::from_services(by_service)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub total_profit: f64,
    pub total_cost: f64,
    pub total_orders: u64,
    pub completed_orders: u64,
    pub pending_orders: u64,
    pub cancelled_orders: u64,
    pub revenue_change: f64,
    pub profit_change: f64,
    pub orders_change: f64,
    pub average_order_value_change: f64,
}

/// Cost components of a single order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCost {
    pub service_provider_cost: f64,
    pub platform_fee: f64,
    pub fixed_cost: f64,
}

impl OrderCost {
    pub fn total(&self) -> f64 {
        self.service_provider_cost + self.platform_fee + self.fixed_cost
    }
}

/// One day of a current-vs-previous comparison series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesChartPoint {
    pub date: String,
    pub day: NaiveDate,
    pub current: f64,
    pub previous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEarningPoint {
    pub week: String,
    pub current_month: f64,
    pub one_month_ago: f64,
    pub two_months_ago: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBreakdown {
    pub service: ServiceType,
    pub name: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceVisitors {
    pub service: ServiceType,
    pub label: String,
    pub orders: u64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub order_id: String,
    pub customer_name: String,
    pub service: ServiceType,
    pub service_name: String,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    LowStock,
    OutOfStock,
}

/// A ranked service category or inferred product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: String,
    pub name: String,
    pub service: ServiceType,
    pub orders: u64,
    pub revenue: f64,
    pub currency: String,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub city: String,
    pub country: String,
    pub order_count: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicMarker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub city: String,
    pub country: String,
    pub order_count: u64,
    pub total_revenue: f64,
    pub service_type: ServiceType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakHourData {
    pub hour: u32,
    pub order_count: u64,
    pub total_revenue: f64,
    pub display_hour: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPatternData {
    pub day: String,
    pub day_index: u32,
    pub order_count: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalData {
    pub month: String,
    pub month_index: u32,
    pub order_count: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighValueCustomer {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub total_spent: f64,
    pub order_count: u64,
    pub average_order_value: f64,
    pub last_order_date: Option<DateTime<Utc>>,
}

/// Historical points carry `actual == projected`; future points have no actual
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month: String,
    pub projected: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
}
