//! Aggregator service for financial stats, time series and rankings

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;

use crate::services::accessors::{
    counts_toward_revenue, customer_name, is_cancelled, order_total, payment_status,
    request_status,
};
use crate::services::margin::{order_cost, order_profit};
use crate::types::{
    days_in_month, in_month, BookingType, DashboardStats, MonthlyEarningPoint, Order, OrderBundle,
    OrderDetails, ProductStatus, ReportClock, RequestStatus, SalesChartPoint, ServiceBreakdown,
    ServiceType, ServiceVisitors, TopProduct, Transaction,
};

const DEFAULT_CURRENCY: &str = "AED";

/// Number of "week of month" buckets in the monthly earnings comparison
const WEEKS_PER_MONTH: u32 = 4;

/// Percentage change from `previous` to `current`.
///
/// Returns 0 when `previous` is 0, and whenever the result is not finite.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    let change = (current - previous) / previous * 100.0;
    if change.is_finite() {
        change
    } else {
        0.0
    }
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Aggregator for dashboard statistics
pub struct Aggregator;

impl Aggregator {
    /// Current calendar month vs previous calendar month.
    ///
    /// `service` selects the margin model; `None` applies each order's own
    /// service margin (used for cross-service dashboards).
    pub fn dashboard_stats(
        orders: &[Order],
        service: Option<ServiceType>,
        clock: &ReportClock,
    ) -> DashboardStats {
        let (cur_year, cur_month) = clock.month_offset(0);
        let (prev_year, prev_month) = clock.month_offset(-1);

        let mut current: Vec<&Order> = Vec::new();
        let mut previous: Vec<&Order> = Vec::new();
        for order in orders.iter().filter(|o| !is_cancelled(o)) {
            let Some(ts) = &order.created_at else {
                continue;
            };
            let date = clock.local_date(ts);
            if in_month(date, cur_year, cur_month) {
                current.push(order);
            } else if in_month(date, prev_year, prev_month) {
                previous.push(order);
            }
        }

        let cur_confirmed: Vec<&Order> = current
            .iter()
            .copied()
            .filter(|o| payment_status(o).is_confirmed())
            .collect();
        let prev_confirmed: Vec<&Order> = previous
            .iter()
            .copied()
            .filter(|o| payment_status(o).is_confirmed())
            .collect();

        let margin_service = |o: &Order| service.unwrap_or_else(|| o.service_type());

        let total_revenue: f64 = cur_confirmed.iter().map(|o| order_total(o)).sum();
        let previous_revenue: f64 = prev_confirmed.iter().map(|o| order_total(o)).sum();
        let total_cost: f64 = cur_confirmed
            .iter()
            .map(|o| order_cost(o, margin_service(*o)))
            .sum();
        let total_profit: f64 = cur_confirmed
            .iter()
            .map(|o| order_profit(o, margin_service(*o)))
            .sum();
        let previous_profit: f64 = prev_confirmed
            .iter()
            .map(|o| order_profit(o, margin_service(*o)))
            .sum();

        let count_with = |status: RequestStatus| {
            current
                .iter()
                .filter(|o| request_status(o) == status)
                .count() as u64
        };

        let current_aov = average(total_revenue, cur_confirmed.len());
        let previous_aov = average(previous_revenue, prev_confirmed.len());

        DashboardStats {
            total_revenue,
            total_profit,
            total_cost,
            total_orders: current.len() as u64,
            completed_orders: count_with(RequestStatus::Completed),
            pending_orders: count_with(RequestStatus::Pending),
            cancelled_orders: 0,
            revenue_change: percentage_change(total_revenue, previous_revenue),
            profit_change: if prev_confirmed.is_empty() {
                0.0
            } else {
                percentage_change(total_profit, previous_profit)
            },
            orders_change: percentage_change(current.len() as f64, previous.len() as f64),
            average_order_value_change: percentage_change(current_aov, previous_aov),
        }
    }

    /// Last 7 days (ending today) vs the same weekdays one week earlier,
    /// labelled "Oct 13"
    pub fn weekly_sales(orders: &[Order], clock: &ReportClock) -> Vec<SalesChartPoint> {
        Self::daily_comparison(orders, clock, |day| day.format("%b %-d").to_string())
    }

    /// Same series as [`Aggregator::weekly_sales`], labelled "Mon 13th Oct"
    pub fn weekly_earnings(orders: &[Order], clock: &ReportClock) -> Vec<SalesChartPoint> {
        Self::daily_comparison(orders, clock, earning_label)
    }

    fn daily_comparison(
        orders: &[Order],
        clock: &ReportClock,
        label: impl Fn(NaiveDate) -> String,
    ) -> Vec<SalesChartPoint> {
        let revenue = Self::revenue_by_date(orders, clock);
        let start = clock.today() - Duration::days(6);

        (0..7)
            .map(|i| {
                let day = start + Duration::days(i);
                let previous_day = day - Duration::days(7);
                SalesChartPoint {
                    date: label(day),
                    day,
                    current: revenue.get(&day).copied().unwrap_or(0.0),
                    previous: revenue.get(&previous_day).copied().unwrap_or(0.0),
                }
            })
            .collect()
    }

    /// Week N of the current month against week N of the two prior months.
    /// Week N spans days (N-1)*7+1 ..= min(N*7, last day of month).
    pub fn monthly_earnings(orders: &[Order], clock: &ReportClock) -> Vec<MonthlyEarningPoint> {
        let revenue = Self::revenue_by_date(orders, clock);

        let week_revenue = |week: u32, months_ago: i32| -> f64 {
            let (year, month) = clock.month_offset(-months_ago);
            let last_day = days_in_month(year, month);
            let first = (week - 1) * 7 + 1;
            let last = (week * 7).min(last_day);
            (first..=last)
                .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
                .filter_map(|date| revenue.get(&date))
                .sum()
        };

        (1..=WEEKS_PER_MONTH)
            .map(|week| MonthlyEarningPoint {
                week: format!("Week {}", week),
                current_month: week_revenue(week, 0),
                one_month_ago: week_revenue(week, 1),
                two_months_ago: week_revenue(week, 2),
            })
            .collect()
    }

    /// Confirmed revenue keyed by local calendar date
    fn revenue_by_date(orders: &[Order], clock: &ReportClock) -> HashMap<NaiveDate, f64> {
        let mut by_date: HashMap<NaiveDate, f64> = HashMap::new();
        for order in orders.iter().filter(|o| counts_toward_revenue(o)) {
            if let Some(ts) = &order.created_at {
                *by_date.entry(clock.local_date(ts)).or_default() += order_total(order);
            }
        }
        by_date
    }

    /// Confirmed revenue per service, in declaration order
    pub fn service_breakdown(bundle: &OrderBundle) -> Vec<ServiceBreakdown> {
        ServiceType::ALL
            .into_iter()
            .map(|service| {
                let profile = service.profile();
                ServiceBreakdown {
                    service,
                    name: profile.name.to_string(),
                    value: bundle
                        .service_orders(service)
                        .iter()
                        .filter(|o| counts_toward_revenue(o))
                        .map(order_total)
                        .sum(),
                    color: profile.color.to_string(),
                }
            })
            .collect()
    }

    /// Order counts per service, in declaration order
    pub fn visitors_by_service(bundle: &OrderBundle) -> Vec<ServiceVisitors> {
        ServiceType::ALL
            .into_iter()
            .map(|service| {
                let profile = service.profile();
                ServiceVisitors {
                    service,
                    label: profile.short_name.to_string(),
                    orders: bundle.service_orders(service).len() as u64,
                    color: profile.color.to_string(),
                }
            })
            .collect()
    }

    /// Most recent non-cancelled orders across services (undated last)
    pub fn recent_transactions(bundle: &OrderBundle, limit: usize) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = ServiceType::ALL
            .into_iter()
            .flat_map(|service| {
                bundle
                    .service_orders(service)
                    .iter()
                    .filter(|o| !is_cancelled(o))
                    .map(move |order| Transaction {
                        id: order.document_id.clone(),
                        order_id: order.order_id.clone(),
                        customer_name: customer_name(order),
                        service,
                        service_name: service.profile().name.to_string(),
                        amount: order_total(order),
                        currency: order.currency_code.clone(),
                        status: payment_status(order),
                        date: order.created_at,
                    })
            })
            .collect();

        // Stable: equal dates keep service/insertion order
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        transactions.truncate(limit);
        transactions
    }

    /// Confirmed orders and revenue per service category
    pub fn top_services(bundle: &OrderBundle, limit: usize) -> Vec<TopProduct> {
        let mut ranked: Vec<TopProduct> = ServiceType::ALL
            .into_iter()
            .map(|service| {
                let confirmed: Vec<&Order> = bundle
                    .service_orders(service)
                    .iter()
                    .filter(|o| counts_toward_revenue(o))
                    .collect();
                TopProduct {
                    id: service.id().to_string(),
                    name: service.profile().name.to_string(),
                    service,
                    orders: confirmed.len() as u64,
                    revenue: confirmed.iter().map(|o| order_total(o)).sum(),
                    currency: confirmed
                        .first()
                        .map(|o| o.currency_code.clone())
                        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                    status: ProductStatus::Available,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        ranked.truncate(limit);
        ranked
    }

    /// Confirmed orders grouped by (service, inferred product name)
    pub fn top_products(bundle: &OrderBundle, limit: usize) -> Vec<TopProduct> {
        let mut products: Vec<TopProduct> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for service in ServiceType::ALL {
            for order in bundle
                .service_orders(service)
                .iter()
                .filter(|o| counts_toward_revenue(o))
            {
                let name = infer_product_name(order);
                let key = format!("{}:{}", service, name);
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    products.push(TopProduct {
                        id: key,
                        name,
                        service,
                        orders: 0,
                        revenue: 0.0,
                        currency: order.currency_code.clone(),
                        status: ProductStatus::Available,
                    });
                    products.len() - 1
                });
                let product = &mut products[slot];
                product.orders += 1;
                product.revenue += order_total(order);
            }
        }

        products.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        products.truncate(limit);
        products
    }
}

/// Human-readable product name derived from service-specific fields
pub fn infer_product_name(order: &Order) -> String {
    match &order.details {
        OrderDetails::Nanny(d) => match &d.booking_type {
            Some(BookingType::Week) => "Weekly Nanny".to_string(),
            Some(BookingType::Month) => "Monthly Nanny".to_string(),
            Some(BookingType::Day) | None => "Daily Nanny".to_string(),
            Some(BookingType::Other(_)) => "Nanny Service".to_string(),
        },
        OrderDetails::GearRefresh(_) => {
            let price = if order.price > 0.0 {
                order.price
            } else {
                order_total(order)
            };
            format!("Car Seat Installation ({} {})", order.currency_code, price)
        }
        OrderDetails::HomeCare(d) => {
            let property = d.property_type.as_deref().unwrap_or("Property");
            let rooms = d.no_of_rooms.unwrap_or(0);
            format!(
                "{} - {} Room{}",
                capitalize(property),
                rooms,
                if rooms == 1 { "" } else { "s" }
            )
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "Mon 18th Jan"
fn earning_label(day: NaiveDate) -> String {
    let d = day.day();
    let suffix = match d {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    };
    format!("{} {}{} {}", day.format("%a"), d, suffix, day.format("%b"))
}
