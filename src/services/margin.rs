//! Margin model for order cost and profit
//!
//! Cost = service provider payout (revenue × margin rate)
//!      + platform fee (revenue × 5%)
//!      + fixed cost per order.

use crate::services::accessors::order_total;
use crate::types::{Order, OrderCost, ServiceType};

/// Platform fee as a fraction of revenue
pub const PLATFORM_FEE_RATE: f64 = 0.05;

/// Fixed processing cost per order, in order currency
pub const FIXED_COST_PER_ORDER: f64 = 5.0;

/// Cost breakdown for a revenue amount under a service's margin rate
pub fn cost_breakdown(revenue: f64, service: ServiceType) -> OrderCost {
    OrderCost {
        service_provider_cost: revenue * service.margin_rate(),
        platform_fee: revenue * PLATFORM_FEE_RATE,
        fixed_cost: FIXED_COST_PER_ORDER,
    }
}

pub fn order_cost(order: &Order, service: ServiceType) -> f64 {
    cost_breakdown(order_total(order), service).total()
}

pub fn order_profit(order: &Order, service: ServiceType) -> f64 {
    order_total(order) - order_cost(order, service)
}
