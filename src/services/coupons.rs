//! Coupon redemption merge

use serde_json::{Map, Value};
use tracing::debug;

use crate::services::normalizer::{number_field, relation, string_field};
use crate::types::Order;

/// A redemption record reduced to what the merge needs
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRedemption {
    pub coupon_code: String,
    pub order_document_id: Option<String>,
    pub order_id: Option<String>,
    pub discount_amount: f64,
    pub final_amount: Option<f64>,
}

impl CouponRedemption {
    /// Parse a raw redemption (v4 envelope or flat). Records without a
    /// coupon code or any order reference yield `None`.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let record = raw.as_object()?;
        let data = match record.get("attributes") {
            Some(Value::Object(attrs)) if !attrs.is_empty() => attrs,
            _ => record,
        };

        let coupon_code = string_field(data, &["couponCode", "coupon_code", "code"])?;
        let (order_document_id, order_id) = order_reference(data);
        if order_document_id.is_none() && order_id.is_none() {
            debug!(coupon = %coupon_code, "redemption without order reference");
            return None;
        }

        Some(Self {
            coupon_code,
            order_document_id,
            order_id,
            discount_amount: number_field(data, &["discountAmount", "discount_amount"])
                .filter(|n| *n > 0.0)
                .unwrap_or(0.0),
            final_amount: number_field(data, &["finalAmount", "final_amount"])
                .filter(|n| *n >= 0.0),
        })
    }

    fn matches(&self, order: &Order) -> bool {
        self.order_document_id.as_deref() == Some(order.document_id.as_str())
            || self.order_id.as_deref() == Some(order.order_id.as_str())
    }

    fn apply(&self, order: &mut Order) {
        let charged = self
            .final_amount
            .unwrap_or_else(|| (order.original_price - self.discount_amount).max(0.0));
        order.coupon_code = Some(self.coupon_code.clone());
        order.discounted_price = Some(charged);
        order.total = charged;
    }
}

/// (documentId, orderId) from an `order` relation, a bare `order` string, or
/// flat reference fields on the redemption itself
fn order_reference(data: &Map<String, Value>) -> (Option<String>, Option<String>) {
    if let Some(Value::String(doc)) = data.get("order") {
        return (Some(doc.clone()), None);
    }
    let flat = (
        string_field(data, &["orderDocumentId", "order_document_id"]),
        string_field(data, &["orderId", "order_id"]),
    );
    match relation(data.get("order")) {
        Some(rel) => (
            string_field(&rel, &["documentId", "document_id"]).or(flat.0),
            string_field(&rel, &["orderId", "order_id"]).or(flat.1),
        ),
        None => flat,
    }
}

/// Merge redemptions into orders. Each redemption applies to the first
/// matching order that does not already carry a coupon. Returns the number
/// of orders updated.
pub fn apply_redemptions(orders: &mut [Order], redemptions: &[Value]) -> usize {
    let mut applied = 0;
    for redemption in redemptions.iter().filter_map(CouponRedemption::from_value) {
        if let Some(order) = orders
            .iter_mut()
            .find(|o| o.coupon_code.is_none() && redemption.matches(o))
        {
            redemption.apply(order);
            applied += 1;
        }
    }
    applied
}
