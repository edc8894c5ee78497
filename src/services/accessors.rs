//! Field accessors over canonical orders
//!
//! Every aggregate reads order values through these functions so that field
//! resolution lives in exactly one place.

use crate::types::{Order, OrderDetails, PaymentStatus, RequestStatus};

const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Where an order took place
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderLocation<'a> {
    pub city: Option<&'a str>,
    pub country: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Authoritative charge amount: `total`, else `price`, else 0
pub fn order_total(order: &Order) -> f64 {
    if order.total > 0.0 {
        order.total
    } else if order.price > 0.0 {
        order.price
    } else {
        0.0
    }
}

pub fn payment_status(order: &Order) -> PaymentStatus {
    order.payment_status
}

pub fn request_status(order: &Order) -> RequestStatus {
    order.request_status
}

pub fn is_cancelled(order: &Order) -> bool {
    request_status(order) == RequestStatus::Cancelled
}

/// Confirmed payment on a live (non-cancelled) request
pub fn counts_toward_revenue(order: &Order) -> bool {
    payment_status(order).is_confirmed() && !is_cancelled(order)
}

/// Inline name, else the customer relation's name, else "Unknown Customer"
pub fn customer_name(order: &Order) -> String {
    let name = match &order.details {
        OrderDetails::HomeCare(d) => d.full_name.as_deref(),
        OrderDetails::Nanny(d) => d.customer.as_ref().and_then(|c| c.full_name.as_deref()),
        OrderDetails::GearRefresh(d) => d.customer.as_ref().and_then(|c| c.full_name.as_deref()),
    };
    name.unwrap_or(UNKNOWN_CUSTOMER).to_string()
}

pub fn customer_email(order: &Order) -> Option<&str> {
    match &order.details {
        OrderDetails::HomeCare(d) => d.email.as_deref(),
        OrderDetails::Nanny(d) => d.customer.as_ref().and_then(|c| c.email.as_deref()),
        OrderDetails::GearRefresh(d) => d.customer.as_ref().and_then(|c| c.email.as_deref()),
    }
}

/// Customer identity: email when known, else the order's document id
pub fn customer_key(order: &Order) -> &str {
    customer_email(order).unwrap_or(&order.document_id)
}

/// Home-care address, else the location relation
pub fn order_location(order: &Order) -> OrderLocation<'_> {
    match &order.details {
        OrderDetails::HomeCare(d) => d
            .address
            .as_ref()
            .map(|a| OrderLocation {
                city: a.city.as_deref(),
                country: a.country.as_deref(),
                lat: None,
                lng: None,
            })
            .unwrap_or_default(),
        OrderDetails::Nanny(d) => location_of(d.location.as_ref()),
        OrderDetails::GearRefresh(d) => location_of(d.location.as_ref()),
    }
}

fn location_of(location: Option<&crate::types::Location>) -> OrderLocation<'_> {
    location
        .map(|l| OrderLocation {
            city: l.city.as_deref(),
            country: l.country.as_deref(),
            lat: l.lat,
            lng: l.lng,
        })
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};

    use crate::types::{
        Customer, GearRefreshDetails, HomeCareDetails, NannyDetails, Order, OrderDetails,
        PaymentStatus, RequestStatus, ServiceType,
    };

    /// Minimal order for aggregate tests
    pub fn order(
        service: ServiceType,
        total: f64,
        payment: PaymentStatus,
        request: RequestStatus,
        created_at: Option<DateTime<Utc>>,
    ) -> Order {
        let details = match service {
            ServiceType::Nannies => OrderDetails::Nanny(NannyDetails::default()),
            ServiceType::GearRefresh => OrderDetails::GearRefresh(GearRefreshDetails::default()),
            ServiceType::HomeCare => OrderDetails::HomeCare(HomeCareDetails::default()),
        };
        Order {
            id: 1,
            document_id: "doc-1".into(),
            order_id: "ORDER-1".into(),
            price: total,
            total,
            original_price: total,
            discounted_price: None,
            coupon_code: None,
            payment_status: payment,
            request_status: request,
            payment_id: None,
            response_id: None,
            currency_code: "AED".into(),
            sms_confirmation_sent: false,
            created_at,
            updated_at: created_at,
            details,
        }
    }

    pub fn confirmed(service: ServiceType, total: f64, created_at: DateTime<Utc>) -> Order {
        order(
            service,
            total,
            PaymentStatus::PaymentConfirmed,
            RequestStatus::Completed,
            Some(created_at),
        )
    }

    pub fn with_customer(mut order: Order, name: &str, email: Option<&str>) -> Order {
        let customer = Customer {
            id: None,
            full_name: Some(name.to_string()),
            email: email.map(String::from),
            phone: None,
        };
        match &mut order.details {
            OrderDetails::Nanny(d) => d.customer = Some(customer),
            OrderDetails::GearRefresh(d) => d.customer = Some(customer),
            OrderDetails::HomeCare(d) => {
                d.full_name = customer.full_name;
                d.email = customer.email;
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::types::{Address, HomeCareDetails, Location, NannyDetails, ServiceType};

    // ========== order_total ==========

    #[test]
    fn test_order_total_prefers_total() {
        let mut o = order(
            ServiceType::Nannies,
            100.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        o.price = 140.0;
        assert_eq!(order_total(&o), 100.0);
    }

    #[test]
    fn test_order_total_falls_back_to_price() {
        let mut o = order(
            ServiceType::Nannies,
            0.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        o.price = 55.0;
        assert_eq!(order_total(&o), 55.0);
    }

    #[test]
    fn test_order_total_zero_when_both_absent() {
        let o = order(
            ServiceType::Nannies,
            0.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        assert_eq!(order_total(&o), 0.0);
    }

    // ========== revenue eligibility ==========

    #[test]
    fn test_cancelled_request_never_counts() {
        let o = order(
            ServiceType::Nannies,
            10.0,
            PaymentStatus::PaymentConfirmed,
            RequestStatus::Cancelled,
            None,
        );
        assert!(is_cancelled(&o));
        assert!(!counts_toward_revenue(&o));
    }

    #[test]
    fn test_pending_payment_does_not_count() {
        let o = order(
            ServiceType::Nannies,
            10.0,
            PaymentStatus::PendingPayment,
            RequestStatus::Pending,
            None,
        );
        assert!(!counts_toward_revenue(&o));
    }

    // ========== customer ==========

    #[test]
    fn test_customer_name_unknown() {
        let o = order(
            ServiceType::GearRefresh,
            10.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        assert_eq!(customer_name(&o), "Unknown Customer");
        assert_eq!(customer_key(&o), "doc-1");
    }

    #[test]
    fn test_customer_from_relation() {
        let o = with_customer(
            order(
                ServiceType::Nannies,
                10.0,
                PaymentStatus::Completed,
                RequestStatus::Completed,
                None,
            ),
            "Marcus Williams",
            Some("marcus@example.com"),
        );
        assert_eq!(customer_name(&o), "Marcus Williams");
        assert_eq!(customer_key(&o), "marcus@example.com");
    }

    #[test]
    fn test_customer_inline_home_care() {
        let mut o = order(
            ServiceType::HomeCare,
            10.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        o.details = OrderDetails::HomeCare(HomeCareDetails {
            full_name: Some("Isabella Anderson".into()),
            ..HomeCareDetails::default()
        });
        assert_eq!(customer_name(&o), "Isabella Anderson");
        assert_eq!(customer_email(&o), None);
    }

    // ========== location ==========

    #[test]
    fn test_location_from_home_care_address() {
        let mut o = order(
            ServiceType::HomeCare,
            10.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        o.details = OrderDetails::HomeCare(HomeCareDetails {
            address: Some(Address {
                city: Some("Dubai".into()),
                country: Some("UAE".into()),
                ..Address::default()
            }),
            ..HomeCareDetails::default()
        });
        let loc = order_location(&o);
        assert_eq!(loc.city, Some("Dubai"));
        assert_eq!(loc.lat, None);
    }

    #[test]
    fn test_location_from_relation() {
        let mut o = order(
            ServiceType::Nannies,
            10.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        o.details = OrderDetails::Nanny(NannyDetails {
            location: Some(Location {
                city: Some("Riyadh".into()),
                country: Some("KSA".into()),
                lat: Some(24.7),
                lng: Some(46.7),
                ..Location::default()
            }),
            ..NannyDetails::default()
        });
        let loc = order_location(&o);
        assert_eq!(loc.country, Some("KSA"));
        assert_eq!(loc.lng, Some(46.7));
    }

    #[test]
    fn test_location_missing() {
        let o = order(
            ServiceType::Nannies,
            10.0,
            PaymentStatus::Completed,
            RequestStatus::Completed,
            None,
        );
        assert_eq!(order_location(&o), OrderLocation::default());
    }
}
