//! Canonical order types

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::ServiceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Pending payment")]
    PendingPayment,
    #[serde(rename = "Payment failed")]
    PaymentFailed,
    #[serde(rename = "Payment confirmed")]
    PaymentConfirmed,
    #[serde(rename = "Rescheduled")]
    Rescheduled,
    #[serde(rename = "Sent to vendor")]
    SentToVendor,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "QC/Feedback")]
    QcFeedback,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Refunded")]
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 9] = [
        PaymentStatus::PendingPayment,
        PaymentStatus::PaymentFailed,
        PaymentStatus::PaymentConfirmed,
        PaymentStatus::Rescheduled,
        PaymentStatus::SentToVendor,
        PaymentStatus::Cancelled,
        PaymentStatus::QcFeedback,
        PaymentStatus::Completed,
        PaymentStatus::Refunded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::PendingPayment => "Pending payment",
            PaymentStatus::PaymentFailed => "Payment failed",
            PaymentStatus::PaymentConfirmed => "Payment confirmed",
            PaymentStatus::Rescheduled => "Rescheduled",
            PaymentStatus::SentToVendor => "Sent to vendor",
            PaymentStatus::Cancelled => "Cancelled",
            PaymentStatus::QcFeedback => "QC/Feedback",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    /// Case-insensitive match against the upstream labels
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value))
    }

    /// Statuses that count toward revenue and profit
    pub fn is_confirmed(self) -> bool {
        matches!(
            self,
            PaymentStatus::PaymentConfirmed
                | PaymentStatus::Completed
                | PaymentStatus::SentToVendor
                | PaymentStatus::QcFeedback
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Cancelled,
    Completed,
    Scheduled,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Cancelled => "cancelled",
            RequestStatus::Completed => "completed",
            RequestStatus::Scheduled => "scheduled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "cancelled" | "canceled" => Some(RequestStatus::Cancelled),
            "completed" => Some(RequestStatus::Completed),
            "scheduled" => Some(RequestStatus::Scheduled),
            _ => None,
        }
    }
}

/// Nanny booking granularity. Unrecognized upstream values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BookingType {
    Day,
    Week,
    Month,
    Other(String),
}

impl BookingType {
    /// Known granularities only
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Some(BookingType::Day),
            "week" => Some(BookingType::Week),
            "month" => Some(BookingType::Month),
            _ => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            BookingType::Day => "day",
            BookingType::Week => "week",
            BookingType::Month => "month",
            BookingType::Other(raw) => raw,
        }
    }
}

impl From<String> for BookingType {
    fn from(value: String) -> Self {
        BookingType::parse(&value).unwrap_or(BookingType::Other(value))
    }
}

impl From<BookingType> for String {
    fn from(value: BookingType) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Home-care address component
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePackage {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NannyDetails {
    pub customer: Option<Customer>,
    pub location: Option<Location>,
    pub hours: Option<f64>,
    pub booking_type: Option<BookingType>,
    pub no_of_days: Option<u32>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub no_of_children: Option<u32>,
    pub locales: Option<String>,
    pub special_instructions: Option<String>,
    pub package: Option<ServicePackage>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GearRefreshDetails {
    pub customer: Option<Customer>,
    pub location: Option<Location>,
    pub car_type: Option<String>,
    pub installation_type: Option<String>,
    pub locales: Option<String>,
    pub package: Option<ServicePackage>,
}

/// Home-care orders carry the customer inline rather than as a relation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeCareDetails {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub special_instructions: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration: Option<f64>,
    pub property_type: Option<String>,
    pub supplies_needed: Option<bool>,
    pub service_package: Option<ServicePackage>,
    pub no_of_rooms: Option<u32>,
    pub language_code: Option<String>,
    pub country_code: Option<String>,
}

/// Service-specific part of an order, tagged once at normalization time
#[derive(Debug, Clone, PartialEq)]
pub enum OrderDetails {
    Nanny(NannyDetails),
    GearRefresh(GearRefreshDetails),
    HomeCare(HomeCareDetails),
}

impl OrderDetails {
    pub fn service_type(&self) -> ServiceType {
        match self {
            OrderDetails::Nanny(_) => ServiceType::Nannies,
            OrderDetails::GearRefresh(_) => ServiceType::GearRefresh,
            OrderDetails::HomeCare(_) => ServiceType::HomeCare,
        }
    }
}

/// Canonical order, regardless of upstream shape
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub document_id: String,
    pub order_id: String,
    pub price: f64,
    pub total: f64,
    pub original_price: f64,
    pub discounted_price: Option<f64>,
    pub coupon_code: Option<String>,
    pub payment_status: PaymentStatus,
    pub request_status: RequestStatus,
    pub payment_id: Option<String>,
    pub response_id: Option<String>,
    pub currency_code: String,
    pub sms_confirmation_sent: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub details: OrderDetails,
}

impl Order {
    pub fn service_type(&self) -> ServiceType {
        self.details.service_type()
    }

    /// Render the order back into the flat upstream shape.
    ///
    /// Common fields use camelCase; home-care orders additionally carry the
    /// snake_case status aliases and their snake_case detail fields. Every
    /// order carries a `serviceType` marker. Feeding the result back through
    /// the normalizer yields the same order.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), json!(self.id));
        map.insert("documentId".into(), json!(self.document_id));
        map.insert("orderId".into(), json!(self.order_id));
        map.insert("price".into(), json!(self.price));
        map.insert("total".into(), json!(self.total));
        map.insert("originalPrice".into(), json!(self.original_price));
        insert_opt(&mut map, "discountedPrice", self.discounted_price);
        insert_opt(&mut map, "couponCode", self.coupon_code.as_ref());
        map.insert("paymentStatus".into(), json!(self.payment_status));
        map.insert("requestStatus".into(), json!(self.request_status));
        insert_opt(&mut map, "paymentId", self.payment_id.as_ref());
        insert_opt(&mut map, "responseId", self.response_id.as_ref());
        map.insert("currencyCode".into(), json!(self.currency_code));
        map.insert(
            "smsConfirmationSent".into(),
            json!(self.sms_confirmation_sent),
        );
        insert_opt(&mut map, "createdAt", self.created_at.map(format_timestamp));
        insert_opt(&mut map, "updatedAt", self.updated_at.map(format_timestamp));

        match &self.details {
            OrderDetails::Nanny(d) => {
                insert_opt(&mut map, "customer", d.customer.as_ref());
                insert_opt(&mut map, "location", d.location.as_ref());
                insert_opt(&mut map, "hours", d.hours);
                insert_opt(&mut map, "type", d.booking_type.as_ref());
                insert_opt(&mut map, "noOfDays", d.no_of_days);
                insert_opt(&mut map, "date", d.date.as_ref());
                insert_opt(&mut map, "time", d.time.as_ref());
                insert_opt(&mut map, "noOfChildren", d.no_of_children);
                insert_opt(&mut map, "locales", d.locales.as_ref());
                insert_opt(&mut map, "specialInstructions", d.special_instructions.as_ref());
                insert_opt(&mut map, "package", d.package.as_ref());
            }
            OrderDetails::GearRefresh(d) => {
                insert_opt(&mut map, "customer", d.customer.as_ref());
                insert_opt(&mut map, "location", d.location.as_ref());
                insert_opt(&mut map, "carType", d.car_type.as_ref());
                insert_opt(&mut map, "installationType", d.installation_type.as_ref());
                insert_opt(&mut map, "locales", d.locales.as_ref());
                insert_opt(&mut map, "package", d.package.as_ref());
            }
            OrderDetails::HomeCare(d) => {
                map.insert("payment_status".into(), json!(self.payment_status));
                map.insert("request_status".into(), json!(self.request_status));
                insert_opt(&mut map, "fullName", d.full_name.as_ref());
                insert_opt(&mut map, "email", d.email.as_ref());
                insert_opt(&mut map, "phone", d.phone.as_ref());
                insert_opt(&mut map, "address", d.address.as_ref());
                insert_opt(&mut map, "special_instructions", d.special_instructions.as_ref());
                insert_opt(&mut map, "date", d.date.as_ref());
                insert_opt(&mut map, "time", d.time.as_ref());
                insert_opt(&mut map, "duration", d.duration);
                insert_opt(&mut map, "property_type", d.property_type.as_ref());
                insert_opt(&mut map, "supplies_needed", d.supplies_needed);
                insert_opt(&mut map, "service_package", d.service_package.as_ref());
                insert_opt(&mut map, "no_of_rooms", d.no_of_rooms);
                insert_opt(&mut map, "language_code", d.language_code.as_ref());
                insert_opt(&mut map, "countryCode", d.country_code.as_ref());
            }
        }
        // Keeps the category when the signal that decided it has no canonical field
        map.insert("serviceType".into(), json!(self.service_type().id()));

        Value::Object(map)
    }
}

fn insert_opt<T: Serialize>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        if let Ok(v) = serde_json::to_value(v) {
            map.insert(key.to_string(), v);
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_parse_case_insensitive() {
        assert_eq!(
            PaymentStatus::parse("payment CONFIRMED"),
            Some(PaymentStatus::PaymentConfirmed)
        );
        assert_eq!(PaymentStatus::parse("QC/Feedback"), Some(PaymentStatus::QcFeedback));
        assert_eq!(PaymentStatus::parse("paid"), None);
    }

    #[test]
    fn test_confirmed_statuses() {
        let confirmed: Vec<_> = PaymentStatus::ALL
            .into_iter()
            .filter(|s| s.is_confirmed())
            .collect();
        assert_eq!(
            confirmed,
            vec![
                PaymentStatus::PaymentConfirmed,
                PaymentStatus::SentToVendor,
                PaymentStatus::QcFeedback,
                PaymentStatus::Completed,
            ]
        );
    }

    #[test]
    fn test_payment_status_serializes_label() {
        let json = serde_json::to_string(&PaymentStatus::SentToVendor).unwrap();
        assert_eq!(json, "\"Sent to vendor\"");
    }

    #[test]
    fn test_request_status_accepts_us_spelling() {
        assert_eq!(RequestStatus::parse("Canceled"), Some(RequestStatus::Cancelled));
        assert_eq!(RequestStatus::parse("unknown"), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::PendingPayment);
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
    }

    #[test]
    fn test_booking_type_keeps_unknown_values() {
        assert_eq!(BookingType::from("Week".to_string()), BookingType::Week);
        assert_eq!(
            BookingType::from("hourly".to_string()),
            BookingType::Other("hourly".into())
        );
        assert_eq!(BookingType::parse("hourly"), None);
        let json = serde_json::to_string(&BookingType::Other("hourly".into())).unwrap();
        assert_eq!(json, "\"hourly\"");
    }

    #[test]
    fn test_details_service_type() {
        assert_eq!(
            OrderDetails::HomeCare(HomeCareDetails::default()).service_type(),
            ServiceType::HomeCare
        );
        assert_eq!(
            OrderDetails::GearRefresh(GearRefreshDetails::default()).service_type(),
            ServiceType::GearRefresh
        );
    }
}
