//! Order normalization service
//!
//! Converts one raw upstream record into a canonical [`Order`]. Records may
//! be Strapi v4 (fields under `attributes`, relations under `data`) or v5
//! (flat), and status/time fields may be camelCase or snake_case.
//!
//! Normalization is total: missing or mistyped fields fall back to defaults
//! and never produce an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::services::classifier::{classify, ServiceHints};
use crate::types::{
    Address, BookingType, Customer, GearRefreshDetails, HomeCareDetails, Location, NannyDetails,
    Order, OrderDetails, PaymentStatus, RequestStatus, ServicePackage, ServiceType,
};

const DEFAULT_CURRENCY: &str = "AED";

/// Normalize a raw record.
///
/// `origin` is the service the record is known to belong to; `None` lets the
/// classifier decide from the record's fields.
///
/// # Examples
/// ```
/// use orderpulse::services::normalizer::normalize_order;
/// use orderpulse::types::{PaymentStatus, ServiceType};
///
/// let raw = serde_json::json!({
///     "id": 7,
///     "documentId": "doc-7",
///     "price": 250,
///     "payment_status": "Completed",
///     "property_type": "house",
/// });
/// let order = normalize_order(&raw, None);
/// assert_eq!(order.total, 250.0);
/// assert_eq!(order.payment_status, PaymentStatus::Completed);
/// assert_eq!(order.service_type(), ServiceType::HomeCare);
/// ```
pub fn normalize_order(raw: &Value, origin: Option<ServiceType>) -> Order {
    let empty = Map::new();
    let record = raw.as_object().unwrap_or(&empty);

    // v4 nests fields under a non-empty `attributes` object
    let data = match record.get("attributes") {
        Some(Value::Object(attrs)) if !attrs.is_empty() => attrs,
        _ => record,
    };

    let id = record.get("id").and_then(as_i64).unwrap_or(0);
    let document_id = string_field(record, &["documentId", "document_id"])
        .or_else(|| string_field(data, &["documentId", "document_id"]))
        .unwrap_or_else(|| id.to_string());

    let total = money_field(data, &["total"])
        .or_else(|| money_field(data, &["price"]))
        .unwrap_or(0.0);
    let price = money_field(data, &["price"]).unwrap_or(total);
    let original_price = money_field(data, &["originalPrice", "original_price"])
        .or_else(|| money_field(data, &["price"]))
        .unwrap_or(total);

    let service = origin.unwrap_or_else(|| classify(&ServiceHints::from_record(data)));

    Order {
        id,
        document_id,
        order_id: string_field(data, &["orderId", "order_id"])
            .unwrap_or_else(|| format!("ORDER-{}", id)),
        price,
        total,
        original_price,
        discounted_price: money_field(data, &["discountedPrice", "discounted_price"]),
        coupon_code: string_field(data, &["couponCode", "coupon_code"]),
        payment_status: payment_status(data),
        request_status: request_status(data),
        payment_id: string_field(data, &["payment_id", "paymentId"]),
        response_id: string_field(data, &["response_id", "responseId"]),
        currency_code: string_field(data, &["currencyCode", "currency_code"])
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        sms_confirmation_sent: bool_field(data, &["smsConfirmationSent", "sms_confirmation_sent"])
            .unwrap_or(false),
        created_at: timestamp_field(data, &["createdAt", "created_at"]),
        updated_at: timestamp_field(data, &["updatedAt", "updated_at"]),
        details: details_for(service, data),
    }
}

/// Normalize a page of raw records from the same origin
pub fn normalize_all(raw: &[Value], origin: Option<ServiceType>) -> Vec<Order> {
    raw.iter().map(|r| normalize_order(r, origin)).collect()
}

fn payment_status(data: &Map<String, Value>) -> PaymentStatus {
    match string_field(data, &["payment_status", "paymentStatus"]) {
        Some(label) => PaymentStatus::parse(&label).unwrap_or_else(|| {
            debug!(status = %label, "unknown payment status, using default");
            PaymentStatus::default()
        }),
        None => PaymentStatus::default(),
    }
}

fn request_status(data: &Map<String, Value>) -> RequestStatus {
    match string_field(data, &["request_status", "requestStatus"]) {
        Some(label) => RequestStatus::parse(&label).unwrap_or_else(|| {
            debug!(status = %label, "unknown request status, using default");
            RequestStatus::default()
        }),
        None => RequestStatus::default(),
    }
}

fn details_for(service: ServiceType, data: &Map<String, Value>) -> OrderDetails {
    match service {
        ServiceType::Nannies => OrderDetails::Nanny(NannyDetails {
            customer: customer(data),
            location: location(data),
            hours: number_field(data, &["hours", "numberOfHours"]),
            booking_type: string_field(data, &["type"]).map(BookingType::from),
            no_of_days: count_field(data, &["noOfDays", "no_of_days"]),
            date: string_field(data, &["date"]),
            time: string_field(data, &["time"]),
            no_of_children: count_field(
                data,
                &["noOfChildren", "no_of_children", "numberOfChildren"],
            ),
            locales: string_field(data, &["locales"]),
            special_instructions: string_field(
                data,
                &["specialInstructions", "special_instructions"],
            ),
            package: package(data, &["package"]),
        }),
        ServiceType::GearRefresh => OrderDetails::GearRefresh(GearRefreshDetails {
            customer: customer(data),
            location: location(data),
            car_type: string_field(data, &["carType", "car_type"]),
            installation_type: string_field(data, &["installationType", "installation_type"]),
            locales: string_field(data, &["locales"]),
            package: package(data, &["package"]),
        }),
        ServiceType::HomeCare => OrderDetails::HomeCare(HomeCareDetails {
            full_name: string_field(data, &["fullName", "full_name"]),
            email: string_field(data, &["email"]),
            phone: string_field(data, &["phone"]),
            address: address(data),
            special_instructions: string_field(
                data,
                &["special_instructions", "specialInstructions"],
            ),
            date: string_field(data, &["date"]),
            time: string_field(data, &["time"]),
            duration: number_field(data, &["duration"]),
            property_type: string_field(data, &["property_type", "propertyType"]),
            supplies_needed: bool_field(data, &["supplies_needed", "suppliesNeeded"]),
            service_package: package(data, &["service_package", "servicePackage"]),
            no_of_rooms: count_field(data, &["no_of_rooms", "noOfRooms"]),
            language_code: string_field(data, &["language_code", "languageCode"]),
            country_code: string_field(data, &["countryCode", "country_code"]),
        }),
    }
}

// ========== relations ==========

/// Unwrap a relation: flat objects are used as-is, v4 `{data: {id, attributes}}`
/// wrappers are flattened. Empty or null relations yield `None`.
pub(crate) fn relation(value: Option<&Value>) -> Option<Map<String, Value>> {
    let obj = value?.as_object()?;
    if let Some(inner) = obj.get("data") {
        let inner = inner.as_object()?;
        let mut merged = match inner.get("attributes") {
            Some(Value::Object(attrs)) => attrs.clone(),
            _ => inner.clone(),
        };
        if let Some(id) = inner.get("id") {
            merged.entry("id").or_insert_with(|| id.clone());
        }
        return (!merged.is_empty()).then_some(merged);
    }
    (!obj.is_empty()).then(|| obj.clone())
}

/// Customer relation, or inline contact fields for services without one
fn customer(data: &Map<String, Value>) -> Option<Customer> {
    if let Some(rel) = relation(data.get("customer")) {
        let customer = Customer {
            id: rel.get("id").and_then(as_i64),
            full_name: string_field(&rel, &["fullName", "full_name"]),
            email: string_field(&rel, &["email"]),
            phone: string_field(&rel, &["phone"]),
        };
        if customer != Customer::default() {
            return Some(customer);
        }
    }

    let inline = Customer {
        id: None,
        full_name: string_field(data, &["fullName", "full_name"]),
        email: string_field(data, &["email"]),
        phone: string_field(data, &["phone"]),
    };
    (inline != Customer::default()).then_some(inline)
}

fn location(data: &Map<String, Value>) -> Option<Location> {
    let rel = relation(data.get("location"))?;
    let location = Location {
        id: rel.get("id").and_then(as_i64),
        address: string_field(&rel, &["address"]),
        city: string_field(&rel, &["city"]),
        country: string_field(&rel, &["country"]),
        lat: number_field(&rel, &["lat", "latitude"]),
        lng: number_field(&rel, &["lng", "longitude"]),
    };
    (location != Location::default()).then_some(location)
}

fn address(data: &Map<String, Value>) -> Option<Address> {
    if let Some(Value::String(street)) = data.get("address") {
        return (!street.trim().is_empty()).then(|| Address {
            street: Some(street.clone()),
            ..Address::default()
        });
    }
    let rel = relation(data.get("address"))?;
    let address = Address {
        id: rel.get("id").and_then(as_i64),
        street: string_field(&rel, &["street"]),
        city: string_field(&rel, &["city"]),
        state: string_field(&rel, &["state"]),
        country: string_field(&rel, &["country"]),
        zip_code: string_field(&rel, &["zipCode", "zip_code"]),
    };
    (address != Address::default()).then_some(address)
}

fn package(data: &Map<String, Value>, keys: &[&str]) -> Option<ServicePackage> {
    let rel = keys.iter().find_map(|k| relation(data.get(*k)))?;
    Some(ServicePackage {
        id: rel.get("id").and_then(as_i64).unwrap_or(0),
        name: string_field(&rel, &["name"])?,
        price: number_field(&rel, &["price"]),
    })
}

// ========== scalar fields ==========

/// First non-empty string among `keys` (numbers are stringified)
pub(crate) fn string_field(data: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match data.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn number_field(data: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|k| data.get(*k).and_then(as_f64))
        .filter(|n| n.is_finite())
}

fn count_field(data: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    number_field(data, keys)
        .filter(|n| *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
}

/// Money value that counts as "present": finite and positive.
/// Zero falls through to the next fallback; negatives are discarded.
fn money_field(data: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| {
        let n = data.get(*k).and_then(as_f64)?;
        if !n.is_finite() || n < 0.0 {
            debug!(field = %k, value = n, "invalid money value, ignoring");
            return None;
        }
        (n > 0.0).then_some(n)
    })
}

fn bool_field(data: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| match data.get(*k)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn timestamp_field(data: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    let raw = string_field(data, keys)?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        debug!(value = %raw, "unparseable timestamp");
    }
    parsed
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
