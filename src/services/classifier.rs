//! Service classification for records whose origin does not decide the category

use serde_json::{Map, Value};

use crate::types::{BookingType, ServiceType};

/// Presence pattern of service-indicative fields in a record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceHints {
    pub has_hours: bool,
    pub has_children: bool,
    pub booking_type: Option<BookingType>,
    /// `bookingType` says "nanny" or `serviceType` names nannies
    pub nanny_marker: bool,
    pub has_property_type: bool,
    pub has_supplies_needed: bool,
    pub has_rooms: bool,
    pub has_duration: bool,
    pub has_inline_name: bool,
    pub has_inline_address: bool,
    pub has_cleaning_type: bool,
    pub has_car_type: bool,
    pub has_installation_type: bool,
    /// `serviceType` explicitly names gear-refresh
    pub gear_marker: bool,
    /// `serviceType` explicitly names home-care
    pub home_care_marker: bool,
}

impl ServiceHints {
    /// Probe a raw record (already unwrapped from any `attributes` envelope)
    pub fn from_record(data: &Map<String, Value>) -> Self {
        let present = |key: &str| data.get(key).is_some_and(|v| !v.is_null());
        let truthy = |key: &str| data.get(key).is_some_and(is_truthy);
        let marker = data
            .get("serviceType")
            .and_then(Value::as_str)
            .and_then(ServiceType::parse);
        let equals = |key: &str, expected: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case(expected))
        };

        Self {
            has_hours: present("hours") || truthy("numberOfHours"),
            has_children: present("noOfChildren")
                || truthy("children")
                || truthy("numberOfChildren")
                || truthy("childAgeGroups")
                || truthy("no_of_children"),
            booking_type: data
                .get("type")
                .and_then(Value::as_str)
                .and_then(BookingType::parse),
            nanny_marker: equals("bookingType", "nanny") || marker == Some(ServiceType::Nannies),
            has_property_type: truthy("property_type"),
            has_supplies_needed: present("supplies_needed"),
            has_rooms: present("no_of_rooms"),
            has_duration: present("duration"),
            has_inline_name: truthy("fullName") || truthy("full_name"),
            has_inline_address: data.get("address").is_some_and(has_address_content),
            has_cleaning_type: truthy("cleaningType"),
            has_car_type: truthy("carType"),
            has_installation_type: truthy("installationType"),
            gear_marker: marker == Some(ServiceType::GearRefresh),
            home_care_marker: marker == Some(ServiceType::HomeCare),
        }
    }

    pub fn indicates_nanny(&self) -> bool {
        self.has_hours || self.has_children || self.booking_type.is_some() || self.nanny_marker
    }

    pub fn indicates_home_care(&self) -> bool {
        self.has_property_type
            || self.has_supplies_needed
            || self.has_rooms
            || self.has_duration
            || self.has_inline_name
            || self.has_inline_address
            || self.has_cleaning_type
            || self.home_care_marker
    }

    pub fn indicates_gear_refresh(&self) -> bool {
        self.has_car_type || self.has_installation_type || self.gear_marker
    }
}

/// Pick the most likely service for a record.
///
/// Priority is fixed: nanny signals win over home-care signals, which win
/// over gear-refresh signals. Records with no signal fall back to nannies.
pub fn classify(hints: &ServiceHints) -> ServiceType {
    if hints.indicates_nanny() {
        ServiceType::Nannies
    } else if hints.indicates_home_care() {
        ServiceType::HomeCare
    } else if hints.indicates_gear_refresh() {
        ServiceType::GearRefresh
    } else {
        ServiceType::Nannies
    }
}

/// Classify a raw record directly
pub fn classify_record(data: &Map<String, Value>) -> ServiceType {
    classify(&ServiceHints::from_record(data))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn has_address_content(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => map.iter().any(|(k, v)| k != "id" && is_truthy(v)),
        _ => false,
    }
}
