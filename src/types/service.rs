//! Service categories and their fixed configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level partition of all orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Nannies,
    GearRefresh,
    HomeCare,
}

/// Static presentation and margin settings for a service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceProfile {
    pub name: &'static str,
    pub short_name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    /// Fraction of revenue paid out to the service provider
    pub margin_rate: f64,
}

const NANNIES_PROFILE: ServiceProfile = ServiceProfile {
    name: "Nanny Services",
    short_name: "Nanny",
    color: "#0D363C",
    icon: "baby",
    margin_rate: 0.65,
};

const GEAR_REFRESH_PROFILE: ServiceProfile = ServiceProfile {
    name: "Gear Refresh Services",
    short_name: "Gear",
    color: "#4c6c5a",
    icon: "car",
    margin_rate: 0.70,
};

const HOME_CARE_PROFILE: ServiceProfile = ServiceProfile {
    name: "Home Care Services",
    short_name: "Home",
    color: "#D4AF37",
    icon: "home",
    margin_rate: 0.60,
};

impl ServiceType {
    /// All services in declaration order
    pub const ALL: [ServiceType; 3] = [
        ServiceType::Nannies,
        ServiceType::GearRefresh,
        ServiceType::HomeCare,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ServiceType::Nannies => "nannies",
            ServiceType::GearRefresh => "gear-refresh",
            ServiceType::HomeCare => "home-care",
        }
    }

    pub fn profile(self) -> &'static ServiceProfile {
        match self {
            ServiceType::Nannies => &NANNIES_PROFILE,
            ServiceType::GearRefresh => &GEAR_REFRESH_PROFILE,
            ServiceType::HomeCare => &HOME_CARE_PROFILE,
        }
    }

    pub fn margin_rate(self) -> f64 {
        self.profile().margin_rate
    }

    /// The nannies endpoint is the shared legacy orders feed, so its records
    /// are classified individually. The other endpoints are authoritative.
    pub fn origin_is_authoritative(self) -> bool {
        !matches!(self, ServiceType::Nannies)
    }

    /// Parse a service id ("car-seat" is the legacy name of gear-refresh)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nannies" | "nanny" => Some(ServiceType::Nannies),
            "gear-refresh" | "gear_refresh" | "car-seat" => Some(ServiceType::GearRefresh),
            "home-care" | "home_care" => Some(ServiceType::HomeCare),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "unknown service '{}' (expected nannies, gear-refresh or home-care)",
                s
            )
        })
    }
}
