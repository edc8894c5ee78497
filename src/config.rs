//! Configuration: JSON file plus environment overrides

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{OrderPulseError, Result, ServiceType};

pub const DEFAULT_BASE_URL: &str = "http://localhost:1337";
pub const DEFAULT_COUPON_ENDPOINT: &str = "/api/coupon-redemptions";
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_MAX_PAGES: u32 = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SORT: &str = "createdAt:desc";

/// Upstream location of one service's orders. Unset fields fall back to the
/// per-service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nannies: ServiceEndpoint,
    pub gear_refresh: ServiceEndpoint,
    pub home_care: ServiceEndpoint,
    /// Served from the nannies base URL
    pub coupon_endpoint: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub timeout_secs: u64,
    pub sort: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nannies: ServiceEndpoint::default(),
            gear_refresh: ServiceEndpoint::default(),
            home_care: ServiceEndpoint::default(),
            coupon_endpoint: DEFAULT_COUPON_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl Config {
    /// `~/.orderpulse/config.json`
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.home_dir().join(".orderpulse").join("config.json"))
    }

    /// Load from `path`, or from the default location when `None`.
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| OrderPulseError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply `<SERVICE>_API_URL` / `<SERVICE>_API_TOKEN` overrides
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for service in ServiceType::ALL {
            let prefix = env_prefix(service);
            let endpoint = self.endpoint_mut(service);
            if let Some(url) = lookup(&format!("{}_API_URL", prefix)).filter(|v| !v.is_empty()) {
                endpoint.base_url = Some(url);
            }
            if let Some(token) =
                lookup(&format!("{}_API_TOKEN", prefix)).filter(|v| !v.is_empty())
            {
                endpoint.token = Some(token);
            }
        }
    }

    pub fn endpoint(&self, service: ServiceType) -> &ServiceEndpoint {
        match service {
            ServiceType::Nannies => &self.nannies,
            ServiceType::GearRefresh => &self.gear_refresh,
            ServiceType::HomeCare => &self.home_care,
        }
    }

    fn endpoint_mut(&mut self, service: ServiceType) -> &mut ServiceEndpoint {
        match service {
            ServiceType::Nannies => &mut self.nannies,
            ServiceType::GearRefresh => &mut self.gear_refresh,
            ServiceType::HomeCare => &mut self.home_care,
        }
    }

    pub fn base_url(&self, service: ServiceType) -> &str {
        self.endpoint(service)
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn endpoint_path(&self, service: ServiceType) -> &str {
        self.endpoint(service)
            .endpoint
            .as_deref()
            .unwrap_or(match service {
                ServiceType::HomeCare => "/api/service-requests",
                ServiceType::Nannies | ServiceType::GearRefresh => "/api/orders",
            })
    }

    pub fn token(&self, service: ServiceType) -> Option<&str> {
        self.endpoint(service).token.as_deref()
    }

    /// Full URL of a service's order collection
    pub fn orders_url(&self, service: ServiceType) -> String {
        format!("{}{}", self.base_url(service), self.endpoint_path(service))
    }

    pub fn coupons_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url(ServiceType::Nannies),
            self.coupon_endpoint
        )
    }
}

fn env_prefix(service: ServiceType) -> &'static str {
    match service {
        ServiceType::Nannies => "NANNIES",
        ServiceType::GearRefresh => "GEAR_REFRESH",
        ServiceType::HomeCare => "HOME_CARE",
    }
}
