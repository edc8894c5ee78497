//! Fetch transports for upstream order collections

mod file;
mod http;

pub use file::FileTransport;
pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{OrderPulseError, Result, ServiceType};

/// Pagination, sort and filter options for one request
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<String>,
    /// `filters[<key>]=<value>` pairs, in order
    pub filters: Vec<(String, String)>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            sort: Some(crate::config::DEFAULT_SORT.to_string()),
            filters: Vec::new(),
        }
    }
}

impl FetchOptions {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Strapi query parameters for these options
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("pagination[page]".to_string(), self.page.to_string()),
            ("pagination[pageSize]".to_string(), self.page_size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            query.push(("sort".to_string(), sort.clone()));
        }
        for (key, value) in &self.filters {
            query.push((format!("filters[{}]", key), value.clone()));
        }
        query.push(("populate".to_string(), "*".to_string()));
        query
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub pagination: Pagination,
}

/// One page of raw records: `{data: [...], meta: {pagination}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPage {
    pub data: Vec<Value>,
    pub meta: PageMeta,
}

impl OrderPage {
    /// Single page holding every record
    pub fn complete(data: Vec<Value>) -> Self {
        let total = data.len() as u64;
        Self {
            meta: PageMeta {
                pagination: Pagination {
                    page: 1,
                    page_size: total as u32,
                    page_count: 1,
                    total,
                },
            },
            data,
        }
    }

    /// Accept a Strapi envelope or a bare array of records
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(data) => Ok(Self::complete(data)),
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| OrderPulseError::Parse(e.to_string()))
            }
            other => Err(OrderPulseError::Parse(format!(
                "expected array or object, got {}",
                type_name(&other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Source of raw order and coupon records
#[async_trait]
pub trait OrderTransport: Send + Sync {
    /// Transport name (e.g., "http")
    fn name(&self) -> &str;

    /// Fetch one page of a service's orders
    async fn fetch_orders(&self, service: ServiceType, options: &FetchOptions)
        -> Result<OrderPage>;

    /// Fetch coupon redemption records
    async fn fetch_coupon_redemptions(&self, options: &FetchOptions) -> Result<Vec<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_parameters() {
        let options = FetchOptions {
            page: 2,
            page_size: 50,
            sort: Some("createdAt:desc".into()),
            filters: vec![("paymentStatus".into(), "Completed".into())],
        };

        let query = options.query();

        assert_eq!(query[0], ("pagination[page]".into(), "2".into()));
        assert_eq!(query[1], ("pagination[pageSize]".into(), "50".into()));
        assert_eq!(query[2], ("sort".into(), "createdAt:desc".into()));
        assert_eq!(
            query[3],
            ("filters[paymentStatus]".into(), "Completed".into())
        );
        assert_eq!(query[4], ("populate".into(), "*".into()));
    }

    #[test]
    fn test_page_from_envelope() {
        let page = OrderPage::from_value(json!({
            "data": [{"id": 1}, {"id": 2}],
            "meta": {"pagination": {"page": 1, "pageSize": 2, "pageCount": 3, "total": 6}}
        }))
        .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.pagination.page_count, 3);
    }

    #[test]
    fn test_page_from_bare_array() {
        let page = OrderPage::from_value(json!([{"id": 1}])).unwrap();
        assert_eq!(page.meta.pagination.page_count, 1);
        assert_eq!(page.meta.pagination.total, 1);
    }

    #[test]
    fn test_page_without_meta() {
        let page = OrderPage::from_value(json!({"data": []})).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.meta.pagination.page_count, 0);
    }

    #[test]
    fn test_page_rejects_scalar() {
        assert!(OrderPage::from_value(json!("oops")).is_err());
    }
}
