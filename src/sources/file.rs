//! Transport over exported JSON files
//!
//! Reads `<dir>/<service-id>.json` and `<dir>/coupon-redemptions.json`. Each
//! file holds a Strapi envelope or a bare array and is served as one page.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{FetchOptions, OrderPage, OrderTransport};
use crate::types::{OrderPulseError, Result, ServiceType};

const COUPON_FILE: &str = "coupon-redemptions.json";

#[derive(Debug, Clone)]
pub struct FileTransport {
    data_dir: PathBuf,
}

impl FileTransport {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn service_path(&self, service: ServiceType) -> PathBuf {
        self.data_dir.join(format!("{}.json", service.id()))
    }

    async fn read_page(path: &Path) -> Result<OrderPage> {
        let content = tokio::fs::read_to_string(path).await?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| OrderPulseError::Parse(format!("{}: {}", path.display(), e)))?;
        OrderPage::from_value(value)
    }
}

#[async_trait]
impl OrderTransport for FileTransport {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_orders(
        &self,
        service: ServiceType,
        options: &FetchOptions,
    ) -> Result<OrderPage> {
        let page = Self::read_page(&self.service_path(service)).await?;
        // Files are a single page
        if options.page > 1 {
            return Ok(OrderPage::default());
        }
        Ok(page)
    }

    async fn fetch_coupon_redemptions(&self, _options: &FetchOptions) -> Result<Vec<Value>> {
        let path = self.data_dir.join(COUPON_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(Self::read_page(&path).await?.data)
    }
}
