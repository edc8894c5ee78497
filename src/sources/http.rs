//! Strapi REST transport

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{FetchOptions, OrderPage, OrderTransport};
use crate::config::Config;
use crate::types::{OrderPulseError, Result, ServiceType};

/// HTTP transport over reqwest, one bearer token per service
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OrderPulseError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn get(&self, url: &str, token: Option<&str>, options: &FetchOptions) -> Result<Value> {
        let mut request = self.client.get(url).query(&options.query());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OrderPulseError::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderPulseError::Transport(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| OrderPulseError::Parse(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl OrderTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_orders(
        &self,
        service: ServiceType,
        options: &FetchOptions,
    ) -> Result<OrderPage> {
        let url = self.config.orders_url(service);
        let body = self
            .get(&url, self.config.token(service), options)
            .await?;
        OrderPage::from_value(body)
    }

    async fn fetch_coupon_redemptions(&self, options: &FetchOptions) -> Result<Vec<Value>> {
        let url = self.config.coupons_url();
        let body = self
            .get(&url, self.config.token(ServiceType::Nannies), options)
            .await?;
        Ok(OrderPage::from_value(body)?.data)
    }
}
