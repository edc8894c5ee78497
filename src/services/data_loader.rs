//! Fetch orchestration: fan out per service, normalize, merge and filter
//!
//! Each service is fetched independently. A failed service contributes an
//! empty list and a warning; only when every service fails does loading
//! return an error.

use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::services::accessors::is_cancelled;
use crate::services::coupons::apply_redemptions;
use crate::services::normalizer::normalize_all;
use crate::sources::{FetchOptions, OrderTransport};
use crate::types::{Order, OrderBundle, OrderPulseError, Result, ServiceType};

/// Result of one orchestrated load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    /// Non-cancelled orders, flattened and partitioned by service
    pub bundle: OrderBundle,
    /// Services whose fetch failed and contributed nothing
    pub failed_services: Vec<ServiceType>,
    /// Orders updated from coupon redemptions
    pub coupons_applied: usize,
}

/// Orchestrates the three per-service fetches over a transport
pub struct DataLoaderService<T: OrderTransport> {
    transport: T,
    options: FetchOptions,
    max_pages: u32,
}

impl<T: OrderTransport> DataLoaderService<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            options: FetchOptions::default(),
            max_pages: crate::config::DEFAULT_MAX_PAGES,
        }
    }

    /// Loader using the page size, sort and page limit from `config`
    pub fn from_config(transport: T, config: &Config) -> Self {
        Self {
            transport,
            options: FetchOptions {
                page: 1,
                page_size: config.page_size,
                sort: Some(config.sort.clone()),
                filters: Vec::new(),
            },
            max_pages: config.max_pages.max(1),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch every service concurrently and build the order bundle
    pub async fn load(&self) -> Result<LoadResult> {
        let fetches = join_all(
            ServiceType::ALL
                .into_iter()
                .map(|service| async move { (service, self.fetch_service(service).await) }),
        );
        let coupons = self.transport.fetch_coupon_redemptions(&self.options);
        let (results, coupons) = futures::join!(fetches, coupons);

        let mut orders: Vec<Order> = Vec::new();
        let mut failed_services = Vec::new();
        for (service, result) in results {
            match result {
                Ok(raw) => {
                    // The nannies endpoint also serves other services' records
                    let origin = service.origin_is_authoritative().then_some(service);
                    debug!(service = %service, records = raw.len(), "normalizing");
                    orders.extend(normalize_all(&raw, origin));
                }
                Err(e) => {
                    warn!(service = %service, error = %e, "service fetch failed");
                    failed_services.push(service);
                }
            }
        }

        if failed_services.len() == ServiceType::ALL.len() {
            return Err(OrderPulseError::AllSourcesFailed);
        }

        let coupons_applied = match coupons {
            Ok(redemptions) => apply_redemptions(&mut orders, &redemptions),
            Err(e) => {
                warn!(error = %e, "coupon redemption fetch failed");
                0
            }
        };

        let before = orders.len();
        orders.retain(|o| !is_cancelled(o));

        let mut by_service: BTreeMap<ServiceType, Vec<Order>> = BTreeMap::new();
        for order in orders {
            by_service.entry(order.service_type()).or_default().push(order);
        }
        let bundle = OrderBundle::from_services(by_service);

        for service in ServiceType::ALL {
            info!(
                service = %service,
                orders = bundle.service_orders(service).len(),
                "loaded"
            );
        }
        info!(
            total = bundle.orders.len(),
            cancelled = before - bundle.orders.len(),
            coupons = coupons_applied,
            "order bundle ready"
        );

        Ok(LoadResult {
            bundle,
            failed_services,
            coupons_applied,
        })
    }

    /// All pages of one service, following `pageCount` up to the page limit
    async fn fetch_service(&self, service: ServiceType) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let response = self
                .transport
                .fetch_orders(service, &self.options.with_page(page))
                .await?;
            let page_count = response.meta.pagination.page_count;
            let empty = response.data.is_empty();
            records.extend(response.data);

            if empty || page >= page_count || page >= self.max_pages {
                break;
            }
            page += 1;
        }
        Ok(records)
    }
}
