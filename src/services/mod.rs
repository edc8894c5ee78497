//! Services for normalization, aggregation and loading

pub mod accessors;
pub mod aggregator;
pub mod classifier;
pub mod coupons;
pub mod data_loader;
pub mod insights;
pub mod margin;
pub mod normalizer;
pub mod projection;

pub use aggregator::{percentage_change, Aggregator};
pub use classifier::{classify, ServiceHints};
pub use data_loader::{DataLoaderService, LoadResult};
pub use insights::Insights;
pub use normalizer::normalize_order;
