//! Type definitions for orderpulse

mod analytics;
mod clock;
mod error;
mod order;
mod service;

pub use analytics::*;
pub use clock::*;
pub use error::*;
pub use order::*;
pub use service::*;
