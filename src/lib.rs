//! Order normalization and analytics for nannies, gear-refresh and home-care
//! services.
//!
//! Raw upstream records are normalized into one canonical [`types::Order`],
//! tagged with their service, and aggregated by pure functions in
//! [`services`].

pub mod cli;
pub mod config;
pub mod services;
pub mod sources;
pub mod types;
