//! # api-adapters
//!
//! Inbound HTTP adapter for PetConnect.
//!
//! The wire types (`envelope`, `dto`) and the metrics registry are plain
//! serde/prometheus code. The axum router, extractors and handlers live in
//! `web` behind the `web-axum` feature.

pub mod dto;
pub mod envelope;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod web;

pub use envelope::{ApiResponse, Pagination};
pub use metrics::HttpMetrics;
