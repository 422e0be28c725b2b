//! fraudscope: analysis layer for a retail delivery fraud dataset
//!
//! Raw order/driver/customer/product rows come from an embedded SurrealDB
//! store (or a clearly-labeled synthetic provider when the store is
//! unavailable), flow through metric derivation and filtering, and are
//! optionally run through IQR/K-Means utilities. Terminal report binaries
//! render the results and can export them as CSV or Markdown.

pub mod cache;
pub mod config;
pub mod db;
pub mod export;
pub mod filters;
pub mod metrics;
pub mod models;
pub mod source;
pub mod stats;
pub mod synthetic;
