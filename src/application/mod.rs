//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete stores or
//! embedders; the binary and the tests choose the implementations.

pub mod services;

pub use services::{DocumentService, IndexService, SearchService};
