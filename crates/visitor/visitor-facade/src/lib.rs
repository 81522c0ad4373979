//! Visitor Forecasting Facade
//!
//! High-level API for weekly visitor forecasting. Re-exports all public
//! types from the visitor stack for convenient usage.

// Re-export everything from API (which includes SPI and core)
pub use visitor_api::*;

// Explicit re-exports for documentation
pub use visitor_api::prelude;

// Re-export SPI contracts
pub use visitor_spi::{NoiseSource, TrendModel, VisitorError};
