//! Error module containing error types and result aliases

mod visitor_error;

pub use visitor_error::{ErrorKind, VisitorError};

/// Result type for visitor forecasting operations
pub type Result<T> = std::result::Result<T, VisitorError>;
