//! Visitor forecasting error types

use thiserror::Error;

/// Errors that can occur while loading series or producing forecasts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisitorError {
    /// A required column is missing from the tabular input
    #[error("Column '{column}' not found. Available locations: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Not enough valid observations for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A date could not be parsed with the `dd-mm-YYYY` format
    #[error("Invalid date '{0}': expected dd-mm-YYYY")]
    InvalidDate(String),

    /// Series content violates the data model
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(String),

    /// Underlying I/O failure while reading input
    #[error("I/O error: {0}")]
    Io(String),

    /// One forecasting strategy failed to fit
    #[error("Model '{model}' failed to fit: {reason}")]
    ModelFit { model: String, reason: String },

    /// A model or calibration was used before being fitted
    #[error("Model must be fitted before use")]
    NotFitted,

    /// Every configured strategy failed to fit
    #[error("No forecast available: all strategies failed ({})", attempted.join(", "))]
    ForecastUnavailable { attempted: Vec<String> },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error classes used to decide how a failure propagates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or insufficient input; fatal to the request
    Data,
    /// A single strategy failed; the strategy is skipped
    ModelFit,
    /// Contract violation: used before fit
    NotFitted,
    /// Every strategy failed; fatal to the request
    ForecastUnavailable,
    /// Invalid configuration or request parameters
    Config,
}

impl VisitorError {
    /// Build a [`VisitorError::ModelFit`] for the named model
    pub fn model_fit(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelFit {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`VisitorError::InvalidParameter`]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingColumn { .. }
            | Self::InsufficientData { .. }
            | Self::InvalidDate(_)
            | Self::InvalidData(_)
            | Self::Csv(_)
            | Self::Io(_) => ErrorKind::Data,
            Self::ModelFit { .. } => ErrorKind::ModelFit,
            Self::NotFitted => ErrorKind::NotFitted,
            Self::ForecastUnavailable { .. } => ErrorKind::ForecastUnavailable,
            Self::InvalidParameter { .. } | Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether this failure aborts the whole forecast request
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::ModelFit
    }
}

impl From<csv::Error> for VisitorError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<std::io::Error> for VisitorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
