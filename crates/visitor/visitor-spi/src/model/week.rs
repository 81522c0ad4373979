//! Week labels in the fixed `dd-mm-YYYY` format

use chrono::NaiveDate;

use crate::error::{Result, VisitorError};

/// Date format used by the tabular input and by serialized records
pub const WEEK_FORMAT: &str = "%d-%m-%Y";

/// Parse a `dd-mm-YYYY` week label
pub fn parse_week(label: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(label.trim(), WEEK_FORMAT)
        .map_err(|_| VisitorError::InvalidDate(label.to_string()))
}

/// Render a date as a `dd-mm-YYYY` week label
pub fn format_week(week: NaiveDate) -> String {
    week.format(WEEK_FORMAT).to_string()
}

/// Serde adapter for `dd-mm-YYYY` dates
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "visitor_spi::week_format")]
///     week: chrono::NaiveDate,
/// }
/// ```
pub mod week_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(week: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_week(*week))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        super::parse_week(&label).map_err(serde::de::Error::custom)
    }
}
