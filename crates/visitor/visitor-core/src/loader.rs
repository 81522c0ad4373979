//! Series loading from tabular interest data
//!
//! The input layout is fixed: one date column (`Week` by default, formatted
//! `dd-mm-YYYY`) and one numeric column per location.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;
use visitor_spi::{
    Observation, ObservationSeries, Result, VisitorError, MIN_OBSERVATIONS, WEEK_FORMAT,
};

/// Name of the date column in the interest export
pub const DEFAULT_DATE_COLUMN: &str = "Week";

/// Header plus raw string records, before any coercion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a CSV document into a raw table
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Read a CSV file into a raw table
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Turns raw tabular rows into a validated [`ObservationSeries`]
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    date_column: String,
    min_observations: usize,
}

impl Default for SeriesLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesLoader {
    pub fn new() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            min_observations: MIN_OBSERVATIONS,
        }
    }

    /// Use a different date column name
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    /// Location columns present in the table
    pub fn locations(&self, table: &RawTable) -> Vec<String> {
        table
            .headers
            .iter()
            .filter(|h| **h != self.date_column)
            .cloned()
            .collect()
    }

    /// Extract the series for `location`
    ///
    /// Rows with an unparseable date or a non-numeric value are dropped;
    /// negative readings are taken by magnitude; duplicate weeks keep their
    /// first occurrence.
    pub fn load(&self, table: &RawTable, location: &str) -> Result<ObservationSeries> {
        let date_idx = table.column_index(&self.date_column).ok_or_else(|| {
            VisitorError::MissingColumn {
                column: self.date_column.clone(),
                available: table.headers.clone(),
            }
        })?;
        let value_idx =
            table
                .column_index(location)
                .ok_or_else(|| VisitorError::MissingColumn {
                    column: location.to_string(),
                    available: self.locations(table),
                })?;

        let mut observations: Vec<Observation> = table
            .rows
            .iter()
            .filter_map(|row| {
                let week = row
                    .get(date_idx)
                    .and_then(|d| NaiveDate::parse_from_str(d.trim(), WEEK_FORMAT).ok())?;
                let value = row
                    .get(value_idx)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite())?;
                Some(Observation::new(week, value.abs()))
            })
            .collect();

        let parsed = observations.len();
        observations.sort_by_key(|o| o.week);
        observations.dedup_by_key(|o| o.week);

        debug!(
            location,
            rows = table.rows.len(),
            kept = observations.len(),
            dropped = table.rows.len() - observations.len(),
            duplicates = parsed - observations.len(),
            "loaded interest series"
        );

        if observations.len() < self.min_observations {
            return Err(VisitorError::InsufficientData {
                required: self.min_observations,
                actual: observations.len(),
            });
        }

        ObservationSeries::new(location, observations)
    }

    /// Read CSV from `reader` and extract the series for `location`
    pub fn load_reader<R: Read>(&self, reader: R, location: &str) -> Result<ObservationSeries> {
        let table = RawTable::from_reader(reader)?;
        self.load(&table, location)
    }

    /// Read a CSV file and extract the series for `location`
    pub fn load_path(&self, path: &Path, location: &str) -> Result<ObservationSeries> {
        let table = RawTable::from_path(path)?;
        self.load(&table, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_with_rows(rows: usize) -> String {
        let mut text = String::from("Week,Goa,Hampi\n");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..rows {
            let week = start + chrono::Duration::weeks(i as i64);
            text.push_str(&format!(
                "{},{},{}\n",
                week.format(WEEK_FORMAT),
                40 + i,
                10 + i
            ));
        }
        text
    }

    #[test]
    fn test_load_from_reader() {
        let loader = SeriesLoader::new();
        let series = loader
            .load_reader(csv_with_rows(15).as_bytes(), "Goa")
            .unwrap();
        assert_eq!(series.len(), 15);
        assert_eq!(series.values()[0], 40.0);
        assert_eq!(series.location(), "Goa");
    }

    #[test]
    fn test_drops_bad_rows_and_sorts() {
        let mut text = String::from("Week,Goa\n");
        text.push_str("not-a-date,10\n");
        text.push_str("08-01-2024,<1\n");
        for i in (0..12).rev() {
            text.push_str(&format!("{:02}-03-2024,{}\n", i + 1, i));
        }
        let series = SeriesLoader::new()
            .load_reader(text.as_bytes(), "Goa")
            .unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series.values()[0], 0.0);
        assert_eq!(series.values()[11], 11.0);
    }

    #[test]
    fn test_negative_values_taken_by_magnitude() {
        let mut text = String::from("Week,Goa\n");
        for i in 0..12 {
            text.push_str(&format!("{:02}-05-2024,-{}\n", i + 1, i));
        }
        let series = SeriesLoader::new()
            .load_reader(text.as_bytes(), "Goa")
            .unwrap();
        assert!(series.values().iter().all(|v| *v >= 0.0));
        assert_eq!(series.values()[3], 3.0);
    }

    #[test]
    fn test_duplicate_weeks_keep_first() {
        let mut text = String::from("Week,Goa\n");
        for i in 0..12 {
            text.push_str(&format!("{:02}-06-2024,{}\n", i + 1, i));
        }
        text.push_str("01-06-2024,99\n");
        let series = SeriesLoader::new()
            .load_reader(text.as_bytes(), "Goa")
            .unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series.values()[0], 0.0);
    }

    #[test]
    fn test_missing_location() {
        let err = SeriesLoader::new()
            .load_reader(csv_with_rows(15).as_bytes(), "Atlantis")
            .unwrap_err();
        match err {
            VisitorError::MissingColumn { column, available } => {
                assert_eq!(column, "Atlantis");
                assert_eq!(available, vec!["Goa".to_string(), "Hampi".to_string()]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_date_column() {
        let text = "Date,Goa\n01-01-2024,1\n";
        let err = SeriesLoader::new()
            .load_reader(text.as_bytes(), "Goa")
            .unwrap_err();
        assert!(matches!(err, VisitorError::MissingColumn { ref column, .. } if column == "Week"));
    }

    #[test]
    fn test_custom_date_column() {
        let text = csv_with_rows(12).replace("Week", "Date");
        let series = SeriesLoader::new()
            .with_date_column("Date")
            .load_reader(text.as_bytes(), "Hampi")
            .unwrap();
        assert_eq!(series.len(), 12);
    }

    #[test]
    fn test_insufficient_rows() {
        let err = SeriesLoader::new()
            .load_reader(csv_with_rows(11).as_bytes(), "Goa")
            .unwrap_err();
        assert_eq!(
            err,
            VisitorError::InsufficientData {
                required: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_locations() {
        let table = RawTable::from_reader(csv_with_rows(2).as_bytes()).unwrap();
        assert_eq!(SeriesLoader::new().locations(&table), vec!["Goa", "Hampi"]);
    }

    #[test]
    fn test_load_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", csv_with_rows(13)).unwrap();

        let series = SeriesLoader::new().load_path(file.path(), "Hampi").unwrap();
        assert_eq!(series.len(), 13);
        assert_eq!(series.values()[12], 22.0);
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = SeriesLoader::new()
            .load_path(Path::new("/definitely/not/here.csv"), "Goa")
            .unwrap_err();
        assert!(matches!(err, VisitorError::Io(_)));
    }
}
