//! Seasonal and scaling lookup tables
//!
//! All tables are immutable configuration. The built-in instances live in
//! process-wide statics initialised on first use.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Scaling factor applied to locations missing from the table
pub const DEFAULT_SCALING_FACTOR: u64 = 500;

/// Demand season a calendar month belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    WinterPeak,
    SummerPeak,
    Monsoon,
    Spring,
    PreSummer,
    Autumn,
    Regular,
}

impl Season {
    /// Season of a calendar month (1-12); anything unmapped is `Regular`
    pub fn of_month(month: u32) -> Self {
        match month {
            11 | 12 | 1 => Self::WinterPeak,
            6 | 7 => Self::SummerPeak,
            8 | 9 => Self::Monsoon,
            3 | 4 => Self::Spring,
            5 => Self::PreSummer,
            10 => Self::Autumn,
            _ => Self::Regular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WinterPeak => "winter_peak",
            Self::SummerPeak => "summer_peak",
            Self::Monsoon => "monsoon",
            Self::Spring => "spring",
            Self::PreSummer => "pre_summer",
            Self::Autumn => "autumn",
            Self::Regular => "regular",
        }
    }
}

/// Multiplier per season
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors {
    pub winter_peak: f64,
    pub summer_peak: f64,
    pub monsoon: f64,
    pub spring: f64,
    pub pre_summer: f64,
    pub autumn: f64,
    pub regular: f64,
}

impl SeasonalFactors {
    /// Factors used by the calibrated smoothing pipeline
    pub const STANDARD: Self = Self {
        winter_peak: 1.2,
        summer_peak: 0.9,
        monsoon: 0.8,
        spring: 1.1,
        pre_summer: 1.05,
        autumn: 1.0,
        regular: 1.0,
    };

    /// Wider swings used by the ensemble back-test pipeline
    pub const AMPLIFIED: Self = Self {
        winter_peak: 1.25,
        summer_peak: 0.85,
        monsoon: 0.75,
        spring: 1.15,
        pre_summer: 1.1,
        autumn: 1.05,
        regular: 1.0,
    };

    pub fn factor(&self, season: Season) -> f64 {
        match season {
            Season::WinterPeak => self.winter_peak,
            Season::SummerPeak => self.summer_peak,
            Season::Monsoon => self.monsoon,
            Season::Spring => self.spring,
            Season::PreSummer => self.pre_summer,
            Season::Autumn => self.autumn,
            Season::Regular => self.regular,
        }
    }
}

impl Default for SeasonalFactors {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// How the seasonal multiplier is applied to a raw model value
///
/// Both readings exist in production pipelines and the intended one has not
/// been settled, so each is selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalMode {
    /// De-normalize: `raw / factor`, applied before calibration
    #[default]
    Divide,
    /// Direct adjustment: `raw * factor`
    Multiply,
}

impl SeasonalMode {
    pub fn apply(&self, raw: f64, factor: f64) -> f64 {
        match self {
            Self::Divide if factor.abs() > f64::EPSILON => raw / factor,
            Self::Divide => raw,
            Self::Multiply => raw * factor,
        }
    }
}

/// Month → season → multiplier lookup
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonalProfile {
    pub factors: SeasonalFactors,
    pub mode: SeasonalMode,
}

impl SeasonalProfile {
    pub fn new(factors: SeasonalFactors, mode: SeasonalMode) -> Self {
        Self { factors, mode }
    }

    /// Season tag and multiplier for a calendar month
    pub fn resolve(&self, month: u32) -> (Season, f64) {
        let season = Season::of_month(month);
        (season, self.factors.factor(season))
    }

    /// Apply the seasonal adjustment for `month` to a raw value
    pub fn adjust(&self, raw: f64, month: u32) -> f64 {
        let (_, factor) = self.resolve(month);
        self.mode.apply(raw, factor)
    }
}

/// Per-location factors converting a 0-100 interest signal into visitors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingTable {
    flat: HashMap<String, u64>,
    /// Per-month overrides keyed by lowercase location name
    monthly: HashMap<String, [u64; 12]>,
    default_factor: u64,
}

impl ScalingTable {
    pub fn new(default_factor: u64) -> Self {
        Self {
            flat: HashMap::new(),
            monthly: HashMap::new(),
            default_factor,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>, factor: u64) -> Self {
        self.flat.insert(location.into(), factor);
        self
    }

    /// Register a January..December table that overrides the flat factor
    pub fn with_monthly(mut self, location: &str, factors: [u64; 12]) -> Self {
        self.monthly.insert(location.to_lowercase(), factors);
        self
    }

    /// Built-in table for Indian destinations
    pub fn builtin() -> &'static ScalingTable {
        static TABLE: OnceLock<ScalingTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let flat = [
                ("Taj Mahal", 145_000),
                ("Red Fort", 50_000),
                ("Jaipur", 70_000),
                ("Varanasi", 80_000),
                ("Goa", 60_000),
                ("Kerala", 75_000),
                ("Munnar", 45_000),
                ("Hyderabad", 90_000),
                ("Coorg", 40_000),
                ("Golden Temple", 100_000),
                ("Maha Kumbh", 3_000_000),
                ("Manali", 85_000),
                ("Shimla", 90_000),
                ("Darjeeling", 75_000),
                ("Ooty", 70_000),
                ("Leh-Ladakh", 60_000),
                ("Nainital", 80_000),
                ("Gulmarg", 50_000),
                ("Hampi", 55_000),
                ("Ajanta & Ellora Caves", 70_000),
                ("Khajuraho", 50_000),
                ("Jaisalmer", 60_000),
                ("Amer Fort", 75_000),
                ("Mysore Palace", 80_000),
                ("Konark Sun Temple", 65_000),
                ("Rameswaram", 85_000),
                ("Vaishno Devi", 100_000),
                ("Tirupati", 150_000),
                ("Somnath Temple", 70_000),
                ("Dwarka", 60_000),
                ("Puri Jagannath Temple", 120_000),
                ("Ujjain Mahakaleshwar Temple", 95_000),
                ("Andaman & Nicobar Islands", 50_000),
                ("Lakshadweep", 30_000),
                ("Gokarna", 45_000),
                ("Pondicherry", 60_000),
            ];

            flat.into_iter()
                .fold(ScalingTable::new(DEFAULT_SCALING_FACTOR), |table, (name, factor)| {
                    table.with_location(name, factor)
                })
                .with_monthly(
                    "Hampi",
                    [
                        65_000, 50_000, 31_000, 36_600, 30_600, 24_600, 30_600, 43_000, 57_000,
                        76_000, 91_000, 98_000,
                    ],
                )
        })
    }

    /// Scaling factor for a location in a calendar month (1-12)
    pub fn factor(&self, location: &str, month: u32) -> u64 {
        let monthly = self
            .monthly
            .get(&location.to_lowercase())
            .and_then(|table| table.get(month.checked_sub(1)? as usize).copied());

        monthly
            .or_else(|| self.flat.get(location).copied())
            .unwrap_or(self.default_factor)
    }

    /// Whether the location has its own entry
    pub fn contains(&self, location: &str) -> bool {
        self.flat.contains_key(location) || self.monthly.contains_key(&location.to_lowercase())
    }

    pub fn default_factor(&self) -> u64 {
        self.default_factor
    }
}

impl Default for ScalingTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Location that only draws visitors in recurring event years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MegaEventRule {
    pub location: String,
    pub years: Vec<i32>,
}

impl MegaEventRule {
    pub fn new(location: impl Into<String>, years: Vec<i32>) -> Self {
        Self {
            location: location.into(),
            years,
        }
    }

    /// The Kumbh Mela, held every twelve years
    pub fn maha_kumbh() -> Self {
        Self::new("Maha Kumbh", vec![2001, 2013, 2025, 2037, 2049])
    }

    /// Whether forecasts for `location` in `year` must be forced to zero
    pub fn suppresses(&self, location: &str, year: i32) -> bool {
        location == self.location && !self.years.contains(&year)
    }
}

impl Default for MegaEventRule {
    fn default() -> Self {
        Self::maha_kumbh()
    }
}
