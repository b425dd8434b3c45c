use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Pollutant – the four concentration columns
// ---------------------------------------------------------------------------

/// A measured pollutant. Variant order is the column order used everywhere a
/// per-pollutant listing is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    So2,
    No2,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [Pollutant::Pm25, Pollutant::Pm10, Pollutant::So2, Pollutant::No2];

    /// Header name of the pollutant's column in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Category – ordinal air-quality label
// ---------------------------------------------------------------------------

/// Air-quality label derived from a PM2.5 reading, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Good,
        Category::Moderate,
        Category::UnhealthyForSensitiveGroups,
        Category::Unhealthy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a pre-labeled category cell holds none of the known labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown air quality category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCategory(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Reading – one row of the CSV
// ---------------------------------------------------------------------------

/// One timestamped measurement row for a station.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub date: NaiveDateTime,
    pub station: String,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub so2: Option<f64>,
    pub no2: Option<f64>,
    /// `None` until classified, or when the category is unknown.
    pub category: Option<Category>,
}

impl Reading {
    pub fn value(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::So2 => self.so2,
            Pollutant::No2 => self.no2,
        }
    }

    /// Calendar day of the reading, dropping any time-of-day component.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the ordered sequence of readings
// ---------------------------------------------------------------------------

/// An ordered collection of readings with a few pre-computed indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    readings: Vec<Reading>,
    /// Distinct station identifiers in order of first appearance.
    stations: Vec<String>,
    date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// Whether the source carried its own category column.
    has_category_column: bool,
}

impl Dataset {
    pub fn new(readings: Vec<Reading>, has_category_column: bool) -> Self {
        let mut seen = HashSet::new();
        let mut stations = Vec::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for r in &readings {
            if seen.insert(r.station.as_str()) {
                stations.push(r.station.clone());
            }
            let day = r.day();
            date_bounds = Some(match date_bounds {
                Some((lo, hi)) => (lo.min(day), hi.max(day)),
                None => (day, day),
            });
        }

        Dataset {
            readings,
            stations,
            date_bounds,
            has_category_column,
        }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub(crate) fn readings_mut(&mut self) -> &mut [Reading] {
        &mut self.readings
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Earliest and latest calendar day present, `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_bounds
    }

    pub fn has_category_column(&self) -> bool {
        self.has_category_column
    }

    pub(crate) fn mark_categorized(&mut self) {
        self.has_category_column = true;
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Midnight reading with only PM2.5 populated.
    pub fn reading(date: &str, station: &str, pm25: Option<f64>) -> Reading {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid test date");
        Reading {
            date: day.and_hms_opt(0, 0, 0).expect("midnight"),
            station: station.to_string(),
            pm25,
            pm10: None,
            so2: None,
            no2: None,
            category: None,
        }
    }

    pub fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid test date")
    }
}
