use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, Reading};

// ---------------------------------------------------------------------------
// Filter selection: which stations and which days
// ---------------------------------------------------------------------------

/// User-chosen stations plus a closed calendar-day interval.
///
/// An empty station set means "no station filter" (show all), never
/// "nothing matches".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub stations: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FilterSelection {
    pub fn new(stations: impl IntoIterator<Item = String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            stations: stations.into_iter().collect(),
            start,
            end,
        }
    }

    /// Default selection for a freshly loaded dataset: its first station and
    /// the full date range. `None` when the dataset is empty.
    pub fn initial(dataset: &Dataset) -> Option<Self> {
        let (start, end) = dataset.date_bounds()?;
        Some(Self::new(dataset.stations().first().cloned(), start, end))
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        let day = reading.day();
        day >= self.start
            && day <= self.end
            && (self.stations.is_empty() || self.stations.contains(&reading.station))
    }
}

/// Return a new dataset holding only the readings that pass `selection`.
///
/// The source dataset is never modified. Readings are compared by calendar
/// day, so any reading on `end` is retained. An inverted interval
/// (`start > end`) matches nothing.
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    let readings: Vec<Reading> = dataset
        .readings()
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();
    Dataset::new(readings, dataset.has_category_column())
}
