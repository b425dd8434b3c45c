use std::path::PathBuf;

use chrono::NaiveDate;

use crate::color::ColorMap;
use crate::data::aggregate::{summarize, Summary};
use crate::data::filter::{filter, FilterSelection};
use crate::data::loader::DatasetSource;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug)]
pub struct AppState {
    /// Memoized dataset; replaced wholesale when another file is opened.
    pub source: DatasetSource,

    /// Current stations and date interval, `None` while no data is loaded.
    pub selection: Option<FilterSelection>,

    /// Views derived from the current selection.
    pub summary: Summary,

    /// Station colours for the comparison chart.
    pub station_colors: ColorMap,
}

impl AppState {
    pub fn new(data_paths: Vec<PathBuf>) -> Self {
        let mut state = Self {
            source: DatasetSource::new(data_paths),
            selection: None,
            summary: Summary::default(),
            station_colors: ColorMap::default(),
        };
        state.reset_selection();
        state
    }

    /// Swap to a different CSV file and start over with default filters.
    pub fn open(&mut self, path: PathBuf) {
        self.source = DatasetSource::from_path(path);
        self.reset_selection();
    }

    /// Initial selection for the current dataset, then recompute.
    pub fn reset_selection(&mut self) {
        match self.source.get() {
            Some(ds) => {
                self.station_colors = ColorMap::new(ds.stations());
                self.selection = FilterSelection::initial(ds);
            }
            None => {
                self.station_colors = ColorMap::default();
                self.selection = None;
            }
        }
        self.refresh();
    }

    /// Recompute every view from scratch for the current selection.
    pub fn refresh(&mut self) {
        self.summary = match (self.source.get(), &self.selection) {
            (Some(ds), Some(sel)) => {
                let filtered = filter(ds, sel);
                log::debug!(
                    "Selection {:?} kept {} of {} readings",
                    sel.stations,
                    filtered.len(),
                    ds.len()
                );
                summarize(&filtered)
            }
            _ => Summary::default(),
        };
    }

    /// Replace the date interval, clamped to the dataset's bounds.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let bounds = self.source.get().and_then(|ds| ds.date_bounds());
        if let (Some((lo, hi)), Some(sel)) = (bounds, &mut self.selection) {
            sel.start = start.clamp(lo, hi);
            sel.end = end.clamp(lo, hi);
            self.refresh();
        }
    }

    /// Add or remove one station from the selection.
    pub fn toggle_station(&mut self, station: &str) {
        if let Some(sel) = &mut self.selection {
            if !sel.stations.remove(station) {
                sel.stations.insert(station.to_string());
            }
            self.refresh();
        }
    }

    /// Select every station in the dataset.
    pub fn select_all(&mut self) {
        if let (Some(ds), Some(sel)) = (self.source.get(), &mut self.selection) {
            sel.stations = ds.stations().iter().cloned().collect();
            self.refresh();
        }
    }

    /// Clear the station selection, which shows all stations.
    pub fn select_none(&mut self) {
        if let Some(sel) = &mut self.selection {
            sel.stations.clear();
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(body: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main_data.csv");
        std::fs::write(&path, body).unwrap();
        let state = AppState::new(vec![path]);
        (dir, state)
    }

    const DATA: &str = "date,station,PM2.5,PM10,SO2,NO2\n\
                        2013-03-01,A,40,80,1,1\n\
                        2013-03-01,B,120,100,1,1\n\
                        2013-03-02,A,60,40,1,1\n";

    #[test]
    fn test_initial_state_selects_first_station() {
        let (_dir, state) = state_with(DATA);
        let sel = state.selection.as_ref().unwrap();
        assert_eq!(sel.stations.iter().collect::<Vec<_>>(), ["A"]);
        assert_eq!(state.summary.rows, 2);
        assert_eq!(state.summary.avg_pm25, Some(50.0));
    }

    #[test]
    fn test_toggle_and_clear_recompute_summary() {
        let (_dir, mut state) = state_with(DATA);

        state.toggle_station("B");
        assert_eq!(state.summary.rows, 3);

        state.toggle_station("A");
        assert_eq!(state.summary.rows, 1);
        assert_eq!(state.summary.avg_pm10, Some(100.0));

        state.select_none();
        assert_eq!(state.summary.rows, 3);

        state.select_all();
        assert_eq!(state.selection.as_ref().unwrap().stations.len(), 2);
        assert_eq!(state.summary.rows, 3);
    }

    #[test]
    fn test_date_range_is_clamped_and_recomputed() {
        let (_dir, mut state) = state_with(DATA);
        let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

        state.set_date_range(day("2013-03-02"), day("2013-03-02"));
        assert_eq!(state.summary.rows, 1);
        assert_eq!(state.summary.avg_pm25, Some(60.0));

        state.set_date_range(day("2000-01-01"), day("2030-01-01"));
        let sel = state.selection.as_ref().unwrap();
        assert_eq!((sel.start, sel.end), (day("2013-03-01"), day("2013-03-02")));
        assert_eq!(state.summary.rows, 2);
    }

    #[test]
    fn test_inverted_range_empties_summary() {
        let (_dir, mut state) = state_with(DATA);
        let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();

        state.set_date_range(day("2013-03-02"), day("2013-03-01"));
        assert_eq!(state.summary.rows, 0);
        assert_eq!(state.summary.avg_pm25, None);
    }

    #[test]
    fn test_absent_dataset_leaves_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(vec![dir.path().join("missing.csv")]);
        assert!(state.selection.is_none());
        assert_eq!(state.summary, Summary::default());
        assert!(state.source.error().is_some());
    }

    #[test]
    fn test_open_replaces_source() {
        let (dir, mut state) = state_with(DATA);
        let other = dir.path().join("other.csv");
        std::fs::write(&other, "date,station,PM2.5,PM10,SO2,NO2\n2015-01-01,Z,200,1,1,1\n").unwrap();

        state.open(other);
        assert_eq!(state.source.get().unwrap().stations(), ["Z"]);
        assert_eq!(state.summary.avg_pm25, Some(200.0));
    }
}
