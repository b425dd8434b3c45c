use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{Category, Dataset, Pollutant};

// ---------------------------------------------------------------------------
// Output shapes
// ---------------------------------------------------------------------------

/// Mean PM2.5 for one calendar day that has at least one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMean {
    pub day: NaiveDate,
    /// `None` when none of the day's readings has a PM2.5 value.
    pub mean_pm25: Option<f64>,
}

/// One (station, pollutant) cell of the long-format station comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMean {
    pub station: String,
    pub pollutant: Pollutant,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Every derived view the dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub rows: usize,
    pub avg_pm25: Option<f64>,
    pub avg_pm10: Option<f64>,
    pub daily_trend: Vec<DailyMean>,
    pub station_comparison: Vec<StationMean>,
    pub category_distribution: Vec<CategoryCount>,
}

// ---------------------------------------------------------------------------
// Mean accumulator
// ---------------------------------------------------------------------------

/// Collects defined values and averages them in sorted order, so the result
/// is bit-identical however the input rows were ordered.
#[derive(Debug, Default)]
struct Mean {
    values: Vec<f64>,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            self.values.push(v);
        }
    }

    fn finish(mut self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        self.values.sort_by(f64::total_cmp);
        let sum: f64 = self.values.iter().sum();
        Some(sum / self.values.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Mean of one pollutant over the whole dataset; `None` if no value is defined.
pub fn overall_mean(dataset: &Dataset, pollutant: Pollutant) -> Option<f64> {
    let mut mean = Mean::default();
    for r in dataset.readings() {
        mean.push(r.value(pollutant));
    }
    mean.finish()
}

/// Mean PM2.5 per calendar day, ordered by day. Days without readings are
/// absent rather than zero-filled.
pub fn daily_trend(dataset: &Dataset) -> Vec<DailyMean> {
    let mut by_day: BTreeMap<NaiveDate, Mean> = BTreeMap::new();
    for r in dataset.readings() {
        by_day.entry(r.day()).or_default().push(r.pm25);
    }
    by_day
        .into_iter()
        .map(|(day, mean)| DailyMean {
            day,
            mean_pm25: mean.finish(),
        })
        .collect()
}

/// Per-station mean of each pollutant in long format: one row per
/// (station, pollutant), ordered by station then pollutant. Each mean skips
/// only that pollutant's missing values.
pub fn station_comparison(dataset: &Dataset) -> Vec<StationMean> {
    let mut by_station: BTreeMap<&str, [Mean; 4]> = BTreeMap::new();
    for r in dataset.readings() {
        let means = by_station.entry(r.station.as_str()).or_default();
        for (mean, p) in means.iter_mut().zip(Pollutant::ALL) {
            mean.push(r.value(p));
        }
    }

    by_station
        .into_iter()
        .flat_map(|(station, means)| {
            means.into_iter().zip(Pollutant::ALL).map(move |(mean, pollutant)| StationMean {
                station: station.to_string(),
                pollutant,
                mean: mean.finish(),
            })
        })
        .collect()
}

/// Frequency of each category present, most frequent first (ties by
/// category order). Unknown categories are not counted; zero counts are
/// omitted.
pub fn category_distribution(dataset: &Dataset) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for category in dataset.readings().iter().filter_map(|r| r.category) {
        *counts.entry(category).or_default() += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
    out
}

/// Compute every view for an already filtered dataset.
pub fn summarize(dataset: &Dataset) -> Summary {
    Summary {
        rows: dataset.len(),
        avg_pm25: overall_mean(dataset, Pollutant::Pm25),
        avg_pm10: overall_mean(dataset, Pollutant::Pm10),
        daily_trend: daily_trend(dataset),
        station_comparison: station_comparison(dataset),
        category_distribution: category_distribution(dataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::category::classify;
    use crate::data::filter::{filter, FilterSelection};
    use crate::data::model::test_support::{day, reading};
    use crate::data::model::Reading;

    fn classified(readings: Vec<Reading>) -> Dataset {
        let mut ds = Dataset::new(readings, false);
        classify(&mut ds);
        ds
    }

    fn two_station_day() -> Dataset {
        classified(vec![
            reading("2013-03-01", "A", Some(40.0)),
            reading("2013-03-01", "B", Some(120.0)),
        ])
    }

    #[test]
    fn test_single_day_scenario() {
        let ds = two_station_day();
        let sel = FilterSelection::new(Vec::new(), day("2013-03-01"), day("2013-03-01"));
        let summary = summarize(&filter(&ds, &sel));

        assert_eq!(
            summary.daily_trend,
            [DailyMean {
                day: day("2013-03-01"),
                mean_pm25: Some(80.0)
            }]
        );
        assert_eq!(
            summary.category_distribution,
            [
                CategoryCount {
                    category: Category::Good,
                    count: 1
                },
                CategoryCount {
                    category: Category::UnhealthyForSensitiveGroups,
                    count: 1
                },
            ]
        );
        assert_eq!(summary.avg_pm25, Some(80.0));
        assert_eq!(summary.rows, 2);
    }

    #[test]
    fn test_single_station_scenario() {
        let ds = two_station_day();
        let sel = FilterSelection::new(["A".to_string()], day("2013-03-01"), day("2013-03-01"));
        let filtered = filter(&ds, &sel);
        assert_eq!(filtered.len(), 1);

        let comparison = station_comparison(&filtered);
        assert_eq!(comparison.len(), Pollutant::ALL.len());
        assert!(comparison.iter().all(|row| row.station == "A"));
        assert_eq!(comparison[0].pollutant, Pollutant::Pm25);
        assert_eq!(comparison[0].mean, Some(40.0));
        assert_eq!(comparison[1].mean, None);
    }

    #[test]
    fn test_empty_selection_scenario() {
        let ds = two_station_day();
        let sel = FilterSelection::new(Vec::new(), day("2014-01-01"), day("2014-01-31"));
        let summary = summarize(&filter(&ds, &sel));

        assert_eq!(summary.rows, 0);
        assert!(summary.daily_trend.is_empty());
        assert!(summary.station_comparison.is_empty());
        assert!(summary.category_distribution.is_empty());
        assert_eq!(summary.avg_pm25, None);
        assert_eq!(summary.avg_pm10, None);
    }

    #[test]
    fn test_daily_trend_truncates_time_and_skips_gaps() {
        let mut noon = reading("2013-03-01", "A", Some(30.0));
        noon.date = day("2013-03-01").and_hms_opt(12, 0, 0).unwrap();
        let ds = classified(vec![
            reading("2013-03-05", "A", Some(5.0)),
            reading("2013-03-01", "A", Some(10.0)),
            noon,
            reading("2013-03-03", "A", None),
        ]);

        let trend = daily_trend(&ds);
        let days: Vec<_> = trend.iter().map(|d| d.day).collect();
        assert_eq!(days, [day("2013-03-01"), day("2013-03-03"), day("2013-03-05")]);
        assert_eq!(trend[0].mean_pm25, Some(20.0));
        assert_eq!(trend[1].mean_pm25, None);
    }

    #[test]
    fn test_station_means_ignore_missing_per_pollutant() {
        let mut a1 = reading("2013-03-01", "A", Some(10.0));
        a1.so2 = Some(4.0);
        let mut a2 = reading("2013-03-02", "A", None);
        a2.so2 = Some(8.0);
        let ds = classified(vec![a1, a2, reading("2013-03-01", "B", Some(1.0))]);

        let rows = station_comparison(&ds);
        let cell = |station: &str, p: Pollutant| {
            rows.iter()
                .find(|r| r.station == station && r.pollutant == p)
                .and_then(|r| r.mean)
        };
        assert_eq!(cell("A", Pollutant::Pm25), Some(10.0));
        assert_eq!(cell("A", Pollutant::So2), Some(6.0));
        assert_eq!(cell("B", Pollutant::Pm25), Some(1.0));
        assert_eq!(rows[0].station, "A");
        assert_eq!(rows[4].station, "B");
    }

    #[test]
    fn test_category_distribution_omits_unknown_and_orders_by_count() {
        let ds = classified(vec![
            reading("2013-03-01", "A", Some(200.0)),
            reading("2013-03-01", "B", Some(10.0)),
            reading("2013-03-02", "A", Some(300.0)),
            reading("2013-03-02", "B", None),
        ]);

        let dist = category_distribution(&ds);
        assert_eq!(
            dist,
            [
                CategoryCount {
                    category: Category::Unhealthy,
                    count: 2
                },
                CategoryCount {
                    category: Category::Good,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_rows_are_both_counted() {
        let ds = classified(vec![
            reading("2013-03-01", "A", Some(10.0)),
            reading("2013-03-01", "A", Some(30.0)),
        ]);
        assert_eq!(overall_mean(&ds, Pollutant::Pm25), Some(20.0));
        assert_eq!(category_distribution(&ds)[0].count, 2);
    }

    #[test]
    fn test_summary_is_independent_of_row_order() {
        let values = [0.1, 0.2, 0.3, 1e16, 7.7, 151.0, 99.9, 50.0];
        let stations = ["A", "B", "C"];
        let rows: Vec<Reading> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut r = reading("2013-03-01", stations[i % 3], Some(v));
                r.pm10 = Some(v * 2.0);
                let d = day("2013-03-01") + chrono::Duration::days((i % 2) as i64);
                r.date = d.and_hms_opt(i as u32, 0, 0).unwrap();
                r
            })
            .collect();

        let forward = summarize(&classified(rows.clone()));
        let mut reversed_rows = rows;
        reversed_rows.reverse();
        let reversed = summarize(&classified(reversed_rows));
        assert_eq!(forward, reversed);
    }
}
