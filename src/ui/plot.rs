use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::{category_color, pollutant_color, TREND_COLOR};
use crate::data::aggregate::{CategoryCount, DailyMean, StationMean, Summary};
use crate::data::model::{Category, Pollutant};
use crate::state::AppState;

const MISSING_DATA_MESSAGE: &str =
    "Data not found. Please run the data generation script or ensure 'main_data.csv' is available.";

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render metrics and charts for the current summary.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    if let Some(err) = state.source.error() {
        ui.label(RichText::new(MISSING_DATA_MESSAGE).color(Color32::RED).strong());
        ui.weak(err.to_string());
        return;
    }
    let summary = &state.summary;
    let stations_selected = state
        .selection
        .as_ref()
        .is_some_and(|sel| !sel.stations.is_empty());

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metrics(ui, summary);
            ui.separator();

            ui.heading("Daily PM2.5 Levels Trend");
            daily_trend_plot(ui, &summary.daily_trend);
            ui.separator();

            ui.heading("Average Pollutant Levels by Station");
            if stations_selected {
                station_plot(ui, &summary.station_comparison);
            } else {
                ui.label("Select stations to compare.");
            }
            ui.separator();

            ui.heading("Air Quality Categories");
            category_section(ui, &summary.category_distribution);
        });
}

fn metrics(ui: &mut Ui, summary: &Summary) {
    ui.columns(2, |cols| {
        for (col, (label, value)) in cols
            .iter_mut()
            .zip([("Avg PM2.5", summary.avg_pm25), ("Avg PM10", summary.avg_pm10)])
        {
            col.label(label);
            col.label(RichText::new(format_metric(value)).size(28.0).strong());
        }
    });
}

/// Two decimals, or a dash when the mean is undefined.
pub fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "–".to_string(), |v| format!("{v:.2}"))
}

fn day_to_x(day: NaiveDate) -> f64 {
    day.num_days_from_ce() as f64
}

fn x_to_day(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Split the trend into runs of consecutive days with a defined mean, so the
/// line breaks across missing days instead of bridging them.
pub fn trend_segments(trend: &[DailyMean]) -> Vec<Vec<[f64; 2]>> {
    let mut segments: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut prev: Option<NaiveDate> = None;
    for d in trend {
        let Some(mean) = d.mean_pm25 else {
            prev = None;
            continue;
        };
        let adjacent = prev.and_then(|p| p.succ_opt()) == Some(d.day);
        match segments.last_mut() {
            Some(seg) if adjacent => seg.push([day_to_x(d.day), mean]),
            _ => segments.push(vec![[day_to_x(d.day), mean]]),
        }
        prev = Some(d.day);
    }
    segments
}

fn daily_trend_plot(ui: &mut Ui, trend: &[DailyMean]) {
    let segments = trend_segments(trend);

    Plot::new("daily_trend")
        .height(280.0)
        .y_axis_label("PM2.5 Concentration")
        .x_axis_formatter(|mark, _range| x_to_day(mark.value).map(|d| d.to_string()).unwrap_or_default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for segment in segments {
                let points: PlotPoints = segment.into_iter().collect();
                plot_ui.line(Line::new(points).name("PM2.5").color(TREND_COLOR).width(2.0));
            }
        });
}

fn station_plot(ui: &mut Ui, rows: &[StationMean]) {
    let mut stations: Vec<String> = rows.iter().map(|r| r.station.clone()).collect();
    stations.dedup();

    let bar_width = 0.8 / Pollutant::ALL.len() as f64;
    let charts: Vec<BarChart> = Pollutant::ALL
        .into_iter()
        .enumerate()
        .map(|(slot, pollutant)| {
            let offset = (slot as f64 - (Pollutant::ALL.len() as f64 - 1.0) / 2.0) * bar_width;
            let bars = rows
                .iter()
                .filter(|r| r.pollutant == pollutant)
                .filter_map(|r| {
                    let idx = stations.iter().position(|s| *s == r.station)?;
                    Some(
                        Bar::new(idx as f64 + offset, r.mean?)
                            .width(bar_width)
                            .name(&r.station),
                    )
                })
                .collect();
            BarChart::new(bars)
                .name(pollutant.to_string())
                .color(pollutant_color(pollutant))
        })
        .collect();

    Plot::new("station_comparison")
        .height(280.0)
        .legend(Legend::default())
        .x_axis_label("Station")
        .y_axis_label("Concentration")
        .x_axis_formatter(move |mark, _range| index_label(&stations, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Label for an integer axis position, blank between categories.
fn index_label(labels: &[String], x: f64) -> String {
    if x < 0.0 || (x - x.round()).abs() > 1e-6 {
        return String::new();
    }
    labels.get(x.round() as usize).cloned().unwrap_or_default()
}

/// Each category's count and percentage of all categorised readings.
pub fn category_shares(counts: &[CategoryCount]) -> Vec<(Category, usize, f64)> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| (c.category, c.count, c.count as f64 * 100.0 / total as f64))
        .collect()
}

fn category_section(ui: &mut Ui, counts: &[CategoryCount]) {
    let shares = category_shares(counts);
    let labels: Vec<String> = shares.iter().map(|(c, _, _)| c.to_string()).collect();

    ui.horizontal_top(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.set_width(ui.available_width() * 0.6);
            let bars = shares
                .iter()
                .enumerate()
                .map(|(i, (c, _, pct))| {
                    Bar::new(i as f64, *pct)
                        .width(0.7)
                        .name(c.label())
                        .fill(category_color(*c))
                })
                .collect();
            Plot::new("category_distribution")
                .height(260.0)
                .y_axis_label("% of readings")
                .x_axis_formatter(move |mark, _range| index_label(&labels, mark.value))
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).name("Distribution"));
                });
            for (c, count, pct) in &shares {
                ui.label(RichText::new(format!("{c}: {count} ({pct:.1}%)")).color(category_color(*c)));
            }
        });

        ui.vertical(|ui: &mut Ui| {
            ui.strong("Categories:");
            ui.label("Good: PM2.5 ≤ 50");
            ui.label("Moderate: 50 < PM2.5 ≤ 100");
            ui.label("Unhealthy for Sensitive Groups: 100 < PM2.5 ≤ 150");
            ui.label("Unhealthy: PM2.5 > 150");
        });
    });
}
