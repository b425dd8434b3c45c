use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: station multi-select and date range.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, title: &str) {
    ui.heading(title);
    ui.separator();

    let Some(dataset) = state.source.get() else {
        ui.label("No dataset loaded.");
        return;
    };
    if dataset.is_empty() {
        ui.label("Dataset has no readings.");
        return;
    }
    let stations = dataset.stations().to_vec();
    let Some((mut start, mut end)) = state.selection.as_ref().map(|sel| (sel.start, sel.end)) else {
        return;
    };

    ui.strong("Time Range");
    let mut dates_changed = false;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        dates_changed |= ui
            .add(DatePickerButton::new(&mut start).id_salt("start_date"))
            .changed();
        ui.end_row();
        ui.label("To");
        dates_changed |= ui
            .add(DatePickerButton::new(&mut end).id_salt("end_date"))
            .changed();
        ui.end_row();
    });
    if dates_changed {
        state.set_date_range(start, end);
    }
    if state.selection.as_ref().is_some_and(|sel| sel.start > sel.end) {
        ui.label(RichText::new("Start is after end: nothing matches.").color(Color32::YELLOW));
    }
    ui.separator();

    let n_selected = state.selection.as_ref().map_or(0, |sel| sel.stations.len());
    ui.strong(format!("Select Station  ({n_selected}/{})", stations.len()));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });
    if state.selection.as_ref().is_some_and(|sel| sel.stations.is_empty()) {
        ui.weak("No station selected: showing all.");
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for station in &stations {
                let mut checked = state
                    .selection
                    .as_ref()
                    .is_some_and(|sel| sel.stations.contains(station));
                let text = RichText::new(station).color(state.station_colors.color_for(station));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_station(station);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.source.get() {
            ui.label(format!(
                "{} readings loaded, {} selected",
                ds.len(),
                state.summary.rows
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air quality data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open(path);
    }
}
