use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analytics::pages::Page;
use crate::data::filter::Selection;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left navigation / filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();

    let mut page = state.session.page;
    for p in Page::ALL {
        ui.radio_value(&mut page, p, p.title());
    }
    state.set_page(page);

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let columns = state.config.filter_columns.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let current = state
                    .session
                    .filters
                    .get(col)
                    .cloned()
                    .unwrap_or_default();
                let choices = state.filter_choices(col);

                ui.strong(col.replace('_', " "));
                let mut picked = None;
                egui::ComboBox::from_id_salt(col)
                    .selected_text(current.to_string())
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        for choice in &choices {
                            let selected = current.to_string() == *choice;
                            if ui.selectable_label(selected, choice.as_str()).clicked() && !selected {
                                picked = Some(Selection::from_label(choice));
                            }
                        }
                    });
                if let Some(selection) = picked {
                    state.set_filter(col, selection);
                }
                ui.add_space(6.0);
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
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                reload(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_records()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open customer data")
        .add_filter("Customer records", &["csv", "json", "parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match state.load(&path) {
            Ok(()) => log::info!("Opened {}", path.display()),
            Err(e) => report_failure(state, "open", &e),
        }
    }
}

fn reload(state: &mut AppState) {
    if let Err(e) = state.reload() {
        report_failure(state, "reload", &e);
    }
}

/// The current dataset stays loaded; the failure goes to the status bar.
fn report_failure(state: &mut AppState, action: &str, e: &anyhow::Error) {
    log::error!("{action} failed: {e:#}");
    state.status_message = Some(format!("Error: {e:#}"));
}
