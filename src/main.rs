mod analytics;
mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::BankInsightsApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard configuration")?;
    let data_path = config.data_path.clone();

    let mut state = AppState::new(config);
    if let Err(e) = state.load(&data_path) {
        log::error!("Failed to load {}: {e:#}", data_path.display());
        return Err(e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bank Insights – Customer Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BankInsightsApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
