// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod gui;
use anyhow::{anyhow, Context};
use eframe::egui;
use neuroscope::DisplaySettings;
const DEMO_SAMPLE_RATE_HZ: f64 = 20_000.0;
const DEMO_CHANNELS: usize = 8;
// 入口函数: neuroscope [settings.json]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = match std::env::args().nth(1) {
        Some(path) => DisplaySettings::load(&path)
            .with_context(|| format!("loading display settings from {path}"))?,
        None => DisplaySettings::default(),
    };
    log::info!(
        "display: {:?} mode, {} ms span, {} zones",
        settings.window_mode,
        settings.span_milliseconds,
        settings.num_refresh_zones
    );
    let app = gui::ScopeApp::new(settings, DEMO_SAMPLE_RATE_HZ, DEMO_CHANNELS)?;
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 800.0])
        .with_min_inner_size([800.0, 500.0])
        .with_title("neuroscope");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native("neuroscope", options, Box::new(move |_cc| Box::new(app)))
        .map_err(|err| anyhow!("viewer exited with an error: {err}"))
}
