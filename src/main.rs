use eframe::egui;
use std::path::PathBuf;
use tracing::{error, info};

use image_labeler::categories::CategoryStore;
use image_labeler::config::AppConfig;
use image_labeler::LabelerApp;

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,image_labeler=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .init();
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> eframe::Result<()> {
    setup_logging();

    let config = AppConfig::load();

    let image_list = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) if !path.exists() => {
            error!("File not found: {}", path.display());
            std::process::exit(1);
        }
        Some(path) => Some(path),
        // Reopen the previous list when it is still around.
        None => config.last_image_list.clone().filter(|p| p.exists()),
    };
    let categories = match image_labeler::paths::categories_file() {
        Some(file) => CategoryStore::open(file),
        None => {
            info!("No data directory; categories will not be saved");
            CategoryStore::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("Image Labeler"),
        ..Default::default()
    };

    eframe::run_native(
        "Image Labeler",
        options,
        Box::new(move |_cc| Ok(Box::new(LabelerApp::new(config, categories, image_list)))),
    )
}
