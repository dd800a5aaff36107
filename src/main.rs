// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! EOV-WGS: convert Hungarian EOV grid coordinates and WGS'84 positions and show them on a map.

mod app;
mod config;
mod errors;
mod logic;
mod models;
mod mvu;
mod ui;
mod utils;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by the host; keep running without ours.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = config::AppConfig::load();
    tracing::info!(markers = ?config.markers, zoom = config.map.zoom, "starting EOV-WGS");
    app::run(config)
}
