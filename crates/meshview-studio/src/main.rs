mod cli;
mod controls;
mod placeholder;
mod source;

use std::path::Path;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use meshview_engine::config::ViewerConfig;
use meshview_engine::device::GpuInit;
use meshview_engine::logging::{init_logging, LoggingConfig};
use meshview_engine::window::{Runtime, RuntimeConfig};
use meshview_engine::{Viewer, ViewerApp};

use crate::controls::KeyboardControls;

fn main() -> Result<()> {
    let args = cli::parse();

    init_logging(match args.log.as_deref() {
        Some(filter) => LoggingConfig::with_filter(filter),
        None => LoggingConfig::default(),
    });

    let config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => ViewerConfig::default(),
    };

    // The real size arrives with the first resize; targets follow it.
    let mut viewer = Viewer::with_config(args.width, args.height, &config);

    source::show(&mut viewer, args.mesh.as_deref());

    let mesh = viewer.scene().mesh().geometry().buffer();
    log::info!(
        "loaded mesh with {} vertices and {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );

    let runtime = RuntimeConfig {
        initial_size: LogicalSize::new(args.width as f64, args.height as f64),
        ..RuntimeConfig::default()
    };
    let app = ViewerApp::new(viewer, KeyboardControls::new(config));

    Runtime::run(runtime, GpuInit::default(), app)
}

fn load_config(path: &Path) -> Result<ViewerConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ViewerConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

