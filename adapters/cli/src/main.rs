#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Geomart formation.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use geomart_core::{FormationConfig, WINDOW_TITLE};
use geomart_rendering::{Color, Presentation, RenderingBackend};
use geomart_rendering_macroquad::MacroquadBackend;
use geomart_system_bootstrap::Bootstrap;
use tracing::{info, Level};

use self::simulation::Simulation;

/// Frame-rate ceiling applied when none is requested.
const DEFAULT_FRAME_LIMIT: u32 = 30;

/// Animated zig-zag formation of circles.
#[derive(Debug, Parser)]
#[command(name = "geomart", version, about)]
struct CliArgs {
    /// TOML file overriding the formation constants.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Maximum frames presented per second; 0 removes the cap.
    #[arg(long, value_name = "FPS", default_value_t = DEFAULT_FRAME_LIMIT)]
    frame_limit: u32,
    /// Whether presentation waits for the display's vertical sync.
    #[arg(long, value_enum, default_value_t = SyncMode::Off)]
    vsync: SyncMode,
    /// Log frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,
    /// Most verbose log level emitted.
    #[arg(long, value_name = "LEVEL", default_value_t = Level::INFO)]
    log_level: Level,
}

/// Vertical sync preference forwarded to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SyncMode {
    /// Synchronise presentation with the display refresh rate.
    On,
    /// Present frames as soon as they are ready.
    Off,
}

/// Entry point for the Geomart command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let formation = match &args.config {
        Some(path) => config::load(path)?,
        None => FormationConfig::default(),
    };

    let mut simulation = Simulation::new(formation)?;
    let bootstrap = Bootstrap;
    info!(
        shapes = bootstrap.shapes(simulation.world()).len(),
        window_width = formation.window_width,
        window_height = formation.window_height,
        speed_px_per_ms = formation.speed_per_millisecond(),
        "{}",
        bootstrap.welcome_banner(simulation.world())
    );

    let window = bootstrap.formation(simulation.world());
    let presentation = Presentation::new(
        WINDOW_TITLE,
        (window.window_width, window.window_height),
        Color::BLACK,
        simulation.scene()?,
    );

    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync == SyncMode::On)
        .with_show_fps(args.show_fps)
        .with_frame_limit(Some(args.frame_limit));

    backend.run(presentation, move |dt, scene| {
        simulation.advance(dt);
        simulation.populate_scene(scene);
    })
}
