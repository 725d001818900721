#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads the tile catalog and replays recorded input
//! against a headless grid world.

mod ledger;
mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gaius_catalog::Catalog;
use gaius_system_builder::Builder;
use gaius_system_camera::CameraRig;
use gaius_system_profiler::{CallLogLayer, OverlayContext, Profiler};
use gaius_world::{self as world, query, GridCell, PointerMissPolicy, World, WorldConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::ledger::VisualLedger;

const OVERLAY_TEMPLATE: &str = "fps={fps} ({fpsColor}) frame={frameTime} hovered={gridHovered} \
     selected={gridSelected} hit={raycastHit} camera={camera}";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Gaius grid placement runner")]
struct Cli {
    /// Directory holding one JSON tile meta per file
    #[arg(long, default_value = "Data/Props")]
    props: PathBuf,

    /// Number of grid columns
    #[arg(long, default_value_t = WorldConfig::default().width)]
    width: u32,

    /// Number of grid rows
    #[arg(long, default_value_t = WorldConfig::default().height)]
    height: u32,

    /// Clear the hovered cell when the pointer leaves the grid
    #[arg(long)]
    clear_hover_on_miss: bool,

    /// JSON array of input frames to replay
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    log_format: LogFormat,
}

impl Cli {
    fn world_config(&self) -> WorldConfig {
        let policy = if self.clear_hover_on_miss {
            PointerMissPolicy::ClearHover
        } else {
            PointerMissPolicy::RetainHover
        };
        WorldConfig::new(self.width, self.height).with_pointer_miss(policy)
    }
}

fn init_tracing(format: LogFormat) -> CallLogLayer {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .with_current_span(true)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
    };

    let call_log = CallLogLayer::new();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(call_log.clone())
        .init();
    call_log
}

/// Entry point for the Gaius command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let call_log = init_tracing(cli.log_format);

    let mut catalog = Catalog::new();
    let discovered = catalog
        .discover(&cli.props)
        .with_context(|| format!("failed to load tile metas from {}", cli.props.display()))?;

    let frames = match &cli.script {
        Some(path) => script::load(path)?,
        None => Vec::new(),
    };

    let mut world = World::new(cli.world_config());
    let mut builder = Builder::default();
    let mut camera = CameraRig::default();
    let mut profiler = Profiler::new();
    let mut ledger = VisualLedger::default();

    let mut commands = Vec::new();
    let mut events = Vec::new();
    for (index, frame) in frames.iter().enumerate() {
        events.clear();

        if frame.toggles_overlay() {
            let enabled = profiler.toggle();
            info!(frame = index, enabled, "debug overlay toggled");
        }
        if let Err(error) = builder.handle(frame.builder_input(), &catalog, &mut commands) {
            warn!(frame = index, %error, "hotkey could not be resolved");
        }
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        ledger.observe(&events);

        camera.update(&frame.camera_input(), frame.seconds());
        profiler.record_frame(frame.seconds());
    }

    let context = OverlayContext {
        grid_selected: query::describe(&world, query::selected_cell(&world)),
        grid_hovered: query::describe(&world, query::hovered_cell(&world)),
        camera: camera.describe(),
        raycast_hit: query::raycast_hit(&world)
            .and_then(|hit| query::cell(&world, hit))
            .map_or_else(|| "<none>".to_owned(), GridCell::name),
    };

    info!(
        tile_metas = discovered,
        frames = frames.len(),
        visuals = ledger.len(),
        buildings = ledger.solid_count(),
        "replay finished"
    );
    for (visual, entry) in ledger.iter() {
        info!(
            visual = visual.get(),
            meta_id = %entry.meta_id,
            appearance = ?entry.appearance,
            anchor = ?entry.anchor,
            "visual"
        );
    }

    let Some(overlay) = profiler.overlay(OVERLAY_TEMPLATE, &context) else {
        return Ok(());
    };
    println!("{overlay}");
    println!(
        "{}",
        serde_json::to_string(&profiler.summary()).context("failed to encode profiler summary")?
    );
    let calls = call_log.snapshot();
    print!("{}{}", calls.format_stack(), calls.format_log());
    Ok(())
}
