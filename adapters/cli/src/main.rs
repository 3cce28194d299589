#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Card Defence experience.

mod scene;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use card_defence_core::Event;
use card_defence_rendering::{Color, Presentation, RenderingBackend};
use card_defence_rendering_macroquad::MacroquadBackend;
use card_defence_simulation::{Simulation, SimulationConfig};
use card_defence_world::query;
use clap::{ArgAction, Parser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

/// Command-line arguments accepted by the Card Defence binary.
#[derive(Debug, Parser)]
#[command(name = "card-defence", about = "Drag cards, build towers, defend the base.")]
struct CliArgs {
    /// Seed for every random stream; a fresh one is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,

    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,

    /// Log filter directive, e.g. `debug` or `card_defence_world=trace`.
    #[arg(long)]
    log: Option<String>,

    /// Sprite manifest to load.
    #[arg(long, default_value = "assets/manifest.toml")]
    assets: PathBuf,

    /// Draw placeholder shapes instead of loading sprites.
    #[arg(long)]
    no_sprites: bool,
}

/// Entry point for the Card Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log.as_deref())?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut simulation = Simulation::new(SimulationConfig::with_seed(seed));
    let playfield = query::playfield(simulation.world());
    info!(
        seed,
        width = playfield.width(),
        height = playfield.height(),
        coins = query::economy(simulation.world()).coins,
        "card defence session started"
    );

    let scene =
        scene::initial_scene(simulation.world()).context("failed to build opening scene")?;
    let presentation = Presentation::new("Card Defence", Color::from_rgb_u8(24, 22, 20), scene);
    let sprite_manifest = (!args.no_sprites).then_some(args.assets);
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .with_sprite_manifest(sprite_manifest);

    backend.run(presentation, move |dt, input, scene| {
        let actions = scene::actions_from_input(&input);
        let report = simulation.advance(dt, &actions);
        for event in report.events() {
            match event {
                Event::GameOver { .. } => {
                    let economy = query::economy(simulation.world());
                    info!(score = economy.score, "game over");
                }
                Event::PurchaseRejected { track, reason } => {
                    debug!(?track, %reason, "purchase rejected");
                }
                Event::CardPlayRejected { card, reason } => {
                    debug!(card = card.get(), %reason, "card play rejected");
                }
                _ => {}
            }
        }
        scene::populate(scene, simulation.world());
    })
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}
