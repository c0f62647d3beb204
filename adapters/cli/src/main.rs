#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Vector Race on a text track.

mod config;
mod report;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use vector_race_core::{InertiaPolicy, Track, WELCOME_BANNER};
use vector_race_rendering::{RenderingBackend, Scene, TextBackend};
use vector_race_system_inertia::DefaultInertia;
use vector_race_system_race::{PlayerStatus, Race};
use vector_race_track::GridTrack;

use crate::config::{PlayerEntry, RaceFile, RaceSettings};
use crate::report::RaceReport;

/// Command-line options for a single race.
#[derive(Debug, Parser)]
#[command(
    name = "vector-race",
    version,
    about = "Race bots and humans across a grid track"
)]
struct Cli {
    /// Track file: `S` start, `F` finish, `#` obstacle, anything else free.
    track: PathBuf,

    /// Race configuration file (toml) with `max_turns`, `seed` and `[[players]]`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop the race after this many turns.
    #[arg(long)]
    max_turns: Option<u32>,

    /// Seed from which every bot's generator is derived.
    #[arg(long)]
    seed: Option<u64>,

    /// Roster entry as NAME=KIND; repeat to add players.
    #[arg(long = "player", value_name = "NAME=KIND", value_parser = config::parse_player)]
    players: Vec<PlayerEntry>,

    /// Skip the per-turn board snapshots.
    #[arg(long)]
    quiet: bool,

    /// Print the final report as JSON instead of a summary line.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Vector Race command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => RaceFile::load(path)?,
        None => RaceFile::default(),
    };
    let settings = RaceSettings::resolve(file, cli.max_turns, cli.seed, cli.players);
    let track = GridTrack::load(&cli.track)
        .with_context(|| format!("failed to load track {}", cli.track.display()))?;

    let mut race = Race::new(track, DefaultInertia, settings.max_turns)
        .context("failed to set up the race")?;
    for (index, entry) in settings.roster.iter().enumerate() {
        let strategy = entry.kind.build(settings.player_seed(index));
        let _ = race
            .register(entry.name.as_str(), strategy)
            .with_context(|| format!("failed to register {}", entry.name))?;
    }
    info!(
        players = settings.roster.len(),
        max_turns = settings.max_turns,
        seed = settings.seed,
        "race ready"
    );

    let render = !(cli.quiet || cli.json);
    let mut backend = TextBackend::new(io::stdout());
    if render {
        println!("{WELCOME_BANNER}");
        backend.present(&snapshot(&race))?;
    }

    let mut failure = None;
    let _ = race.run_with(|race, _events| {
        if render && failure.is_none() {
            failure = backend.present(&snapshot(race)).err();
        }
    });
    if let Some(error) = failure {
        return Err(error);
    }

    let report = RaceReport::capture(&race);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.headline());
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

/// Board snapshot showing every player still on the grid.
fn snapshot<T: Track, I: InertiaPolicy>(race: &Race<T, I>) -> Scene {
    let mut scene = Scene::from_track(race.turn(), race.board().track());
    for (player, status) in race.players() {
        if matches!(status, PlayerStatus::Eliminated { .. }) {
            continue;
        }
        scene.push_player(
            player.name(),
            player.position(),
            player.velocity(),
            race.heading(player.id()),
        );
    }
    scene
}
