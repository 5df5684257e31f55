//! Dino Dash entry point
//!
//! Headless native driver: runs autopilot games against a synthetic 60 Hz
//! frame clock, forwards cues to the audio adapter and records finished runs
//! in the high score table.
//!
//! Usage: `dino-dash [--seed N] [--runs N] [--max-seconds N] [--quality PRESET]`
//!
//! Settings, tuning and high scores are read from the directory named by
//! `DINO_DASH_DATA` when it is set; nothing is persisted otherwise.

use std::path::PathBuf;

use clap::Parser;
use dino_dash::audio::AudioManager;
use dino_dash::sim::{GameEvent, GameState, TickInput, tick};
use dino_dash::{FrameClock, HighScores, QualityPreset, Settings, Tuning};

/// Synthetic display refresh interval
const FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Runs autopilot games of Dino Dash without a window.
#[derive(Debug, Parser)]
#[command(name = "dino-dash", version, about)]
struct Options {
    /// Seed of the first run; later runs use consecutive seeds.
    #[arg(long, value_name = "SEED", default_value_t = 42)]
    seed: u64,
    /// Number of games to play.
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    runs: u32,
    /// Game time after which an unfinished run is stopped.
    #[arg(long = "max-seconds", value_name = "SECONDS", default_value_t = 300.0)]
    max_seconds: f64,
    /// Overrides the quality preset from the settings file.
    #[arg(long, value_name = "PRESET")]
    quality: Option<QualityPreset>,
}

fn load_tuning(data_dir: Option<&PathBuf>) -> Tuning {
    let Some(path) = data_dir.map(|d| d.join("tuning.json")) else {
        return Tuning::default();
    };
    if !path.exists() {
        return Tuning::default();
    }
    match Tuning::load(&path) {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path.display());
            tuning
        }
        Err(e) => {
            log::warn!("Using default tuning: {e}");
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = Options::parse();
    log::info!("Dino Dash (headless) starting...");

    let data_dir = std::env::var_os("DINO_DASH_DATA").map(PathBuf::from);
    let mut settings = match &data_dir {
        Some(dir) => Settings::load_or_default(dir.join("settings.json")),
        None => Settings::default(),
    };
    if let Some(preset) = options.quality {
        log::info!("Quality preset: {}", preset.as_str());
        settings.apply_preset(preset);
    }
    let tuning = load_tuning(data_dir.as_ref());
    let scores_path = data_dir.as_ref().map(|d| d.join("highscores.json"));
    let mut scores = match &scores_path {
        Some(path) => HighScores::load_or_default(path),
        None => HighScores::new(),
    };

    // No output device in headless mode; cues are logged instead
    let mut audio = AudioManager::from_settings(None, &settings);

    for run in 0..options.runs {
        let seed = options.seed.wrapping_add(run as u64);
        let mut state = GameState::with_tuning(seed, tuning.clone());
        settings.apply_to(&mut state);
        state.start_run();

        let mut clock = FrameClock::new();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let max_frames = (options.max_seconds * 1000.0 / FRAME_INTERVAL_MS) as u64;
        let mut summary = None;

        for frame in 0..max_frames {
            let dt = clock.advance(frame as f64 * FRAME_INTERVAL_MS);
            tick(&mut state, &input, dt);

            for event in state.drain_events() {
                match event {
                    GameEvent::Cue(cue) => {
                        log::trace!("cue {cue:?}");
                        audio.play(cue);
                    }
                    GameEvent::Announce(message) => log::debug!("{message}"),
                    GameEvent::RunEnded(ended) => summary = Some(ended),
                }
            }
            if summary.is_some() {
                break;
            }
        }

        let Some(summary) = summary else {
            log::info!(
                "Run {} stopped after {:.0}s: score {} level {}",
                run + 1,
                options.max_seconds,
                state.run.score,
                state.run.level
            );
            continue;
        };

        match scores.record_run(&summary) {
            Some(rank) => log::info!("Run {} placed #{rank} with {}", run + 1, summary.score),
            None => log::info!("Run {} scored {}", run + 1, summary.score),
        }
    }

    log::info!(
        "Best score {} over {} games",
        scores.best_score,
        scores.games_played
    );
    if let Some(path) = &scores_path {
        if let Err(e) = scores.save(path) {
            log::warn!("Could not save high scores: {e}");
        }
    }
}
