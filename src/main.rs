//! Wall Jumper headless runner
//!
//! Plays autopilot runs at a fixed 60 Hz and merges the results into a
//! profile, the way a host app would after each game over.
//!
//! Usage: `wall-jumper [seed] [runs]`. Set `WALL_JUMPER_TUNING` to a JSON
//! file to override tuning values.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::time::{SystemTime, UNIX_EPOCH};

    use wall_jumper::Tuning;
    use wall_jumper::consts::MAX_DT;
    use wall_jumper::persistence::{MemoryStore, ProfileStore};
    use wall_jumper::sim::{Autopilot, GameEvent, GamePhase, GameWorld};

    /// Give up on a run that has not ended after this many frames (10 minutes)
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    const USER_ID: &str = "local";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0),
    };
    let runs = match args.next() {
        Some(s) => s.parse::<u32>()?,
        None => 3,
    };

    let tuning = match std::env::var("WALL_JUMPER_TUNING") {
        Ok(path) => {
            log::info!("Loading tuning from {path}");
            Tuning::from_json(&std::fs::read_to_string(&path)?)?
        }
        Err(_) => Tuning::default(),
    };
    tuning.validate()?;

    log::info!("Wall Jumper (headless) seed={seed} runs={runs}");

    let mut store = MemoryStore::new();
    let mut world = GameWorld::new(tuning, seed);

    for run in 1..=runs {
        let profile = store.fetch(USER_ID)?;
        world.init_run();
        let frames = Autopilot::new().play_run(&mut world, profile.high_score, MAX_FRAMES);
        if world.phase == GamePhase::Playing {
            log::warn!("Run {run} still alive after {frames} frames, stopping it");
        }

        for event in world.drain_events() {
            match event {
                GameEvent::NewHighScore { value } if profile.qualifies(value) => {
                    log::info!("Run {run}: new high score {value:.0}");
                }
                GameEvent::RunEnded(report) => {
                    let profile = store.record_run(USER_ID, &report)?;
                    log::info!(
                        "Run {run}: height {:.0}, {} coins ({:.1}s)",
                        report.best_height,
                        report.coins,
                        frames as f32 * MAX_DT
                    );
                    log::debug!("Profile now {profile:?}");
                }
                other => log::debug!("{other:?}"),
            }
        }
    }

    let profile = store.fetch(USER_ID)?;
    log::info!(
        "Done: high score {}, {} coins total",
        profile.display_high_score(),
        profile.total_coins
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
