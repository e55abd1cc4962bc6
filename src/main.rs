//! Headless driver: load a slot, catch up offline time, simulate a stretch of
//! frames and save.

use std::path::PathBuf;

use anyhow::Result;
use idle_economy::{
    Clock, EngineConfig, FileStorage, GameSession, ManualClock, ManualScheduler, Resource, Rules,
    SaveSystem, SystemClock, load_config_from_path,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_MS: f64 = 1_000.0 / 60.0;

struct Args {
    save_dir: PathBuf,
    slot: usize,
    seconds: f64,
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args {
        save_dir: PathBuf::from("saves"),
        slot: 0,
        seconds: 10.0,
        config: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--save-dir" => {
                if let Some(dir) = it.next() {
                    args.save_dir = PathBuf::from(dir);
                }
            }
            "--slot" => args.slot = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.slot),
            "--seconds" => {
                args.seconds = it
                    .next()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(args.seconds)
            }
            "--config" => args.config = it.next().map(PathBuf::from),
            _ => {}
        }
    }
    args
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => EngineConfig::default(),
    };
    let rules = Rules::new(config)?;
    info!(slot = args.slot, seconds = args.seconds, dir = %args.save_dir.display(), "starting session");

    let clock = ManualClock::new(SystemClock.now_ms());
    let saves = SaveSystem::new(FileStorage::new(&args.save_dir), &rules.config);
    let mut session = GameSession::open(
        rules,
        saves,
        ManualScheduler::default(),
        args.slot,
        clock.now_ms() as i64,
    )?;

    if let Some(result) = session.resume_offline(clock.now_ms() as i64)
        && result.should_show_modal
    {
        println!(
            "Offline for {:.0}s{}: +{} credits",
            result.elapsed_seconds,
            if result.was_capped { " (capped)" } else { "" },
            result.earnings.get(Resource::Credits).format_human(2)
        );
        session.confirm_offline();
    }

    session.start();
    let frames = (args.seconds.max(0.0) * 60.0).round() as u64;
    for _ in 0..=frames {
        let Some(handle) = session.scheduler_mut().pop_due() else {
            break;
        };
        session.on_frame(handle, clock.now_ms());
        clock.advance(FRAME_MS);
    }

    let saved = session.shutdown(clock.now_ms() as i64);
    let ledger = &session.state().ledger;
    for resource in Resource::ALL {
        println!(
            "{:>17}: {}",
            resource.label(),
            ledger.current(resource).format_human(2)
        );
    }
    let breakdown = session.generation_breakdown();
    println!(
        "{:>17}: {}/s (base {} x {})",
        "rate",
        breakdown.final_rate.format_human(2),
        breakdown.base_rate.format_human(2),
        breakdown.multiplier.format_human(2)
    );
    if !saved {
        println!(
            "save failed: {}",
            session.last_save_error().unwrap_or("unknown error")
        );
    }
    Ok(())
}
