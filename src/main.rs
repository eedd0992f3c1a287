//! Sky Raid headless runner
//!
//! Drives a session at a fixed frame rate with a host that only logs, starting
//! play immediately and continuing a few times before giving up.
//!
//! Usage: `sky-raid [config.json] [frames] [seed]`

use std::process::ExitCode;

use glam::Vec2;

use sky_raid::consts::TICK_MS;
use sky_raid::sim::TerrainGrid;
use sky_raid::{GameConfig, Host, InputSignal, Session, SessionState, TextId, VisualHandle, VisualKind};

/// Continues granted before the runner gives up
const MAX_CONTINUES: u32 = 3;
const DEFAULT_FRAMES: u64 = 60 * 120;

/// Host that draws nothing and logs what it would have drawn
#[derive(Debug, Default)]
struct LogHost {
    next_handle: u64,
    live_visuals: usize,
    explosions: u32,
}

impl Host for LogHost {
    fn create_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle {
        self.next_handle += 1;
        match kind {
            VisualKind::Explosion => self.explosions += 1,
            _ => self.live_visuals += 1,
        }
        log::trace!("create {kind:?} #{} at ({:.0}, {:.0})", self.next_handle, pos.x, pos.y);
        VisualHandle(self.next_handle)
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.live_visuals = self.live_visuals.saturating_sub(1);
        log::trace!("destroy #{}", handle.0);
    }

    fn set_visual_position(&mut self, _handle: VisualHandle, _pos: Vec2) {}

    fn show_text(&mut self, id: TextId, content: &str) {
        log::debug!("[{id:?}] {content}");
    }

    fn set_text_visible(&mut self, id: TextId, visible: bool) {
        log::trace!("[{id:?}] visible={visible}");
    }

    fn terrain_scrolled(&mut self, offset_y: f32, grid: &TerrainGrid, shifted: bool) {
        if shifted {
            log::trace!("terrain top row {:?} offset {offset_y}", grid.row(0).unwrap_or_default());
        }
    }
}

fn load_config(path: Option<&String>) -> Result<GameConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(GameConfig::from_json(&json)?)
        }
        None => Ok(GameConfig::default()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config = match load_config(args.get(1)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let frames = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);
    let seed: Option<u64> = args.get(3).and_then(|s| s.parse().ok());

    let host = LogHost::default();
    let built = match seed {
        Some(seed) => Session::with_seed(config, host, seed),
        None => Session::new(config, host),
    };
    let mut session = match built {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to build session: {e}");
            return ExitCode::FAILURE;
        }
    };

    session.handle_input(InputSignal::Start);

    let mut continues = 0;
    let mut best_score = 0;
    for _ in 0..frames {
        session.tick(TICK_MS);
        best_score = best_score.max(session.score());

        if session.state() == SessionState::PausedForContinue {
            if continues < MAX_CONTINUES {
                continues += 1;
                session.handle_input(InputSignal::Continue);
            } else {
                session.handle_input(InputSignal::GiveUp);
                break;
            }
        }
    }

    let summary = serde_json::json!({
        "seed": session.seed(),
        "state": session.state(),
        "ticks": session.tick_count(),
        "clock_ms": session.clock_ms(),
        "score": session.score(),
        "best_score": best_score,
        "continues": continues,
        "waves": session.spawner().waves_launched(),
        "explosions": session.host().explosions,
        "live_visuals": session.host().live_visuals,
    });
    log::info!("Run finished: {summary}");
    ExitCode::SUCCESS
}
