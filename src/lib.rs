//! Sky Raid - simulation core of a vertically scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (terrain scroll, waves, combat, session state)
//! - `config`: Data-driven game balance, loadable from JSON
//! - `host`: Boundary to the presentation layer (visuals, text, overlap test)

pub mod config;
pub mod host;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use host::{Host, InputSignal, RecordingHost, TextId, VisualHandle, VisualKind};
pub use sim::{Session, SessionState};

/// Game timing constants
pub mod consts {
    /// Nominal simulation rate (one tick per rendered frame)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Wall-clock duration of one nominal tick, in milliseconds
    pub const TICK_MS: f64 = 1000.0 / TICKS_PER_SECOND as f64;
    /// Maximum frame delta fed to the wall clock (avoids timer bursts after a stall)
    pub const MAX_FRAME_MS: f64 = 250.0;
}
