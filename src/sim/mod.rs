//! Tick-driven simulation module
//!
//! All gameplay logic lives here:
//! - One tick per frame; only wave spawns run on the wall clock
//! - Seeded RNG only
//! - Stable iteration order (insertion order per collection)
//! - No rendering; visuals go through the `Host` boundary

pub mod collision;
pub mod combat;
pub mod entity;
pub mod rng;
pub mod score;
pub mod session;
pub mod spawn;
pub mod terrain;
pub mod timer;

pub use collision::Bounds;
pub use combat::{CombatOutcome, resolve};
pub use entity::{Body, EnemyBullet, EnemyFlying, EntityId, MoveDirection, Player, PlayerBullet, World};
pub use rng::WeightedRng;
pub use score::ScoreLedger;
pub use session::{Session, SessionState};
pub use spawn::{SpawnOrder, SpawnScheduler, Wave, WaveParams};
pub use terrain::{ScrollEngine, ScrollStep, TerrainGrid, TileId};
pub use timer::{Firing, ScheduledTask, TaskId, TimerQueue};
