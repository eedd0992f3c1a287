//! Simulation entities and their collections
//!
//! Entities are plain data. Anything the presentation layer draws for them is
//! an opaque [`VisualHandle`] attached after creation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::rng::WeightedRng;
use crate::config::{EnemyConfig, PlayerConfig, ValueRange};
use crate::host::VisualHandle;

/// Stable identifier, unique within a session
pub type EntityId = u32;

/// Capabilities shared by every entity kind
pub trait Body {
    fn id(&self) -> EntityId;
    fn position(&self) -> Vec2;
    fn bounds(&self) -> Bounds;
    fn visual(&self) -> Option<VisualHandle>;
    fn attach_visual(&mut self, handle: VisualHandle);
}

macro_rules! impl_body {
    ($ty:ty, |$s:ident| $bounds:expr) => {
        impl Body for $ty {
            fn id(&self) -> EntityId {
                self.id
            }
            fn position(&self) -> Vec2 {
                self.pos
            }
            fn bounds(&self) -> Bounds {
                let $s = self;
                $bounds
            }
            fn visual(&self) -> Option<VisualHandle> {
                self.visual
            }
            fn attach_visual(&mut self, handle: VisualHandle) {
                self.visual = Some(handle);
            }
        }
    };
}

/// Horizontal auto-move direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    pub fn sign(self) -> f32 {
        match self {
            MoveDirection::Left => -1.0,
            MoveDirection::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            MoveDirection::Left => MoveDirection::Right,
            MoveDirection::Right => MoveDirection::Left,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    /// Ticks until a manual shot is allowed again
    pub fire_counter: u32,
    pub fire_rate: u32,
    pub direction: MoveDirection,
    pub move_speed: f32,
    #[serde(skip)]
    pub visual: Option<VisualHandle>,
}

impl_body!(Player, |p| Bounds::rect(p.pos, p.size));

impl Player {
    pub fn new(id: EntityId, pos: Vec2, config: &PlayerConfig) -> Self {
        Self {
            id,
            pos,
            size: Vec2::splat(config.size),
            health: config.initial_health,
            fire_counter: 0,
            fire_rate: config.fire_rate_ticks,
            direction: MoveDirection::Right,
            move_speed: config.move_speed,
            visual: None,
        }
    }

    /// Step horizontally and bounce off the screen edges.
    ///
    /// Returns true if the direction flipped this step. The position is
    /// clamped so the ship never ends a step past an edge.
    pub fn auto_move(&mut self, screen_width: f32) -> bool {
        self.pos.x += self.direction.sign() * self.move_speed;

        let half = self.size.x * 0.5;
        let min_x = half;
        let max_x = (screen_width - half).max(min_x);
        let at_edge = match self.direction {
            MoveDirection::Right => self.pos.x >= max_x,
            MoveDirection::Left => self.pos.x <= min_x,
        };
        self.pos.x = self.pos.x.clamp(min_x, max_x);
        if at_edge {
            self.direction = self.direction.flipped();
        }
        at_edge
    }

    /// Count down the per-shot cooldown
    pub fn cool_down(&mut self) {
        self.fire_counter = self.fire_counter.saturating_sub(1);
    }

    /// Consume the per-shot cooldown if ready
    pub fn try_fire(&mut self) -> bool {
        if self.fire_counter > 0 {
            return false;
        }
        self.fire_counter = self.fire_rate;
        true
    }

    /// Muzzle position at the ship's nose
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.size.y * 0.5)
    }

    /// Apply damage; returns true if the ship is destroyed
    pub fn hit(&mut self, damage: i32) -> bool {
        self.health -= damage;
        self.health <= 0
    }
}

/// Predefined flight paths as polylines in viewport fractions
const FLIGHT_PATHS: [&[(f32, f32)]; 4] = [
    // Zigzag from the left
    &[(0.15, -0.1), (0.85, 0.25), (0.15, 0.55), (0.85, 0.85), (0.5, 1.2)],
    // Zigzag from the right
    &[(0.85, -0.1), (0.15, 0.25), (0.85, 0.55), (0.15, 0.85), (0.5, 1.2)],
    // Swoop across the upper half
    &[(-0.1, 0.1), (0.3, 0.45), (0.7, 0.45), (1.1, 0.1)],
    // Dive and climb back out
    &[(0.5, -0.1), (0.2, 0.35), (0.5, 0.65), (0.8, 0.35), (0.5, -0.2)],
];

/// Number of distinct flight paths
pub const FLIGHT_PATH_COUNT: u32 = FLIGHT_PATHS.len() as u32;

/// Position along a flight path at `progress` in `[0, 1]`
pub fn path_point(path_id: u32, progress: f32, viewport: Vec2) -> Vec2 {
    let points = FLIGHT_PATHS[(path_id % FLIGHT_PATH_COUNT) as usize];
    let segments = points.len() - 1;
    let s = progress.clamp(0.0, 1.0) * segments as f32;
    let i = (s.floor() as usize).min(segments - 1);
    let t = s - i as f32;
    let a = Vec2::from(points[i]);
    let b = Vec2::from(points[i + 1]);
    a.lerp(b, t) * viewport
}

/// A flying enemy following one of the flight paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyFlying {
    pub id: EntityId,
    pub ship_kind: u32,
    pub path_id: u32,
    /// Path progress per tick
    pub speed: f32,
    /// Damage dealt and remaining hit points
    pub power: i32,
    pub progress: f32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Ticks until the next shot
    pub fire_counter: u32,
    #[serde(skip)]
    pub visual: Option<VisualHandle>,
}

impl_body!(EnemyFlying, |e| Bounds::rect(e.pos, e.size));

impl EnemyFlying {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        ship_kind: u32,
        path_id: u32,
        speed: f32,
        power: i32,
        viewport: Vec2,
        config: &EnemyConfig,
        rng: &mut WeightedRng,
    ) -> Self {
        Self {
            id,
            ship_kind,
            path_id,
            speed,
            power,
            progress: 0.0,
            pos: path_point(path_id, 0.0, viewport),
            size: Vec2::splat(config.size),
            fire_counter: rng.within(config.fire_counter_ticks),
            visual: None,
        }
    }

    /// Advance along the path; returns false once the path is finished
    pub fn advance(&mut self, viewport: Vec2) -> bool {
        self.progress += self.speed;
        self.pos = path_point(self.path_id, self.progress, viewport);
        self.progress < 1.0
    }

    /// Count down the fire counter; returns true when a shot is due.
    /// The counter is redrawn from `range` after each shot.
    pub fn ready_to_fire(&mut self, range: ValueRange<u32>, rng: &mut WeightedRng) -> bool {
        if self.fire_counter > 0 {
            self.fire_counter -= 1;
            return false;
        }
        self.fire_counter = rng.within(range);
        true
    }

    /// Apply damage; returns true if the enemy is destroyed
    pub fn hit(&mut self, damage: i32) -> bool {
        self.power -= damage;
        self.power <= 0
    }
}

/// Shot fired by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBullet {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub power: i32,
    pub radius: f32,
    #[serde(skip)]
    pub visual: Option<VisualHandle>,
}

impl_body!(PlayerBullet, |b| Bounds::circle(b.pos, b.radius));

impl PlayerBullet {
    pub fn new(id: EntityId, pos: Vec2, config: &PlayerConfig) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(0.0, -config.bullet_speed),
            power: config.bullet_power,
            radius: config.bullet_radius,
            visual: None,
        }
    }

    pub fn step(&mut self) {
        self.pos += self.vel;
    }
}

/// Shot fired by an enemy; carries the shooter's power as damage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub power: i32,
    pub radius: f32,
    #[serde(skip)]
    pub visual: Option<VisualHandle>,
}

impl_body!(EnemyBullet, |b| Bounds::circle(b.pos, b.radius));

impl EnemyBullet {
    pub fn new(id: EntityId, pos: Vec2, power: i32, config: &EnemyConfig) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(0.0, config.bullet_speed),
            power,
            radius: config.bullet_radius,
            visual: None,
        }
    }

    pub fn step(&mut self) {
        self.pos += self.vel;
    }
}

/// Every live entity, held in per-kind collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub player: Option<Player>,
    pub enemies: Vec<EnemyFlying>,
    pub player_bullets: Vec<PlayerBullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    next_id: EntityId,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    pub fn entity_count(&self) -> usize {
        usize::from(self.player.is_some())
            + self.enemies.len()
            + self.player_bullets.len()
            + self.enemy_bullets.len()
    }

    /// Empty every collection, returning the visuals that must be released
    pub fn clear(&mut self) -> Vec<VisualHandle> {
        let mut visuals: Vec<VisualHandle> = self.player.take().and_then(|p| p.visual).into_iter().collect();
        visuals.extend(self.enemies.drain(..).filter_map(|e| e.visual));
        visuals.extend(self.player_bullets.drain(..).filter_map(|b| b.visual));
        visuals.extend(self.enemy_bullets.drain(..).filter_map(|b| b.visual));
        visuals
    }
}
