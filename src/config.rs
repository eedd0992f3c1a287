//! Game balance configuration
//!
//! Defaults mirror the shipped tuning. A config can be loaded from JSON, and
//! is always validated before a session is built from it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected at session construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tile palette is empty")]
    EmptyPalette,
    #[error("tile size must be positive, got {0}")]
    NonPositiveTileSize(f32),
    #[error("map offset must be at least one row")]
    ZeroMapOffset,
    #[error("scroll speed {speed} must lie within [0, {tile_size}]")]
    ScrollSpeedOutOfRange { speed: f32, tile_size: f32 },
    #[error("viewport must be non-empty, got {width}x{height}")]
    EmptyViewport { width: f32, height: f32 },
    #[error("range `{0}` has min greater than max")]
    InvertedRange(&'static str),
    #[error("`{0}` must be positive")]
    NonPositive(&'static str),
}

/// Inclusive `[min, max]` bounds for a random draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T> ValueRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> ValueRange<T> {
    fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange(name));
        }
        Ok(())
    }
}

/// Visible play area in pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Scrolling terrain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Weighted palette: repeated ids are more likely, earlier ids more so
    pub tiles: Vec<u32>,
    /// Width and height of a tile in pixels
    pub tile_size: f32,
    /// Rows kept above the top of the screen for pre-generation
    pub map_offset: u32,
    /// Pixels scrolled per tick
    pub scroll_speed: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        let mut tiles = Vec::with_capacity(33);
        for _ in 0..2 {
            tiles.extend(std::iter::repeat_n(50, 9));
            tiles.extend(std::iter::repeat_n(110, 5));
        }
        tiles.extend([36, 48, 60, 72, 84]);
        Self {
            tiles,
            tile_size: 32.0,
            map_offset: 10,
            scroll_speed: 1.0,
        }
    }
}

/// Enemy waves and enemy behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Ticks between wave launches
    pub spawn_timer_ticks: ValueRange<u32>,
    /// Wave size (the wave spawns one more enemy than this)
    pub group_count: ValueRange<u32>,
    /// Wall-clock gap between enemies of one wave
    pub spawn_interval_ms: ValueRange<u32>,
    /// Path progress per tick
    pub speed: ValueRange<f32>,
    /// Damage dealt and hit points
    pub power: ValueRange<i32>,
    pub ship_kind: ValueRange<u32>,
    pub path_id: ValueRange<u32>,
    /// Ticks between shots of a single enemy
    pub fire_counter_ticks: ValueRange<u32>,
    pub size: f32,
    /// Enemy bullet speed in pixels per tick (downward)
    pub bullet_speed: f32,
    pub bullet_radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            spawn_timer_ticks: ValueRange::new(5 * 60, 8 * 60),
            group_count: ValueRange::new(5, 15),
            spawn_interval_ms: ValueRange::new(800, 1200),
            speed: ValueRange::new(0.0001, 0.001),
            power: ValueRange::new(1, 4),
            ship_kind: ValueRange::new(0, 11),
            path_id: ValueRange::new(0, 3),
            fire_counter_ticks: ValueRange::new(100, 300),
            size: 64.0,
            bullet_speed: 4.0,
            bullet_radius: 8.0,
        }
    }
}

/// Player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub initial_health: i32,
    /// Spawn height measured up from the bottom of the screen
    pub initial_y_offset: f32,
    /// Horizontal auto-move speed in pixels per tick
    pub move_speed: f32,
    pub size: f32,
    /// Per-shot cooldown for manual fire
    pub fire_rate_ticks: u32,
    /// Auto-fire delay at score zero
    pub base_fire_cooldown_ticks: u32,
    /// Player bullet speed in pixels per tick (upward)
    pub bullet_speed: f32,
    pub bullet_power: i32,
    pub bullet_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_health: 8,
            initial_y_offset: 100.0,
            move_speed: 4.0,
            size: 64.0,
            fire_rate_ticks: 10,
            base_fire_cooldown_ticks: 60,
            bullet_speed: 12.0,
            bullet_power: 1,
            bullet_radius: 6.0,
        }
    }
}

/// Score awards and the difficulty knob tied to them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_hit: u32,
    /// Every full multiple of this many points slows auto-fire by one tick
    pub cooldown_step: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_hit: 10,
            cooldown_step: 50,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub viewport: ViewportConfig,
    pub map: MapConfig,
    pub enemy: EnemyConfig,
    pub player: PlayerConfig,
    pub scoring: ScoringConfig,
}

impl GameConfig {
    /// Parse a JSON config; missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every precondition the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ViewportConfig { width, height } = self.viewport;
        if width <= 0.0 || height <= 0.0 {
            return Err(ConfigError::EmptyViewport { width, height });
        }

        let map = &self.map;
        if map.tiles.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if map.tile_size <= 0.0 {
            return Err(ConfigError::NonPositiveTileSize(map.tile_size));
        }
        if map.map_offset == 0 {
            return Err(ConfigError::ZeroMapOffset);
        }
        if !(0.0..=map.tile_size).contains(&map.scroll_speed) {
            return Err(ConfigError::ScrollSpeedOutOfRange {
                speed: map.scroll_speed,
                tile_size: map.tile_size,
            });
        }

        let enemy = &self.enemy;
        enemy.spawn_timer_ticks.check("enemy.spawn_timer_ticks")?;
        enemy.group_count.check("enemy.group_count")?;
        enemy.spawn_interval_ms.check("enemy.spawn_interval_ms")?;
        enemy.speed.check("enemy.speed")?;
        enemy.power.check("enemy.power")?;
        enemy.ship_kind.check("enemy.ship_kind")?;
        enemy.path_id.check("enemy.path_id")?;
        enemy.fire_counter_ticks.check("enemy.fire_counter_ticks")?;
        if enemy.speed.min <= 0.0 {
            return Err(ConfigError::NonPositive("enemy.speed"));
        }
        if enemy.power.min <= 0 {
            return Err(ConfigError::NonPositive("enemy.power"));
        }
        if enemy.size <= 0.0 {
            return Err(ConfigError::NonPositive("enemy.size"));
        }
        if enemy.bullet_speed <= 0.0 {
            return Err(ConfigError::NonPositive("enemy.bullet_speed"));
        }
        if enemy.bullet_radius <= 0.0 {
            return Err(ConfigError::NonPositive("enemy.bullet_radius"));
        }

        let player = &self.player;
        if player.initial_health <= 0 {
            return Err(ConfigError::NonPositive("player.initial_health"));
        }
        if player.size <= 0.0 {
            return Err(ConfigError::NonPositive("player.size"));
        }
        if player.move_speed <= 0.0 {
            return Err(ConfigError::NonPositive("player.move_speed"));
        }
        if player.bullet_speed <= 0.0 {
            return Err(ConfigError::NonPositive("player.bullet_speed"));
        }
        if player.bullet_power <= 0 {
            return Err(ConfigError::NonPositive("player.bullet_power"));
        }
        if player.bullet_radius <= 0.0 {
            return Err(ConfigError::NonPositive("player.bullet_radius"));
        }
        if self.scoring.cooldown_step == 0 {
            return Err(ConfigError::NonPositive("scoring.cooldown_step"));
        }

        Ok(())
    }

    /// Terrain columns needed to cover the viewport
    pub fn map_width(&self) -> usize {
        (self.viewport.width / self.map.tile_size).ceil() as usize
    }

    /// Terrain rows: the viewport plus the off-screen generation band
    pub fn map_height(&self) -> usize {
        (self.viewport.height / self.map.tile_size).ceil() as usize + self.map.map_offset as usize + 1
    }

    /// Pixel offset that hides the generation band above the screen
    pub fn map_top(&self) -> f32 {
        -(self.map.map_offset as f32) * self.map.tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.map.tiles.len(), 33);
        assert_eq!(config.map.tiles[0], 50);
        assert_eq!(config.map.tiles[32], 84);
    }

    #[test]
    fn test_map_dimensions() {
        let config = GameConfig::default();
        assert_eq!(config.map_width(), 40);
        // 720 / 32 = 22.5 -> 23 visible rows, + 10 offset + 1
        assert_eq!(config.map_height(), 34);
        assert_eq!(config.map_top(), -320.0);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut config = GameConfig::default();
        config.map.tiles.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyPalette)));
    }

    #[test]
    fn test_non_positive_tile_size_rejected() {
        let mut config = GameConfig::default();
        config.map.tile_size = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveTileSize(_))
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = GameConfig::default();
        config.enemy.power = ValueRange::new(4, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange("enemy.power"))
        ));
    }

    #[test]
    fn test_negative_enemy_speed_rejected() {
        let mut config = GameConfig::default();
        config.enemy.speed = ValueRange::new(-0.01, -0.001);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("enemy.speed"))
        ));
        config.enemy.speed = ValueRange::new(0.0, 0.001);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_enemy_power_rejected() {
        let mut config = GameConfig::default();
        config.enemy.power = ValueRange::new(-4, -1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("enemy.power"))
        ));
        config.enemy.power = ValueRange::new(0, 4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_enemy_bullet_speed_rejected() {
        let mut config = GameConfig::default();
        config.enemy.bullet_speed = -4.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("enemy.bullet_speed"))
        ));
    }

    #[test]
    fn test_non_positive_player_bullet_rejected() {
        let mut config = GameConfig::default();
        config.player.bullet_power = -1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("player.bullet_power"))
        ));

        let mut config = GameConfig::default();
        config.player.bullet_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("player.bullet_speed"))
        ));
    }

    #[test]
    fn test_non_positive_move_speed_rejected() {
        let mut config = GameConfig::default();
        config.player.move_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive("player.move_speed"))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "map": { "tiles": [1, 2], "tile_size": 16.0, "map_offset": 4, "scroll_speed": 2.0 } }"#)
            .expect("valid config");
        assert_eq!(config.map.tiles, vec![1, 2]);
        assert_eq!(config.player.initial_health, 8);
        assert_eq!(config.scoring.cooldown_step, 50);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
