//! Procedural scrolling terrain
//!
//! The grid is taller than the screen by `map_offset + 1` rows. Row 0 sits
//! above the visible area, so a freshly generated row is never seen until it
//! has been shifted down into view.

use serde::{Deserialize, Serialize};

use super::rng::WeightedRng;
use crate::config::GameConfig;

/// Tile identifier from the tile sheet
pub type TileId = u32;

/// Row-major grid of tile ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    cells: Vec<TileId>,
}

impl TerrainGrid {
    /// Fill a new grid with draws from `palette`
    pub fn generate(width: usize, height: usize, palette: &[TileId], rng: &mut WeightedRng) -> Self {
        let cells = (0..width * height)
            .map(|_| rng.pick(palette).unwrap_or_default())
            .collect();
        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x).copied()
    }

    /// Tiles of row `y`, top row first; `None` past the bottom
    pub fn row(&self, y: usize) -> Option<&[TileId]> {
        if y >= self.height {
            return None;
        }
        self.cells.get(y * self.width..(y + 1) * self.width)
    }

    pub fn cells(&self) -> &[TileId] {
        &self.cells
    }

    /// Move every row from `1..=height-2` down by one and regenerate row 0.
    ///
    /// The bottom row is outside the shifted range and keeps its tiles.
    fn shift_down(&mut self, palette: &[TileId], rng: &mut WeightedRng) {
        if self.height < 2 {
            return;
        }
        let w = self.width;
        for y in (1..=self.height - 2).rev() {
            self.cells.copy_within((y - 1) * w..y * w, y * w);
        }
        for cell in &mut self.cells[..w] {
            *cell = rng.pick(palette).unwrap_or_default();
        }
    }
}

/// Result of one scroll step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    /// Vertical position for the rendered terrain layer
    pub offset_y: f32,
    /// True if the grid shifted by a row this step
    pub shifted: bool,
}

/// Owns the terrain and its pixel scroll accumulator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollEngine {
    grid: TerrainGrid,
    /// Pixel offset in `[0, tile_size)`
    accumulator: f32,
    scroll_speed: f32,
    tile_size: f32,
    map_top: f32,
    palette: Vec<TileId>,
}

impl ScrollEngine {
    /// Build the terrain for a validated config
    pub fn new(config: &GameConfig, rng: &mut WeightedRng) -> Self {
        let palette = config.map.tiles.clone();
        let grid = TerrainGrid::generate(config.map_width(), config.map_height(), &palette, rng);
        Self {
            grid,
            accumulator: 0.0,
            scroll_speed: config.map.scroll_speed,
            tile_size: config.map.tile_size,
            map_top: config.map_top(),
            palette,
        }
    }

    /// Scroll by one tick's worth of pixels
    pub fn advance(&mut self, rng: &mut WeightedRng) -> ScrollStep {
        self.accumulator += self.scroll_speed;

        let shifted = self.accumulator >= self.tile_size;
        if shifted {
            self.grid.shift_down(&self.palette, rng);
            self.accumulator -= self.tile_size;
            log::trace!("Terrain shifted, new top row generated");
        }

        ScrollStep {
            offset_y: self.offset_y(),
            shifted,
        }
    }

    pub fn offset_y(&self) -> f32 {
        self.map_top + self.accumulator
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.viewport.width = 128.0;
        config.viewport.height = 96.0;
        config.map.tile_size = 32.0;
        config.map.map_offset = 2;
        config.map.scroll_speed = 8.0;
        config
    }

    #[test]
    fn test_grid_dimensions() {
        let config = small_config();
        let mut rng = WeightedRng::new(1);
        let engine = ScrollEngine::new(&config, &mut rng);
        assert_eq!(engine.grid().width(), 4);
        // 3 visible + 2 offset + 1
        assert_eq!(engine.grid().height(), 6);
        assert_eq!(engine.offset_y(), -64.0);
    }

    #[test]
    fn test_lookups_past_the_edge_are_none() {
        let config = small_config();
        let mut rng = WeightedRng::new(1);
        let engine = ScrollEngine::new(&config, &mut rng);
        let grid = engine.grid();

        assert_eq!(grid.row(5).map(<[TileId]>::len), Some(4));
        assert_eq!(grid.row(6), None);
        assert_eq!(grid.get(3, 5), grid.row(5).map(|r| r[3]));
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.get(0, 6), None);
    }

    #[test]
    fn test_accumulator_wraps_and_shifts() {
        let config = small_config();
        let mut rng = WeightedRng::new(2);
        let mut engine = ScrollEngine::new(&config, &mut rng);

        for step in 1..4 {
            let result = engine.advance(&mut rng);
            assert!(!result.shifted);
            assert_eq!(engine.accumulator(), 8.0 * step as f32);
        }
        let result = engine.advance(&mut rng);
        assert!(result.shifted);
        assert_eq!(engine.accumulator(), 0.0);
        assert_eq!(result.offset_y, -64.0);
    }

    #[test]
    fn test_shift_moves_rows_down() {
        let config = small_config();
        let mut rng = WeightedRng::new(3);
        let mut engine = ScrollEngine::new(&config, &mut rng);
        let before = engine.grid().clone();

        for _ in 0..4 {
            engine.advance(&mut rng);
        }

        let after = engine.grid();
        let h = after.height();
        for y in 1..=h - 2 {
            assert_eq!(after.row(y), before.row(y - 1), "row {y}");
        }
        // Bottom row is never rewritten
        assert_eq!(after.row(h - 1), before.row(h - 1));
    }

    #[test]
    fn test_cells_stay_in_palette() {
        let mut config = small_config();
        config.map.tiles = vec![5, 5, 9];
        let mut rng = WeightedRng::new(4);
        let mut engine = ScrollEngine::new(&config, &mut rng);
        for _ in 0..400 {
            engine.advance(&mut rng);
        }
        assert!(engine.grid().cells().iter().all(|c| *c == 5 || *c == 9));
    }
}
