//! Presentation boundary
//!
//! The simulation never draws anything itself. It asks a [`Host`] to create,
//! move and destroy visuals and to show text, and the host feeds input back
//! through [`Session::handle_input`](crate::sim::Session::handle_input).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::collision::Bounds;
use crate::sim::terrain::TerrainGrid;

/// Opaque handle to something the host is drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// What a visual represents, with the parameters needed to draw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Player,
    Enemy { ship_kind: u32 },
    PlayerBullet,
    /// Bullet image is chosen by the firing enemy's power
    EnemyBullet { power: i32 },
    /// Fire-and-forget effect, released by the host when it finishes
    Explosion,
}

/// On-screen text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextId {
    Tutorial,
    Score,
    BulletTimer,
    Continue,
    GameOver,
}

/// Input signals the host forwards to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSignal {
    /// Leave the tutorial and begin play
    Start,
    /// Manual shot, limited by the player's own fire rate
    Fire,
    /// Respawn after the player was destroyed
    Continue,
    /// Decline to continue; shows the game over screen
    GiveUp,
    /// Rebuild the session from scratch
    Restart,
}

/// Services the simulation consumes from the presentation layer
pub trait Host {
    fn create_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle;
    fn destroy_visual(&mut self, handle: VisualHandle);
    fn set_visual_position(&mut self, handle: VisualHandle, pos: Vec2);
    fn show_text(&mut self, id: TextId, content: &str);
    fn set_text_visible(&mut self, id: TextId, visible: bool);

    /// Terrain layer moved to `offset_y`; `grid` changed if `shifted`
    fn terrain_scrolled(&mut self, _offset_y: f32, _grid: &TerrainGrid, _shifted: bool) {}

    /// Overlap predicate used by combat. Hosts with their own physics can
    /// override this; the default is the geometric test.
    fn overlaps(&self, a: &Bounds, b: &Bounds) -> bool {
        a.overlaps(b)
    }
}

/// Host that records every call, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    next_handle: u64,
    /// Live visuals by handle
    pub visuals: Vec<(VisualHandle, VisualKind, Vec2)>,
    pub created: Vec<VisualKind>,
    pub destroyed: Vec<VisualHandle>,
    /// Latest content and visibility per text slot
    pub texts: Vec<(TextId, String, bool)>,
    pub text_updates: usize,
    pub terrain_offset: f32,
    pub terrain_shifts: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, id: TextId) -> Option<&str> {
        self.texts
            .iter()
            .find(|(t, _, _)| *t == id)
            .map(|(_, s, _)| s.as_str())
    }

    pub fn text_visible(&self, id: TextId) -> bool {
        self.texts.iter().any(|(t, _, v)| *t == id && *v)
    }

    pub fn live_count(&self, matches: impl Fn(&VisualKind) -> bool) -> usize {
        self.visuals.iter().filter(|(_, k, _)| matches(k)).count()
    }

    pub fn explosions(&self) -> usize {
        self.created
            .iter()
            .filter(|k| matches!(k, VisualKind::Explosion))
            .count()
    }

    fn text_slot(&mut self, id: TextId) -> &mut (TextId, String, bool) {
        let index = match self.texts.iter().position(|(t, _, _)| *t == id) {
            Some(i) => i,
            None => {
                self.texts.push((id, String::new(), true));
                self.texts.len() - 1
            }
        };
        &mut self.texts[index]
    }
}

impl Host for RecordingHost {
    fn create_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        self.created.push(kind);
        // Explosions are released by the host itself once played
        if kind != VisualKind::Explosion {
            self.visuals.push((handle, kind, pos));
        }
        handle
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.visuals.retain(|(h, _, _)| *h != handle);
        self.destroyed.push(handle);
    }

    fn set_visual_position(&mut self, handle: VisualHandle, pos: Vec2) {
        if let Some(entry) = self.visuals.iter_mut().find(|(h, _, _)| *h == handle) {
            entry.2 = pos;
        }
    }

    fn show_text(&mut self, id: TextId, content: &str) {
        self.text_updates += 1;
        let slot = self.text_slot(id);
        slot.1 = content.to_string();
    }

    fn set_text_visible(&mut self, id: TextId, visible: bool) {
        self.text_slot(id).2 = visible;
    }

    fn terrain_scrolled(&mut self, offset_y: f32, _grid: &TerrainGrid, shifted: bool) {
        self.terrain_offset = offset_y;
        if shifted {
            self.terrain_shifts += 1;
        }
    }
}
