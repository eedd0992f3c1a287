//! Score ledger and the difficulty knob driven by it
//!
//! Every full multiple of `cooldown_step` points adds one tick to the
//! auto-fire delay, so a higher score means fewer automatic shots.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    score: u32,
    fire_cooldown_ticks: u32,
    base_cooldown_ticks: u32,
    cooldown_step: u32,
}

impl ScoreLedger {
    pub fn new(base_cooldown_ticks: u32, cooldown_step: u32) -> Self {
        Self {
            score: 0,
            fire_cooldown_ticks: base_cooldown_ticks,
            base_cooldown_ticks,
            cooldown_step: cooldown_step.max(1),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.player.base_fire_cooldown_ticks,
            config.scoring.cooldown_step,
        )
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Auto-fire reset delay in ticks; never decreases until [`reset`](Self::reset)
    pub fn fire_cooldown_ticks(&self) -> u32 {
        self.fire_cooldown_ticks
    }

    /// Add points; returns how many step multiples were crossed
    pub fn award(&mut self, points: u32) -> u32 {
        let before = self.score / self.cooldown_step;
        self.score = self.score.saturating_add(points);
        let crossed = self.score / self.cooldown_step - before;
        self.fire_cooldown_ticks += crossed;
        crossed
    }

    /// Back to zero score and the base cooldown
    pub fn reset(&mut self) {
        self.score = 0;
        self.fire_cooldown_ticks = self.base_cooldown_ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_rises_only_at_multiples() {
        let mut ledger = ScoreLedger::new(60, 50);
        assert_eq!(ledger.award(49), 0);
        assert_eq!(ledger.fire_cooldown_ticks(), 60);
        assert_eq!(ledger.award(1), 1);
        assert_eq!(ledger.fire_cooldown_ticks(), 61);
        assert_eq!(ledger.award(49), 0);
        assert_eq!(ledger.fire_cooldown_ticks(), 61);
        assert_eq!(ledger.award(1), 1);
        assert_eq!(ledger.score(), 100);
        assert_eq!(ledger.fire_cooldown_ticks(), 62);
    }

    #[test]
    fn test_five_hits_cross_one_multiple() {
        let mut ledger = ScoreLedger::new(60, 50);
        let crossed: u32 = (0..5).map(|_| ledger.award(10)).sum();
        assert_eq!(crossed, 1);
        assert_eq!(ledger.score(), 50);
        assert_eq!(ledger.fire_cooldown_ticks(), 61);
    }

    #[test]
    fn test_large_award_crosses_several() {
        let mut ledger = ScoreLedger::new(60, 50);
        ledger.award(40);
        assert_eq!(ledger.award(120), 3);
        assert_eq!(ledger.fire_cooldown_ticks(), 63);
    }

    #[test]
    fn test_reset() {
        let mut ledger = ScoreLedger::new(60, 50);
        ledger.award(230);
        ledger.reset();
        assert_eq!(ledger.score(), 0);
        assert_eq!(ledger.fire_cooldown_ticks(), 60);
    }
}
