//! Enemy wave scheduling
//!
//! Two clocks are involved. When the next wave starts is counted in ticks;
//! when each enemy inside a wave appears is scheduled on the wall clock. A
//! wave of `count` spawns `count + 1` enemies, one per timer firing.

use serde::{Deserialize, Serialize};

use super::rng::WeightedRng;
use super::timer::{TaskId, TimerQueue};
use crate::config::EnemyConfig;

pub type WaveId = u32;

/// Parameters shared by every enemy of a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub ship_kind: u32,
    pub path_id: u32,
    pub speed: f32,
    pub power: i32,
    pub count: u32,
    pub interval_ms: u32,
}

impl WaveParams {
    /// Draw a wave from the configured ranges
    pub fn draw(config: &EnemyConfig, rng: &mut WeightedRng) -> Self {
        Self {
            ship_kind: rng.within(config.ship_kind),
            count: rng.within(config.group_count),
            interval_ms: rng.within(config.spawn_interval_ms),
            path_id: rng.within(config.path_id),
            power: rng.within(config.power),
            speed: rng.range_real(config.speed.min, config.speed.max),
        }
    }

    /// Total enemies this wave produces
    pub fn spawn_total(&self) -> u32 {
        self.count + 1
    }
}

/// A wave whose timer is still running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    pub id: WaveId,
    pub params: WaveParams,
    pub task: TaskId,
    pub spawned: u32,
}

/// Request to materialize one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnOrder {
    pub wave: WaveId,
    pub params: WaveParams,
    pub at_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    next_wave_cooldown_ticks: u32,
    timers: TimerQueue<WaveId>,
    waves: Vec<Wave>,
    next_wave_id: WaveId,
    launched: u32,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            next_wave_cooldown_ticks: 0,
            timers: TimerQueue::new(),
            waves: Vec::new(),
            next_wave_id: 1,
            launched: 0,
        }
    }

    pub fn next_wave_cooldown_ticks(&self) -> u32 {
        self.next_wave_cooldown_ticks
    }

    /// Waves with pending spawns, oldest first
    pub fn active_waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Most recently launched wave still spawning
    pub fn current_wave(&self) -> Option<&Wave> {
        self.waves.last()
    }

    /// Waves launched since construction or the last reset
    pub fn waves_launched(&self) -> u32 {
        self.launched
    }

    pub fn clock_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    /// Enemies `wave` has yet to spawn
    pub fn remaining_spawns(&self, wave: &Wave) -> u32 {
        self.timers
            .get(wave.task)
            .map_or(0, |task| task.remaining_repeats)
    }

    /// Per-tick countdown. Launches a wave when the cooldown has run out.
    pub fn tick(&mut self, config: &EnemyConfig, rng: &mut WeightedRng) -> Option<WaveId> {
        if self.next_wave_cooldown_ticks > 0 {
            self.next_wave_cooldown_ticks -= 1;
            return None;
        }
        Some(self.launch_wave(config, rng))
    }

    /// Draw and start a wave now, and re-arm the tick cooldown
    pub fn launch_wave(&mut self, config: &EnemyConfig, rng: &mut WeightedRng) -> WaveId {
        self.next_wave_cooldown_ticks = rng.within(config.spawn_timer_ticks);
        let params = WaveParams::draw(config, rng);
        self.start_wave(params)
    }

    /// Start a wave with fixed parameters
    pub fn start_wave(&mut self, params: WaveParams) -> WaveId {
        let id = self.next_wave_id;
        self.next_wave_id += 1;
        self.launched += 1;

        let task = self
            .timers
            .schedule_repeating(f64::from(params.interval_ms), params.spawn_total(), id);
        self.waves.push(Wave {
            id,
            params,
            task,
            spawned: 0,
        });

        log::info!(
            "Wave {id}: {} ships (kind {}) on path {}, power {}, speed {:.5}, every {}ms; next wave in {} ticks",
            params.spawn_total(),
            params.ship_kind,
            params.path_id,
            params.power,
            params.speed,
            params.interval_ms,
            self.next_wave_cooldown_ticks
        );
        id
    }

    /// Advance the wall clock and return the enemies due to spawn.
    /// Finished waves are discarded.
    pub fn advance_clock(&mut self, delta_ms: f64) -> Vec<SpawnOrder> {
        let mut orders = Vec::new();
        for firing in self.timers.advance(delta_ms) {
            let Some(index) = self.waves.iter().position(|w| w.id == firing.payload) else {
                continue;
            };
            let wave = &mut self.waves[index];
            wave.spawned += 1;
            orders.push(SpawnOrder {
                wave: wave.id,
                params: wave.params,
                at_ms: firing.at_ms,
            });
            if firing.last {
                log::debug!("Wave {} finished after {} spawns", wave.id, wave.spawned);
                self.waves.remove(index);
            }
        }
        orders
    }

    /// Cancel every wave timer; the tick cooldown is left as is
    pub fn cancel_waves(&mut self) -> usize {
        let dropped: u32 = self.waves.iter().map(|w| self.remaining_spawns(w)).sum();
        let cancelled = self.timers.cancel_all();
        self.waves.clear();
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} pending wave timer(s), {dropped} enemies never spawned");
        }
        cancelled
    }

    /// Back to the state of a fresh session, wall clock included
    pub fn reset(&mut self) {
        self.cancel_waves();
        self.timers = TimerQueue::new();
        self.next_wave_cooldown_ticks = 0;
        self.launched = 0;
    }
}
