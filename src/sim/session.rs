//! Session state machine and per-tick orchestration
//!
//! The host calls [`Session::tick`] once per frame and forwards input
//! signals. Only the `Running` state advances the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Bounds;
use super::combat;
use super::entity::{Body, EnemyBullet, EnemyFlying, Player, PlayerBullet, World};
use super::rng::WeightedRng;
use super::score::ScoreLedger;
use super::spawn::{SpawnOrder, SpawnScheduler};
use super::terrain::ScrollEngine;
use crate::config::{ConfigError, GameConfig};
use crate::consts::{MAX_FRAME_MS, TICKS_PER_SECOND};
use crate::host::{Host, InputSignal, TextId, VisualHandle, VisualKind};

const TUTORIAL_TEXT: &str = "Tap to shoot!";
const CONTINUE_TEXT: &str = "Continue?";
const GAME_OVER_TEXT: &str = "Game Over";

/// Overall session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Player spawned, tutorial shown, nothing moving yet
    AwaitingStart,
    /// Active gameplay
    Running,
    /// Player destroyed, waiting for a continue
    PausedForContinue,
    /// Player declined to continue
    Over,
}

pub struct Session<H: Host> {
    config: GameConfig,
    host: H,
    rng: WeightedRng,
    state: SessionState,
    terrain: ScrollEngine,
    spawner: SpawnScheduler,
    world: World,
    ledger: ScoreLedger,
    /// Ticks until the next automatic shot
    bullet_timer: i32,
    tick_count: u64,
    shown_score: Option<u32>,
    shown_timer: Option<i32>,
}

impl<H: Host> Session<H> {
    /// Build a session with an OS-seeded random stream
    pub fn new(config: GameConfig, host: H) -> Result<Self, ConfigError> {
        Self::with_rng(config, host, WeightedRng::from_entropy())
    }

    /// Build a reproducible session
    pub fn with_seed(config: GameConfig, host: H, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, host, WeightedRng::new(seed))
    }

    fn with_rng(config: GameConfig, host: H, mut rng: WeightedRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let terrain = ScrollEngine::new(&config, &mut rng);
        let ledger = ScoreLedger::from_config(&config);
        let mut session = Self {
            config,
            host,
            rng,
            state: SessionState::AwaitingStart,
            terrain,
            spawner: SpawnScheduler::new(),
            world: World::new(),
            ledger,
            bullet_timer: 0,
            tick_count: 0,
            shown_score: None,
            shown_timer: None,
        };
        session.enter_awaiting_start();
        log::info!("Session created with seed {}", session.rng.seed());
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.ledger.score()
    }

    pub fn fire_cooldown_ticks(&self) -> u32 {
        self.ledger.fire_cooldown_ticks()
    }

    pub fn bullet_timer(&self) -> i32 {
        self.bullet_timer
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Wall-clock time seen by the wave timers
    pub fn clock_ms(&self) -> f64 {
        self.spawner.clock_ms()
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn terrain(&self) -> &ScrollEngine {
        &self.terrain
    }

    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for scripted scenarios
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Default spawn point: centred, `initial_y_offset` above the bottom
    pub fn player_spawn_point(&self) -> Vec2 {
        Vec2::new(
            self.config.viewport.width * 0.5,
            self.config.viewport.height - self.config.player.initial_y_offset,
        )
    }

    fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.viewport.width, self.config.viewport.height)
    }

    /// Dispatch an input signal; returns true if it had any effect
    pub fn handle_input(&mut self, signal: InputSignal) -> bool {
        let handled = match signal {
            InputSignal::Start => self.handle_start_signal(),
            InputSignal::Fire => self.handle_fire_signal(),
            InputSignal::Continue => self.handle_continue_signal(),
            InputSignal::GiveUp => self.handle_give_up_signal(),
            InputSignal::Restart => self.handle_restart_signal(),
        };
        if !handled {
            log::debug!("Ignored {signal:?} in state {:?}", self.state);
        }
        handled
    }

    /// AwaitingStart -> Running, launching the first wave at once
    pub fn handle_start_signal(&mut self) -> bool {
        if self.state != SessionState::AwaitingStart {
            return false;
        }
        self.host.set_text_visible(TextId::Tutorial, false);
        self.state = SessionState::Running;
        log::info!("Session started");
        self.spawner.launch_wave(&self.config.enemy, &mut self.rng);
        true
    }

    /// Manual shot, limited by the player's own fire rate
    pub fn handle_fire_signal(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        let Some(player) = self.world.player.as_mut() else {
            return false;
        };
        if !player.try_fire() {
            return false;
        }
        let muzzle = player.muzzle();
        self.fire_player_bullet(muzzle);
        true
    }

    /// PausedForContinue -> Running with a fresh ship and zero score
    pub fn handle_continue_signal(&mut self) -> bool {
        if self.state != SessionState::PausedForContinue {
            return false;
        }
        if let Some(stale) = self.world.player.take() {
            release(&mut self.host, stale.visual);
        }
        self.spawn_player();
        self.ledger.reset();
        self.bullet_timer = 0;
        self.host.set_text_visible(TextId::Continue, false);
        self.refresh_hud();
        self.state = SessionState::Running;
        log::info!("Continued with a new ship");
        true
    }

    /// PausedForContinue -> Over
    pub fn handle_give_up_signal(&mut self) -> bool {
        if self.state != SessionState::PausedForContinue {
            return false;
        }
        self.enter_over();
        true
    }

    /// Over (or PausedForContinue, passing through Over) -> AwaitingStart,
    /// with every piece of state rebuilt
    pub fn handle_restart_signal(&mut self) -> bool {
        match self.state {
            SessionState::Over => {}
            SessionState::PausedForContinue => self.enter_over(),
            SessionState::AwaitingStart | SessionState::Running => return false,
        }

        self.spawner.reset();
        for visual in self.world.clear() {
            self.host.destroy_visual(visual);
        }
        self.world = World::new();
        self.ledger.reset();
        self.bullet_timer = 0;
        self.tick_count = 0;
        self.terrain = ScrollEngine::new(&self.config, &mut self.rng);
        self.host.set_text_visible(TextId::GameOver, false);
        self.enter_awaiting_start();
        log::info!("Session restarted");
        true
    }

    /// Advance one frame. `delta_ms` drives the wave timers; everything else
    /// moves by exactly one tick. No-op outside `Running`.
    pub fn tick(&mut self, delta_ms: f64) {
        if self.state != SessionState::Running {
            return;
        }
        self.tick_count += 1;

        let step = self.terrain.advance(&mut self.rng);
        self.host
            .terrain_scrolled(step.offset_y, self.terrain.grid(), step.shifted);

        for order in self.spawner.advance_clock(delta_ms.clamp(0.0, MAX_FRAME_MS)) {
            self.spawn_enemy(order);
        }
        self.spawner.tick(&self.config.enemy, &mut self.rng);

        self.update_player();
        self.update_enemies();
        self.update_bullets();
        self.resolve_combat();

        self.sync_visuals();
        self.refresh_hud();
    }

    fn enter_awaiting_start(&mut self) {
        self.state = SessionState::AwaitingStart;
        self.host
            .terrain_scrolled(self.terrain.offset_y(), self.terrain.grid(), true);
        self.spawn_player();

        self.host.show_text(TextId::Tutorial, TUTORIAL_TEXT);
        self.host.set_text_visible(TextId::Tutorial, true);
        self.host.show_text(TextId::Continue, CONTINUE_TEXT);
        self.host.set_text_visible(TextId::Continue, false);
        self.host.show_text(TextId::GameOver, GAME_OVER_TEXT);
        self.host.set_text_visible(TextId::GameOver, false);

        self.shown_score = None;
        self.shown_timer = None;
        self.refresh_hud();
    }

    fn enter_paused(&mut self) {
        self.state = SessionState::PausedForContinue;
        self.spawner.cancel_waves();
        self.host.set_text_visible(TextId::Continue, true);
        log::info!("Player destroyed at score {}, awaiting continue", self.ledger.score());
    }

    fn enter_over(&mut self) {
        self.state = SessionState::Over;
        self.spawner.cancel_waves();
        self.host.set_text_visible(TextId::Continue, false);
        self.host.set_text_visible(TextId::GameOver, true);
        log::info!("Game over with score {}", self.ledger.score());
    }

    fn spawn_player(&mut self) {
        let id = self.world.next_entity_id();
        let pos = self.player_spawn_point();
        let mut player = Player::new(id, pos, &self.config.player);
        player.attach_visual(self.host.create_visual(VisualKind::Player, pos));
        self.world.player = Some(player);
    }

    fn spawn_enemy(&mut self, order: SpawnOrder) {
        let params = order.params;
        let id = self.world.next_entity_id();
        let mut enemy = EnemyFlying::new(
            id,
            params.ship_kind,
            params.path_id,
            params.speed,
            params.power,
            self.viewport(),
            &self.config.enemy,
            &mut self.rng,
        );
        let kind = VisualKind::Enemy {
            ship_kind: params.ship_kind,
        };
        enemy.attach_visual(self.host.create_visual(kind, enemy.pos));
        log::debug!(
            "Enemy {id} of wave {} spawned on path {} at {:.0}ms",
            order.wave,
            params.path_id,
            order.at_ms
        );
        self.world.enemies.push(enemy);
    }

    fn fire_player_bullet(&mut self, pos: Vec2) {
        let id = self.world.next_entity_id();
        let mut bullet = PlayerBullet::new(id, pos, &self.config.player);
        bullet.attach_visual(self.host.create_visual(VisualKind::PlayerBullet, pos));
        self.world.player_bullets.push(bullet);
    }

    fn fire_enemy_bullet(&mut self, pos: Vec2, power: i32) {
        let id = self.world.next_entity_id();
        let mut bullet = EnemyBullet::new(id, pos, power, &self.config.enemy);
        bullet.attach_visual(
            self.host
                .create_visual(VisualKind::EnemyBullet { power }, pos),
        );
        self.world.enemy_bullets.push(bullet);
    }

    /// Auto-move, per-shot cooldown and the auto-fire timer
    fn update_player(&mut self) {
        let width = self.config.viewport.width;
        let Some(player) = self.world.player.as_mut() else {
            return;
        };
        player.auto_move(width);
        player.cool_down();
        let muzzle = player.muzzle();

        self.bullet_timer -= 1;
        if self.bullet_timer <= 0 {
            self.fire_player_bullet(muzzle);
            self.bullet_timer = self.ledger.fire_cooldown_ticks() as i32;
        }
    }

    fn update_enemies(&mut self) {
        let viewport = self.viewport();
        let fire_range = self.config.enemy.fire_counter_ticks;
        let mut shots = Vec::new();
        let mut finished = Vec::new();

        for enemy in &mut self.world.enemies {
            if !enemy.advance(viewport) {
                finished.push(enemy.id);
                continue;
            }
            let on_screen = !enemy.bounds().is_outside(viewport.x, viewport.y);
            if on_screen && enemy.ready_to_fire(fire_range, &mut self.rng) {
                shots.push((enemy.pos, enemy.power));
            }
        }

        if !finished.is_empty() {
            let host = &mut self.host;
            self.world.enemies.retain(|e| {
                let done = finished.contains(&e.id);
                if done {
                    release(host, e.visual);
                }
                !done
            });
        }
        for (pos, power) in shots {
            self.fire_enemy_bullet(pos, power);
        }
    }

    /// Move bullets and drop the ones that left the screen
    fn update_bullets(&mut self) {
        let Vec2 { x: width, y: height } = self.viewport();
        let host = &mut self.host;

        self.world.player_bullets.retain_mut(|b| {
            b.step();
            let bounds = b.bounds();
            let gone = bounds.bottom() < 0.0 || off_sides(&bounds, width);
            if gone {
                release(host, b.visual);
            }
            !gone
        });
        self.world.enemy_bullets.retain_mut(|b| {
            b.step();
            let bounds = b.bounds();
            let gone = bounds.top() > height || off_sides(&bounds, width);
            if gone {
                release(host, b.visual);
            }
            !gone
        });
    }

    fn resolve_combat(&mut self) {
        let points_per_hit = self.config.scoring.points_per_hit;
        let host = &self.host;
        let outcome = combat::resolve(&mut self.world, points_per_hit, |a, b| host.overlaps(a, b));

        for visual in &outcome.released {
            self.host.destroy_visual(*visual);
        }
        for &pos in &outcome.explosions {
            self.host.create_visual(VisualKind::Explosion, pos);
        }
        if outcome.hits > 0 {
            log::debug!("{} hit(s) for {} points", outcome.hits, outcome.points);
            self.ledger.award(outcome.points);
        }
        for id in &outcome.enemies_destroyed {
            log::debug!("Enemy {id} destroyed");
        }
        if outcome.player_destroyed {
            self.enter_paused();
        }
    }

    fn sync_visuals(&mut self) {
        let host = &mut self.host;
        let world = &self.world;
        let bodies = world
            .player
            .iter()
            .map(|p| (p.visual(), p.position()))
            .chain(world.enemies.iter().map(|e| (e.visual(), e.position())))
            .chain(world.player_bullets.iter().map(|b| (b.visual(), b.position())))
            .chain(world.enemy_bullets.iter().map(|b| (b.visual(), b.position())));
        for (visual, pos) in bodies {
            if let Some(handle) = visual {
                host.set_visual_position(handle, pos);
            }
        }
    }

    /// Re-send score and bullet timer text when their values changed
    fn refresh_hud(&mut self) {
        let score = self.ledger.score();
        if self.shown_score != Some(score) {
            self.host.show_text(TextId::Score, &format!("Score: {score}"));
            self.shown_score = Some(score);
        }

        let ticks = TICKS_PER_SECOND as i32;
        let seconds = if self.bullet_timer <= 0 {
            0
        } else {
            (self.bullet_timer + ticks - 1) / ticks
        };
        if self.shown_timer != Some(seconds) {
            self.host
                .show_text(TextId::BulletTimer, &format!("Bullet Timer: {seconds}"));
            self.shown_timer = Some(seconds);
        }
    }
}

fn release<H: Host>(host: &mut H, visual: Option<VisualHandle>) {
    if let Some(handle) = visual {
        host.destroy_visual(handle);
    }
}

fn off_sides(bounds: &Bounds, width: f32) -> bool {
    bounds.right() < 0.0 || bounds.left() > width
}

impl<H: Host + std::fmt::Debug> std::fmt::Debug for Session<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("score", &self.ledger.score())
            .field("tick_count", &self.tick_count)
            .field("entities", &self.world.entity_count())
            .field("host", &self.host)
            .finish()
    }
}
