//! Combat resolution
//!
//! One pass per tick over three pairings, in order: enemy bullets against the
//! player, player bullets against enemies, enemies against the player. An
//! entity destroyed earlier in the pass takes no further part in it.

use glam::Vec2;

use super::collision::Bounds;
use super::entity::{Body, EntityId, World};
use crate::host::VisualHandle;

/// Everything a combat pass changed, for the session to act on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatOutcome {
    /// Points earned by player-bullet hits, `points_per_hit` each
    pub points: u32,
    pub hits: u32,
    pub enemies_destroyed: Vec<EntityId>,
    /// Explosion effects to request
    pub explosions: Vec<Vec2>,
    /// Visuals of entities removed this pass
    pub released: Vec<VisualHandle>,
    pub player_destroyed: bool,
}

impl CombatOutcome {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Run one overlap pass and remove whatever died
pub fn resolve<F>(world: &mut World, points_per_hit: u32, overlaps: F) -> CombatOutcome
where
    F: Fn(&Bounds, &Bounds) -> bool,
{
    let mut outcome = CombatOutcome::default();
    let mut enemy_bullet_dead = vec![false; world.enemy_bullets.len()];
    let mut player_bullet_dead = vec![false; world.player_bullets.len()];
    let mut enemy_dead = vec![false; world.enemies.len()];

    // Enemy bullets vs player
    for (bullet, dead) in world.enemy_bullets.iter().zip(enemy_bullet_dead.iter_mut()) {
        let Some(player) = world.player.as_mut() else {
            break;
        };
        if !overlaps(&bullet.bounds(), &player.bounds()) {
            continue;
        }
        *dead = true;
        outcome.explosions.push(bullet.pos);
        if player.hit(bullet.power) {
            outcome.player_destroyed = true;
            break;
        }
    }
    if outcome.player_destroyed {
        destroy_player(world, &mut outcome);
    }

    // Player bullets vs enemies
    for (bullet, bullet_dead) in world.player_bullets.iter().zip(player_bullet_dead.iter_mut()) {
        let bounds = bullet.bounds();
        for (enemy, dead) in world.enemies.iter_mut().zip(enemy_dead.iter_mut()) {
            if *dead || !overlaps(&bounds, &enemy.bounds()) {
                continue;
            }
            *bullet_dead = true;
            outcome.hits += 1;
            outcome.points += points_per_hit;
            if enemy.hit(bullet.power) {
                *dead = true;
                outcome.enemies_destroyed.push(enemy.id);
                outcome.explosions.push(enemy.pos);
            }
            break;
        }
    }

    // Enemies vs player
    if !outcome.player_destroyed {
        for (enemy, dead) in world.enemies.iter().zip(enemy_dead.iter_mut()) {
            let Some(player) = world.player.as_mut() else {
                break;
            };
            if *dead || !overlaps(&enemy.bounds(), &player.bounds()) {
                continue;
            }
            *dead = true;
            outcome.explosions.push(enemy.pos);
            if player.hit(enemy.power) {
                outcome.player_destroyed = true;
                break;
            }
        }
        if outcome.player_destroyed {
            destroy_player(world, &mut outcome);
        }
    }

    outcome.released.extend(sweep(&mut world.enemy_bullets, &enemy_bullet_dead));
    outcome.released.extend(sweep(&mut world.player_bullets, &player_bullet_dead));
    outcome.released.extend(sweep(&mut world.enemies, &enemy_dead));
    outcome
}

fn destroy_player(world: &mut World, outcome: &mut CombatOutcome) {
    if let Some(player) = world.player.take() {
        log::debug!("Player {} destroyed", player.id);
        outcome.explosions.push(player.pos);
        outcome.released.extend(player.visual);
    }
}

/// Remove flagged entries, returning their visuals
fn sweep<T: Body>(items: &mut Vec<T>, dead: &[bool]) -> Vec<VisualHandle> {
    let mut released = Vec::new();
    let mut flags = dead.iter();
    items.retain(|item| {
        let remove = flags.next().copied().unwrap_or(false);
        if remove {
            released.extend(item.visual());
        }
        !remove
    });
    released
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyConfig, PlayerConfig};
    use crate::sim::entity::{EnemyBullet, EnemyFlying, Player, PlayerBullet};
    use crate::sim::rng::WeightedRng;

    fn world_with_player() -> World {
        let mut world = World::new();
        let id = world.next_entity_id();
        world.player = Some(Player::new(id, Vec2::new(640.0, 620.0), &PlayerConfig::default()));
        world
    }

    fn enemy(world: &mut World, pos: Vec2, power: i32) -> EntityId {
        let mut rng = WeightedRng::new(1);
        let id = world.next_entity_id();
        let viewport = Vec2::new(1280.0, 720.0);
        let mut enemy = EnemyFlying::new(id, 0, 0, 0.001, power, viewport, &EnemyConfig::default(), &mut rng);
        enemy.pos = pos;
        world.enemies.push(enemy);
        id
    }

    fn player_bullet(world: &mut World, pos: Vec2, power: i32) {
        let id = world.next_entity_id();
        let mut bullet = PlayerBullet::new(id, pos, &PlayerConfig::default());
        bullet.power = power;
        world.player_bullets.push(bullet);
    }

    fn enemy_bullet(world: &mut World, pos: Vec2, power: i32) {
        let id = world.next_entity_id();
        world
            .enemy_bullets
            .push(EnemyBullet::new(id, pos, power, &EnemyConfig::default()));
    }

    #[test]
    fn test_bullet_damages_enemy_without_killing() {
        let mut world = world_with_player();
        enemy(&mut world, Vec2::new(200.0, 200.0), 3);
        player_bullet(&mut world, Vec2::new(200.0, 210.0), 1);

        let outcome = resolve(&mut world, 10, |a, b| a.overlaps(b));
        assert_eq!(outcome.points, 10);
        assert!(outcome.enemies_destroyed.is_empty());
        assert_eq!(world.enemies[0].power, 2);
        assert!(world.player_bullets.is_empty());
    }

    #[test]
    fn test_enemy_destroyed_once_under_simultaneous_hits() {
        let mut world = world_with_player();
        let id = enemy(&mut world, Vec2::new(200.0, 200.0), 2);
        player_bullet(&mut world, Vec2::new(200.0, 205.0), 2);
        player_bullet(&mut world, Vec2::new(205.0, 200.0), 2);

        let outcome = resolve(&mut world, 10, |a, b| a.overlaps(b));
        assert_eq!(outcome.enemies_destroyed, vec![id]);
        assert_eq!(outcome.hits, 1);
        assert_eq!(outcome.points, 10);
        assert_eq!(outcome.explosions.len(), 1);
        assert!(world.enemies.is_empty());
        // The second bullet found nothing left to hit and keeps flying
        assert_eq!(world.player_bullets.len(), 1);
    }

    #[test]
    fn test_each_overlapping_bullet_scores_while_enemy_survives() {
        let mut world = world_with_player();
        enemy(&mut world, Vec2::new(200.0, 200.0), 3);
        player_bullet(&mut world, Vec2::new(200.0, 205.0), 1);
        player_bullet(&mut world, Vec2::new(205.0, 200.0), 2);

        let outcome = resolve(&mut world, 10, |a, b| a.overlaps(b));
        assert_eq!(outcome.points, 20);
        assert_eq!(outcome.enemies_destroyed.len(), 1);
        assert!(world.player_bullets.is_empty());
    }

    #[test]
    fn test_enemy_bullet_hurts_player() {
        let mut world = world_with_player();
        enemy_bullet(&mut world, Vec2::new(640.0, 600.0), 3);

        let outcome = resolve(&mut world, 10, |a, b| a.overlaps(b));
        assert!(!outcome.player_destroyed);
        assert_eq!(world.player.as_ref().map(|p| p.health), Some(5));
        assert!(world.enemy_bullets.is_empty());
        assert_eq!(outcome.explosions, vec![Vec2::new(640.0, 600.0)]);
    }

    #[test]
    fn test_lethal_collision_destroys_player() {
        let mut world = world_with_player();
        if let Some(player) = world.player.as_mut() {
            player.health = 2;
        }
        enemy(&mut world, Vec2::new(650.0, 610.0), 4);
        enemy_bullet(&mut world, Vec2::new(640.0, 600.0), 1);

        let outcome = resolve(&mut world, 10, |a, b| a.overlaps(b));
        assert!(outcome.player_destroyed);
        assert!(world.player.is_none());
        assert!(world.enemies.is_empty());
        // Bullet, enemy and player explosions
        assert_eq!(outcome.explosions.len(), 3);
    }

    #[test]
    fn test_no_overlap_no_outcome() {
        let mut world = world_with_player();
        enemy(&mut world, Vec2::new(100.0, 100.0), 2);
        player_bullet(&mut world, Vec2::new(900.0, 400.0), 1);
        enemy_bullet(&mut world, Vec2::new(100.0, 300.0), 1);

        let outcome = resolve(&mut world, 10, |a, b| a.overlaps(b));
        assert!(outcome.is_empty());
        assert_eq!(world.entity_count(), 4);
    }

    #[test]
    fn test_custom_overlap_predicate() {
        let mut world = world_with_player();
        enemy(&mut world, Vec2::new(100.0, 100.0), 1);
        player_bullet(&mut world, Vec2::new(900.0, 400.0), 1);

        // Host physics that reports everything as overlapping
        let outcome = resolve(&mut world, 10, |_, _| true);
        assert_eq!(outcome.points, 10);
        // The enemy died to the bullet before it could ram the player
        assert!(!outcome.player_destroyed);
        assert!(world.player.is_some());
    }
}
