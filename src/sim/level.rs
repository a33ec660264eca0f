//! Level layout and population
//!
//! Geometry is fixed; enemy placement is drawn from the run seed so every
//! run with the same seed gets the same level.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::enemy::{Enemy, EnemyKind};
use super::geom::Rect;
use super::lore::{FRAGMENTS, Fragment};
use crate::consts::*;

/// Spacing between enemy spawn slots
pub const ENEMY_SPACING: f32 = 420.0;
/// Random offset applied to each slot
pub const ENEMY_JITTER: f32 = 80.0;
/// First x position that may hold an enemy
pub const FIRST_ENEMY_X: f32 = 600.0;
/// Keep this much clear space on each side of the jammer
const JAMMER_CLEARANCE: f32 = 300.0;

/// One-way platforms
pub const PLATFORMS: [Rect; 13] = [
    Rect::new(420.0, 90.0, 160.0, 16.0),
    Rect::new(700.0, 170.0, 140.0, 16.0),
    Rect::new(1150.0, 110.0, 200.0, 16.0),
    Rect::new(1500.0, 200.0, 120.0, 16.0),
    Rect::new(1900.0, 120.0, 180.0, 16.0),
    Rect::new(2350.0, 90.0, 160.0, 16.0),
    Rect::new(2600.0, 190.0, 160.0, 16.0),
    Rect::new(3500.0, 110.0, 200.0, 16.0),
    Rect::new(3900.0, 180.0, 140.0, 16.0),
    Rect::new(4300.0, 100.0, 180.0, 16.0),
    Rect::new(4700.0, 160.0, 160.0, 16.0),
    Rect::new(5450.0, 140.0, 140.0, 16.0),
    Rect::new(5850.0, 140.0, 140.0, 16.0),
];

/// Respawn positions, in order; the active one is the furthest reached
pub fn checkpoints() -> [f32; 3] {
    [80.0, JAMMER_X + 120.0, BOSS_ARENA_MIN_X + 60.0]
}

/// Fragments placed in the world
pub fn fragments() -> Vec<Fragment> {
    FRAGMENTS.to_vec()
}

/// Place enemies along the level using the run RNG
///
/// Slots run from `FIRST_ENEMY_X` to the boss arena, skipping the area
/// around the jammer. Each slot gets a kind and a jitter from `rng`.
pub fn populate(rng: &mut Pcg32, mut next_id: impl FnMut() -> u32) -> Vec<Enemy> {
    let mut enemies = Vec::new();
    let mut x = FIRST_ENEMY_X;

    while x < BOSS_ARENA_MIN_X - ENEMY_SPACING / 2.0 {
        if (x - JAMMER_X).abs() > JAMMER_CLEARANCE {
            let jitter = rng.random_range(-ENEMY_JITTER..=ENEMY_JITTER);
            let kind = if rng.random_bool(0.45) {
                EnemyKind::Drone
            } else {
                EnemyKind::Crawler
            };
            enemies.push(Enemy::new(next_id(), kind, x + jitter));
        }
        x += ENEMY_SPACING;
    }

    log::info!("Level populated with {} enemies", enemies.len());
    enemies
}

/// Player spawn (feet position)
pub fn player_spawn() -> Vec2 {
    Vec2::new(checkpoints()[0], 0.0)
}
