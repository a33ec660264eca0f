//! Patrol enemies
//!
//! Two kinds: hovering drones that drift toward the player and ground
//! crawlers that pace around their spawn. Both hurt on contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::player::AttackInfo;
use crate::consts::ENEMY_WAKE_DISTANCE;

pub const DRONE_HOVER_Y: f32 = 120.0;
pub const DRONE_BOB: f32 = 24.0;
pub const DRONE_SPEED: f32 = 70.0;
pub const CRAWLER_SPEED: f32 = 60.0;
pub const CRAWLER_PATROL: f32 = 160.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Drone,
    Crawler,
}

impl EnemyKind {
    pub fn max_hp(self) -> i32 {
        match self {
            EnemyKind::Drone => 20,
            EnemyKind::Crawler => 30,
        }
    }

    /// Body size (w, h)
    pub fn size(self) -> (f32, f32) {
        match self {
            EnemyKind::Drone => (30.0, 24.0),
            EnemyKind::Crawler => (36.0, 28.0),
        }
    }
}

/// Outcome of a swing against an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyHit {
    /// Already hit by this swing
    Ignored,
    Damaged,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Feet position (bottom-center)
    pub pos: Vec2,
    /// Patrol anchor
    pub home_x: f32,
    pub hp: i32,
    /// Dormant until the player comes close
    pub awake: bool,
    /// Patrol direction for crawlers
    pub dir: f32,
    last_hit_swing: u32,
    /// Seconds of hit flash left (render only)
    #[serde(default)]
    pub hit_flash: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, x: f32) -> Self {
        let y = match kind {
            EnemyKind::Drone => DRONE_HOVER_Y,
            EnemyKind::Crawler => 0.0,
        };
        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
            home_x: x,
            hp: kind.max_hp(),
            awake: false,
            dir: 1.0,
            last_hit_swing: 0,
            hit_flash: 0.0,
        }
    }

    pub fn body(&self) -> Rect {
        let (w, h) = self.kind.size();
        Rect::from_feet(self.pos, w, h)
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Advance AI by one tick
    pub fn update(&mut self, dt: f32, time_secs: f32, player_center: Vec2) {
        self.hit_flash = (self.hit_flash - dt).max(0.0);

        if !self.awake {
            if (player_center.x - self.pos.x).abs() <= ENEMY_WAKE_DISTANCE {
                self.awake = true;
            } else {
                return;
            }
        }

        match self.kind {
            EnemyKind::Drone => {
                let dx = player_center.x - self.pos.x;
                if dx.abs() > 4.0 {
                    self.dir = dx.signum();
                    self.pos.x += self.dir * DRONE_SPEED * dt;
                }
                // Per-enemy phase so a group does not bob in lockstep
                let phase = self.id as f32 * 1.7;
                self.pos.y = DRONE_HOVER_Y + DRONE_BOB * (time_secs * 2.2 + phase).sin();
            }
            EnemyKind::Crawler => {
                self.pos.x += self.dir * CRAWLER_SPEED * dt;
                if self.pos.x > self.home_x + CRAWLER_PATROL {
                    self.pos.x = self.home_x + CRAWLER_PATROL;
                    self.dir = -1.0;
                } else if self.pos.x < self.home_x - CRAWLER_PATROL {
                    self.pos.x = self.home_x - CRAWLER_PATROL;
                    self.dir = 1.0;
                }
            }
        }
    }

    /// Apply a swing (once per swing)
    pub fn take_hit(&mut self, attack: &AttackInfo) -> EnemyHit {
        if self.is_dead() || attack.swing == self.last_hit_swing {
            return EnemyHit::Ignored;
        }
        self.last_hit_swing = attack.swing;
        self.hp -= attack.damage;
        self.hit_flash = 0.15;
        self.awake = true;
        if self.is_dead() {
            EnemyHit::Killed
        } else {
            EnemyHit::Damaged
        }
    }
}
