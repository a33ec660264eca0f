//! Boss encounter
//!
//! A fixed attack cycle: idle, telegraph, charge across the arena, a
//! vulnerable recovery, then a three-shot volley. Below half health every
//! phase runs faster.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::player::AttackInfo;
use crate::consts::*;

pub const BOSS_WIDTH: f32 = 80.0;
pub const BOSS_HEIGHT: f32 = 110.0;

const IDLE_SECS: f32 = 1.0;
const TELEGRAPH_SECS: f32 = 0.6;
const CHARGE_MAX_SECS: f32 = 1.2;
const RECOVER_SECS: f32 = 1.0;
const VOLLEY_SECS: f32 = 0.5;
/// Duration scale once below half health
const PHASE_TWO_SCALE: f32 = 0.7;

pub const CHARGE_SPEED: f32 = 420.0;
pub const CHARGE_CONTACT_DAMAGE: i32 = 15;
/// Damage multiplier while recovering
pub const RECOVER_VULNERABILITY: i32 = 2;

pub const PROJECTILE_SPEED: f32 = 260.0;
pub const PROJECTILE_DAMAGE: i32 = 8;
pub const PROJECTILE_SIZE: f32 = 12.0;
const PROJECTILE_TTL: f32 = 4.0;
/// Angular spread between volley shots (radians)
const VOLLEY_SPREAD: f32 = 0.25;

/// Boss behaviour state (timers count down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossState {
    /// Waiting for the player to reach the arena
    Dormant,
    Idle { t: f32 },
    Telegraph { t: f32 },
    Charge { t: f32, dir: f32 },
    Recover { t: f32 },
    Volley { t: f32 },
    Defeated,
}

/// Outcome of a swing against the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossHit {
    Ignored,
    Damaged { amount: i32, remaining: i32 },
    Defeated,
}

/// Straight-line boss shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub ttl: f32,
}

impl Projectile {
    pub fn body(&self) -> Rect {
        Rect::from_center(self.pos, PROJECTILE_SIZE, PROJECTILE_SIZE)
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.ttl -= dt;
    }

    pub fn is_alive(&self) -> bool {
        self.ttl > 0.0 && self.pos.y > -PROJECTILE_SIZE && self.pos.x > 0.0 && self.pos.x < LEVEL_WIDTH
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    /// Feet position (bottom-center)
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub state: BossState,
    pub facing: f32,
    last_hit_swing: u32,
    #[serde(default)]
    pub hit_flash: f32,
}

impl Boss {
    pub fn new(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, 0.0),
            hp: BOSS_HP,
            max_hp: BOSS_HP,
            state: BossState::Dormant,
            facing: -1.0,
            last_hit_swing: 0,
            hit_flash: 0.0,
        }
    }

    pub fn body(&self) -> Rect {
        Rect::from_feet(self.pos, BOSS_WIDTH, BOSS_HEIGHT)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, BOSS_HEIGHT / 2.0)
    }

    /// Fighting (not dormant, not defeated)
    pub fn is_engaged(&self) -> bool {
        !matches!(self.state, BossState::Dormant | BossState::Defeated)
    }

    pub fn is_defeated(&self) -> bool {
        self.state == BossState::Defeated
    }

    pub fn phase_two(&self) -> bool {
        self.hp * 2 <= self.max_hp
    }

    fn scale(&self) -> f32 {
        if self.phase_two() { PHASE_TWO_SCALE } else { 1.0 }
    }

    /// Wake up and start the attack cycle
    pub fn activate(&mut self) {
        if self.state == BossState::Dormant {
            self.state = BossState::Idle { t: IDLE_SECS };
            log::info!("Boss engaged");
        }
    }

    /// Advance the attack cycle; returns any projectiles fired this tick
    pub fn update(&mut self, dt: f32, player_center: Vec2, arena_min: f32, arena_max: f32) -> Vec<Projectile> {
        let mut fired = Vec::new();
        self.hit_flash = (self.hit_flash - dt).max(0.0);
        let scale = self.scale();

        self.state = match self.state {
            BossState::Dormant => BossState::Dormant,
            BossState::Defeated => BossState::Defeated,
            BossState::Idle { t } => {
                self.face(player_center);
                let t = t - dt;
                if t <= 0.0 {
                    BossState::Telegraph { t: TELEGRAPH_SECS * scale }
                } else {
                    BossState::Idle { t }
                }
            }
            BossState::Telegraph { t } => {
                let t = t - dt;
                if t <= 0.0 {
                    BossState::Charge {
                        t: CHARGE_MAX_SECS * scale,
                        dir: self.facing,
                    }
                } else {
                    BossState::Telegraph { t }
                }
            }
            BossState::Charge { t, dir } => {
                let half = BOSS_WIDTH / 2.0;
                let min_x = arena_min + half;
                let max_x = arena_max - half;
                let x = self.pos.x + dir * CHARGE_SPEED * dt;
                self.pos.x = x.clamp(min_x, max_x);
                let hit_wall = x <= min_x || x >= max_x;
                let t = t - dt;
                if hit_wall || t <= 0.0 {
                    BossState::Recover { t: RECOVER_SECS * scale }
                } else {
                    BossState::Charge { t, dir }
                }
            }
            BossState::Recover { t } => {
                let t = t - dt;
                if t <= 0.0 {
                    self.face(player_center);
                    fired = self.fire_volley(player_center);
                    BossState::Volley { t: VOLLEY_SECS * scale }
                } else {
                    BossState::Recover { t }
                }
            }
            BossState::Volley { t } => {
                let t = t - dt;
                if t <= 0.0 {
                    BossState::Idle { t: IDLE_SECS * scale }
                } else {
                    BossState::Volley { t }
                }
            }
        };

        fired
    }

    fn face(&mut self, target: Vec2) {
        self.facing = if target.x >= self.pos.x { 1.0 } else { -1.0 };
    }

    fn fire_volley(&self, target: Vec2) -> Vec<Projectile> {
        let origin = self.center();
        let aim = (target - origin).normalize_or(Vec2::new(self.facing, 0.0));
        let base = aim.y.atan2(aim.x);
        [-VOLLEY_SPREAD, 0.0, VOLLEY_SPREAD]
            .into_iter()
            .map(|offset| {
                let angle = base + offset;
                Projectile {
                    pos: origin,
                    vel: Vec2::new(angle.cos(), angle.sin()) * PROJECTILE_SPEED,
                    damage: PROJECTILE_DAMAGE,
                    ttl: PROJECTILE_TTL,
                }
            })
            .collect()
    }

    /// Body contact damage in the current state
    pub fn contact_damage(&self) -> Option<i32> {
        matches!(self.state, BossState::Charge { .. }).then_some(CHARGE_CONTACT_DAMAGE)
    }

    /// Apply a swing (once per swing, doubled while recovering)
    pub fn take_hit(&mut self, attack: &AttackInfo) -> BossHit {
        if !self.is_engaged() || attack.swing == self.last_hit_swing {
            return BossHit::Ignored;
        }
        self.last_hit_swing = attack.swing;

        let amount = if matches!(self.state, BossState::Recover { .. }) {
            attack.damage * RECOVER_VULNERABILITY
        } else {
            attack.damage
        };
        self.hp = (self.hp - amount).max(0);
        self.hit_flash = 0.15;

        if self.hp == 0 {
            self.state = BossState::Defeated;
            log::info!("Boss defeated");
            BossHit::Defeated
        } else {
            BossHit::Damaged {
                amount,
                remaining: self.hp,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::rhythm::HitGrade;

    const ARENA: (f32, f32) = (BOSS_ARENA_MIN_X, LEVEL_WIDTH);

    fn step(boss: &mut Boss, player: Vec2, secs: f32) -> Vec<Projectile> {
        let mut fired = Vec::new();
        let ticks = (secs / SIM_DT).round() as u32;
        for _ in 0..ticks {
            fired.extend(boss.update(SIM_DT, player, ARENA.0, ARENA.1));
        }
        fired
    }

    #[test]
    fn test_dormant_until_activated() {
        let mut boss = Boss::new(BOSS_SPAWN_X);
        step(&mut boss, Vec2::new(5300.0, 24.0), 2.0);
        assert_eq!(boss.state, BossState::Dormant);
        assert_eq!(boss.take_hit(&AttackInfo::new(1, None)), BossHit::Ignored);
    }

    #[test]
    fn test_full_attack_cycle() {
        let player = Vec2::new(5300.0, 24.0);
        let mut boss = Boss::new(BOSS_SPAWN_X);
        boss.activate();

        step(&mut boss, player, 1.05);
        assert!(matches!(boss.state, BossState::Telegraph { .. }));
        assert_eq!(boss.facing, -1.0);

        step(&mut boss, player, 0.65);
        assert!(matches!(boss.state, BossState::Charge { dir, .. } if dir < 0.0));
        assert!(boss.contact_damage().is_some());

        // Charge runs out of time before reaching the far wall
        let before = boss.pos.x;
        step(&mut boss, player, 1.25);
        assert!(matches!(boss.state, BossState::Recover { .. }));
        assert!(boss.pos.x < before - 400.0);
        assert!(boss.contact_damage().is_none());

        let fired = step(&mut boss, player, 1.05);
        assert_eq!(fired.len(), 3);
        assert!(matches!(boss.state, BossState::Volley { .. }));
        assert!(fired.iter().all(|p| p.vel.x < 0.0), "volley aimed at the player");

        step(&mut boss, player, 0.55);
        assert!(matches!(boss.state, BossState::Idle { .. }));
    }

    #[test]
    fn test_charge_stops_at_arena_wall() {
        let mut boss = Boss::new(BOSS_ARENA_MIN_X + 200.0);
        boss.state = BossState::Charge { t: 5.0, dir: -1.0 };
        step(&mut boss, Vec2::new(BOSS_ARENA_MIN_X, 24.0), 1.0);
        assert_eq!(boss.pos.x, BOSS_ARENA_MIN_X + BOSS_WIDTH / 2.0);
        assert!(matches!(boss.state, BossState::Recover { .. }));
    }

    #[test]
    fn test_recovery_doubles_damage_and_phase_two_speeds_up() {
        let mut boss = Boss::new(BOSS_SPAWN_X);
        boss.activate();
        assert_eq!(
            boss.take_hit(&AttackInfo::new(1, None)),
            BossHit::Damaged { amount: 10, remaining: 290 }
        );

        boss.state = BossState::Recover { t: 1.0 };
        assert_eq!(
            boss.take_hit(&AttackInfo::new(2, Some(HitGrade::Excellent))),
            BossHit::Damaged { amount: 60, remaining: 230 }
        );
        assert!(!boss.phase_two());

        boss.hp = 150;
        assert!(boss.phase_two());
        boss.state = BossState::Volley { t: 0.0 };
        boss.update(SIM_DT, Vec2::new(5300.0, 24.0), ARENA.0, ARENA.1);
        assert_eq!(boss.state, BossState::Idle { t: IDLE_SECS * PHASE_TWO_SCALE });
    }

    #[test]
    fn test_defeat() {
        let mut boss = Boss::new(BOSS_SPAWN_X);
        boss.activate();
        boss.hp = 5;
        assert_eq!(boss.take_hit(&AttackInfo::new(1, None)), BossHit::Defeated);
        assert!(boss.is_defeated());
        assert!(boss.update(SIM_DT, Vec2::ZERO, ARENA.0, ARENA.1).is_empty());
    }

    #[test]
    fn test_projectiles_expire() {
        let mut p = Projectile {
            pos: Vec2::new(5500.0, 60.0),
            vel: Vec2::new(-PROJECTILE_SPEED, 0.0),
            damage: PROJECTILE_DAMAGE,
            ttl: 0.5,
        };
        p.update(0.25);
        assert!(p.is_alive());
        p.update(0.3);
        assert!(!p.is_alive());
    }
}
