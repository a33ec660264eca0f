//! The player character
//!
//! Side-scrolling platformer body with a melee swing. Rhythm grading is
//! decided by the caller (see `tick`); the player only carries the result.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, is_supported, resolve_landing};
use super::rhythm::HitGrade;
use crate::consts::*;

/// A melee swing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackInfo {
    /// Increments per swing so targets take damage once per swing
    pub swing: u32,
    pub damage: i32,
    /// Rhythm grade when the swing was judged on the beat
    pub rhythm: Option<HitGrade>,
}

impl AttackInfo {
    pub fn new(swing: u32, rhythm: Option<HitGrade>) -> Self {
        let multiplier = rhythm.map(HitGrade::damage_multiplier).unwrap_or(1.0);
        Self {
            swing,
            damage: (ATTACK_BASE_DAMAGE as f32 * multiplier).round() as i32,
            rhythm,
        }
    }

    /// Landed inside a good-or-better window
    pub fn is_on_beat(&self) -> bool {
        self.rhythm.is_some_and(HitGrade::is_hit)
    }
}

/// What happened during a movement step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveReport {
    pub jumped: bool,
    pub landed: bool,
    /// Horizontal distance covered
    pub travelled: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Feet position (bottom-center)
    pub pos: Vec2,
    pub vel: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub on_ground: bool,
    pub health: i32,
    /// Seconds of invulnerability left
    pub invuln: f32,
    pub attack_cooldown: f32,
    /// Seconds the current swing stays active
    pub attack_timer: f32,
    pub attack: Option<AttackInfo>,
    swing_counter: u32,
    /// Total horizontal distance walked this run
    pub travelled: f32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            facing: 1.0,
            on_ground: true,
            health: PLAYER_MAX_HEALTH,
            invuln: 0.0,
            attack_cooldown: 0.0,
            attack_timer: 0.0,
            attack: None,
            swing_counter: 0,
            travelled: 0.0,
        }
    }

    pub fn body(&self) -> Rect {
        Rect::from_feet(self.pos, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, PLAYER_HEIGHT / 2.0)
    }

    /// Integrate movement for one tick
    ///
    /// `min_x`/`max_x` bound the feet position (level edges, jammer
    /// barrier, boss arena wall).
    pub fn step(
        &mut self,
        move_x: f32,
        jump: bool,
        dt: f32,
        platforms: &[Rect],
        min_x: f32,
        max_x: f32,
    ) -> MoveReport {
        let mut report = MoveReport::default();
        let move_x = move_x.clamp(-1.0, 1.0);

        // Knockback decays into normal control
        let target_vx = move_x * PLAYER_RUN_SPEED;
        if self.invuln > INVULN_SECS * 0.7 {
            self.vel.x = crate::approach(self.vel.x, target_vx, 4.0, dt);
        } else {
            self.vel.x = target_vx;
        }
        if move_x != 0.0 {
            self.facing = move_x.signum();
        }

        if jump && self.on_ground {
            self.vel.y = PLAYER_JUMP_SPEED;
            self.on_ground = false;
            report.jumped = true;
        }

        self.vel.y = (self.vel.y - GRAVITY * dt).max(-MAX_FALL_SPEED);

        let half_width = PLAYER_WIDTH / 2.0;
        let prev = self.pos;
        self.pos += self.vel * dt;
        self.pos.x = self.pos.x.clamp(min_x + half_width, max_x - half_width);
        report.travelled = (self.pos.x - prev.x).abs();
        self.travelled += report.travelled;

        if self.vel.y <= 0.0 {
            if let Some(landing) = resolve_landing(prev.y, self.pos, half_width, platforms) {
                self.pos.y = landing.surface_y;
                self.vel.y = 0.0;
                report.landed = !self.on_ground;
                self.on_ground = true;
            } else {
                self.on_ground = false;
            }
        } else {
            self.on_ground = false;
        }

        // Walked off a ledge
        if self.on_ground && !is_supported(self.pos, half_width, platforms) {
            self.on_ground = false;
        }

        report
    }

    /// Count down invulnerability and attack timers
    pub fn tick_timers(&mut self, dt: f32) {
        self.invuln = (self.invuln - dt).max(0.0);
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        if self.attack_timer > 0.0 {
            self.attack_timer -= dt;
            if self.attack_timer <= 0.0 {
                self.attack_timer = 0.0;
                self.attack = None;
            }
        }
    }

    pub fn can_attack(&self) -> bool {
        self.attack_cooldown <= 0.0
    }

    /// Start a swing; returns the attack descriptor
    pub fn begin_attack(&mut self, rhythm: Option<HitGrade>) -> AttackInfo {
        self.swing_counter += 1;
        let info = AttackInfo::new(self.swing_counter, rhythm);
        self.attack = Some(info);
        self.attack_timer = ATTACK_ACTIVE_SECS;
        self.attack_cooldown = ATTACK_COOLDOWN_SECS;
        info
    }

    /// Active swing hitbox in front of the player
    pub fn attack_hitbox(&self) -> Option<Rect> {
        self.attack?;
        let half_width = PLAYER_WIDTH / 2.0;
        let x = if self.facing >= 0.0 {
            self.pos.x + half_width
        } else {
            self.pos.x - half_width - ATTACK_REACH
        };
        Some(Rect::new(x, self.pos.y + 6.0, ATTACK_REACH, ATTACK_HEIGHT))
    }

    /// Apply damage from a source at `from_x`; false while invulnerable
    pub fn apply_damage(&mut self, amount: i32, from_x: f32) -> bool {
        if self.invuln > 0.0 || amount <= 0 || self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).max(0);
        self.invuln = INVULN_SECS;
        let away = if self.pos.x >= from_x { 1.0 } else { -1.0 };
        self.vel = Vec2::new(away * KNOCKBACK_SPEED, KNOCKBACK_SPEED * 0.6);
        self.on_ground = false;
        true
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Restore at a checkpoint with full health
    pub fn respawn(&mut self, x: f32) {
        self.pos = Vec2::new(x, 0.0);
        self.vel = Vec2::ZERO;
        self.health = PLAYER_MAX_HEALTH;
        self.invuln = INVULN_SECS;
        self.on_ground = true;
        self.attack = None;
        self.attack_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn run(player: &mut Player, move_x: f32, jump: bool, ticks: u32) {
        for _ in 0..ticks {
            player.tick_timers(SIM_DT);
            player.step(move_x, jump, SIM_DT, &[], 0.0, LEVEL_WIDTH);
        }
    }

    #[test]
    fn test_runs_and_faces_direction() {
        let mut player = Player::new(Vec2::new(300.0, 0.0));
        run(&mut player, -1.0, false, 60);
        assert!((player.pos.x - (300.0 - PLAYER_RUN_SPEED * 0.5)).abs() < 1.0);
        assert_eq!(player.facing, -1.0);
        assert!(player.on_ground);
    }

    #[test]
    fn test_jump_lands_back_on_floor() {
        let mut player = Player::new(Vec2::new(100.0, 0.0));
        let report = player.step(0.0, true, SIM_DT, &[], 0.0, LEVEL_WIDTH);
        assert!(report.jumped);
        assert!(!player.on_ground);

        let mut landed = false;
        for _ in 0..240 {
            landed |= player.step(0.0, false, SIM_DT, &[], 0.0, LEVEL_WIDTH).landed;
        }
        assert!(landed);
        assert!(player.on_ground);
        assert_eq!(player.pos.y, 0.0);
    }

    #[test]
    fn test_lands_on_platform() {
        let platforms = [Rect::new(60.0, 60.0, 100.0, 16.0)];
        let mut player = Player::new(Vec2::new(100.0, 0.0));
        player.step(0.0, true, SIM_DT, &platforms, 0.0, LEVEL_WIDTH);
        for _ in 0..240 {
            player.step(0.0, false, SIM_DT, &platforms, 0.0, LEVEL_WIDTH);
        }
        assert!(player.on_ground);
        assert_eq!(player.pos.y, 76.0);
    }

    #[test]
    fn test_clamped_by_barrier() {
        let mut player = Player::new(Vec2::new(100.0, 0.0));
        for _ in 0..240 {
            player.step(1.0, false, SIM_DT, &[], 0.0, 200.0);
        }
        assert_eq!(player.pos.x, 200.0 - PLAYER_WIDTH / 2.0);
    }

    #[test]
    fn test_attack_cooldown_and_damage_scaling() {
        let mut player = Player::new(Vec2::new(100.0, 0.0));
        assert!(player.can_attack());
        let plain = player.begin_attack(None);
        assert_eq!(plain.damage, ATTACK_BASE_DAMAGE);
        assert!(!player.can_attack());
        assert!(player.attack_hitbox().unwrap().min.x > player.pos.x);

        run(&mut player, 0.0, false, 40);
        assert!(player.can_attack());
        assert!(player.attack_hitbox().is_none());

        let excellent = player.begin_attack(Some(HitGrade::Excellent));
        assert_eq!(excellent.damage, 30);
        assert!(excellent.is_on_beat());
        assert!(excellent.swing > plain.swing);
        assert!(!AttackInfo::new(9, Some(HitGrade::Miss)).is_on_beat());
    }

    #[test]
    fn test_invulnerability_blocks_repeat_damage() {
        let mut player = Player::new(Vec2::new(100.0, 0.0));
        assert!(player.apply_damage(10, 150.0));
        assert_eq!(player.health, 90);
        assert!(player.vel.x < 0.0, "knocked away from the source");
        assert!(!player.apply_damage(10, 150.0));

        run(&mut player, 0.0, false, 130);
        assert!(player.apply_damage(95, 150.0));
        assert!(player.is_dead());

        player.respawn(80.0);
        assert_eq!(player.health, PLAYER_MAX_HEALTH);
        assert_eq!(player.pos, Vec2::new(80.0, 0.0));
    }
}
