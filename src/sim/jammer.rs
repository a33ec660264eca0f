//! Broadcast jammer
//!
//! A stationary barrier that only yields to on-beat strikes. While it
//! stands the player cannot pass it, and it periodically emits a damaging
//! pulse. All jammer state is owned here; other systems only call
//! `take_hit`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::player::AttackInfo;
use crate::consts::*;

pub const JAMMER_WIDTH: f32 = 64.0;
pub const JAMMER_HEIGHT: f32 = 140.0;
const PULSE_AGE_CAP: f32 = 60.0;

/// Outcome of a swing against the jammer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JammerHit {
    /// Out of reach, already hit by this swing, or already destroyed
    Ignored,
    /// Swing was not on the beat
    Deflected,
    Damaged { remaining: i32 },
    Destroyed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jammer {
    /// Feet position (bottom-center)
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    /// Seconds until the next pulse
    pub pulse_timer: f32,
    /// Seconds since the last pulse (render only)
    #[serde(default)]
    pub pulse_age: f32,
    pub destroyed: bool,
    last_hit_swing: u32,
}

impl Jammer {
    pub fn new(x: f32) -> Self {
        Self {
            pos: Vec2::new(x, 0.0),
            hp: JAMMER_HP,
            max_hp: JAMMER_HP,
            pulse_timer: JAMMER_PULSE_SECS,
            pulse_age: PULSE_AGE_CAP,
            destroyed: false,
            last_hit_swing: 0,
        }
    }

    pub fn body(&self) -> Rect {
        Rect::from_feet(self.pos, JAMMER_WIDTH, JAMMER_HEIGHT)
    }

    pub fn is_active(&self) -> bool {
        !self.destroyed
    }

    /// Furthest x the player may reach while the jammer stands
    pub fn barrier_x(&self) -> Option<f32> {
        self.is_active().then(|| self.pos.x - JAMMER_WIDTH / 2.0)
    }

    /// Advance the pulse timer; true when a pulse fires this tick
    pub fn update(&mut self, dt: f32) -> bool {
        if self.destroyed {
            return false;
        }
        self.pulse_age = (self.pulse_age + dt).min(PULSE_AGE_CAP);
        self.pulse_timer -= dt;
        if self.pulse_timer <= 0.0 {
            self.pulse_timer += JAMMER_PULSE_SECS;
            self.pulse_age = 0.0;
            return true;
        }
        false
    }

    /// Whether a point is caught by a pulse
    pub fn in_pulse_range(&self, p: Vec2) -> bool {
        self.body().distance_to(p) <= JAMMER_PULSE_RADIUS
    }

    /// Apply a swing; only on-beat swings do damage
    pub fn take_hit(&mut self, attack: &AttackInfo) -> JammerHit {
        if self.destroyed || attack.swing == self.last_hit_swing {
            return JammerHit::Ignored;
        }
        self.last_hit_swing = attack.swing;

        if !attack.is_on_beat() {
            return JammerHit::Deflected;
        }

        self.hp = (self.hp - attack.damage).max(0);
        if self.hp == 0 {
            self.destroyed = true;
            log::info!("Jammer destroyed");
            JammerHit::Destroyed
        } else {
            JammerHit::Damaged { remaining: self.hp }
        }
    }
}
