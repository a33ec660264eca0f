//! Visual particles
//!
//! Not gameplay-affecting. Jitter comes from an integer hash of the tick
//! and particle index so bursts are stable without touching the run RNG.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rhythm::HitGrade;
use crate::{hash_u32, hash_unit};

/// Maximum live particles
pub const MAX_PARTICLES: usize = 512;
const PARTICLE_GRAVITY: f32 = 600.0;
const PARTICLE_DRAG: f32 = 0.98;

/// Palette slot the host maps to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Excellent,
    Perfect,
    Good,
    Miss,
    Spark,
    Debris,
    Data,
    Pulse,
}

impl From<HitGrade> for ParticleKind {
    fn from(grade: HitGrade) -> Self {
        match grade {
            HitGrade::Excellent => ParticleKind::Excellent,
            HitGrade::Perfect => ParticleKind::Perfect,
            HitGrade::Good => ParticleKind::Good,
            HitGrade::Miss => ParticleKind::Miss,
        }
    }
}

impl ParticleKind {
    /// Whether gravity pulls this kind down
    fn falls(self) -> bool {
        matches!(self, ParticleKind::Debris | ParticleKind::Spark)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Emit `count` particles radiating from `pos`
pub fn spawn_burst(particles: &mut Vec<Particle>, pos: Vec2, kind: ParticleKind, count: u32, tick: u64) {
    for j in 0..count {
        if particles.len() >= MAX_PARTICLES {
            // Drop the oldest to make room
            particles.remove(0);
        }
        let hash = hash_u32(tick as u32, j);
        let rand1 = hash_unit(hash);
        let rand2 = hash_unit(hash >> 10);
        let rand3 = hash_unit(hash >> 20);

        let angle = rand1 * std::f32::consts::TAU;
        let speed = 80.0 + rand2 * 180.0;
        particles.push(Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            kind,
            life: 0.5 + rand3 * 0.5,
            size: 2.0 + rand2 * 3.0,
        });
    }
}

/// Integrate and age particles, dropping dead ones
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for particle in particles.iter_mut() {
        if particle.kind.falls() {
            particle.vel.y -= PARTICLE_GRAVITY * dt;
        }
        particle.vel *= PARTICLE_DRAG;
        particle.pos += particle.vel * dt;
        particle.life -= dt * 1.5;
        particle.size *= 0.995;
    }
    particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_stable_for_same_tick() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        spawn_burst(&mut a, Vec2::ZERO, ParticleKind::Spark, 12, 77);
        spawn_burst(&mut b, Vec2::ZERO, ParticleKind::Spark, 12, 77);
        assert_eq!(a.len(), 12);
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.vel, pb.vel);
        }
    }

    #[test]
    fn test_cap_and_decay() {
        let mut particles = Vec::new();
        spawn_burst(&mut particles, Vec2::ZERO, ParticleKind::Data, 600, 1);
        assert_eq!(particles.len(), MAX_PARTICLES);

        for _ in 0..120 {
            update_particles(&mut particles, 1.0 / 60.0);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_grade_maps_to_kind() {
        assert_eq!(ParticleKind::from(HitGrade::Miss), ParticleKind::Miss);
        assert_eq!(ParticleKind::from(HitGrade::Excellent), ParticleKind::Excellent);
    }
}
