//! BARCODE: System Override - rhythm-combat side-scroller
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rhythm engine, physics, enemies, bosses)
//! - `view`: Serializable per-frame snapshot handed to the host page
//! - `platform`: Browser/native platform abstraction (input, storage)
//! - `persistence`: Versioned save envelope
//! - `settings` / `highscores`: Player preferences and leaderboard

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod view;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz, fine enough for 45 ms hit windows)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (y-up, floor at y = 0)
    pub const LEVEL_WIDTH: f32 = 6400.0;
    pub const VIEW_WIDTH: f32 = 960.0;
    pub const VIEW_HEIGHT: f32 = 540.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 28.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    pub const PLAYER_RUN_SPEED: f32 = 240.0;
    pub const PLAYER_JUMP_SPEED: f32 = 560.0;
    pub const GRAVITY: f32 = 1500.0;
    pub const MAX_FALL_SPEED: f32 = 900.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    pub const PLAYER_LIVES: u8 = 3;
    /// Seconds of invulnerability after taking damage
    pub const INVULN_SECS: f32 = 1.0;
    pub const KNOCKBACK_SPEED: f32 = 260.0;

    /// Melee attack
    pub const ATTACK_COOLDOWN_SECS: f32 = 0.30;
    pub const ATTACK_ACTIVE_SECS: f32 = 0.12;
    pub const ATTACK_REACH: f32 = 44.0;
    pub const ATTACK_HEIGHT: f32 = 36.0;
    pub const ATTACK_BASE_DAMAGE: i32 = 10;

    /// Enemies
    pub const ENEMY_CONTACT_DAMAGE: i32 = 10;
    pub const ENEMY_WAKE_DISTANCE: f32 = 900.0;
    pub const ENEMY_KILL_POINTS: u64 = 50;

    /// Jammer
    pub const JAMMER_X: f32 = 3200.0;
    pub const JAMMER_HP: i32 = 100;
    pub const JAMMER_PULSE_SECS: f32 = 3.0;
    pub const JAMMER_PULSE_RADIUS: f32 = 140.0;
    pub const JAMMER_PULSE_DAMAGE: i32 = 6;
    pub const JAMMER_POINTS: u64 = 1000;

    /// Boss
    pub const BOSS_TRIGGER_X: f32 = 5200.0;
    pub const BOSS_ARENA_MIN_X: f32 = 5100.0;
    pub const BOSS_SPAWN_X: f32 = 6000.0;
    pub const BOSS_HP: i32 = 300;
    pub const BOSS_POINTS: u64 = 5000;

    /// Lore fragments
    pub const FRAGMENT_POINTS: u64 = 250;

    /// Camera follow rate (1/s)
    pub const CAMERA_FOLLOW_RATE: f32 = 8.0;
}

/// Exponential approach of `current` toward `target` at `rate` per second
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Integer hash used for cosmetic jitter (stable across platforms)
#[inline]
pub fn hash_u32(a: u32, b: u32) -> u32 {
    a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(7919))
}

/// Map a hash to [0, 1)
#[inline]
pub fn hash_unit(hash: u32) -> f32 {
    (hash % 1000) as f32 / 1000.0
}
