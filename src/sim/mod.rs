//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod cutscene;
pub mod enemy;
pub mod geom;
pub mod jammer;
pub mod level;
pub mod lore;
pub mod objectives;
pub mod particles;
pub mod player;
pub mod rhythm;
pub mod state;
pub mod tick;
pub mod tutorial;

pub use boss::{Boss, BossState, Projectile};
pub use cutscene::{ActiveCutscene, CutsceneId};
pub use enemy::{Enemy, EnemyKind};
pub use geom::Rect;
pub use jammer::Jammer;
pub use lore::{LoreLog, WorldFragment};
pub use objectives::{ObjectiveKind, Objectives};
pub use particles::{Particle, ParticleKind};
pub use player::Player;
pub use rhythm::{HitGrade, RhythmConfig, RhythmPhase, RhythmSystem};
pub use state::{GameEvent, GamePhase, GameState, RunOptions};
pub use tick::{TickInput, tick};
pub use tutorial::{Tutorial, TutorialStep};
