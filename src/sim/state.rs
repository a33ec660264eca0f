//! Game state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, Projectile};
use super::cutscene::{ActiveCutscene, CutsceneId};
use super::enemy::{Enemy, EnemyKind};
use super::jammer::Jammer;
use super::level;
use super::lore::{LoreLog, WorldFragment};
use super::objectives::{ObjectiveKind, Objectives};
use super::particles::Particle;
use super::player::Player;
use super::rhythm::{HitGrade, RhythmConfig, RhythmSystem};
use super::tutorial::{Tutorial, TutorialStep};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// A cutscene owns the screen; the world is frozen
    Cutscene,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Out of lives
    GameOver,
    /// Boss defeated and outro finished
    Victory,
}

/// Things that happened during a tick
///
/// Drained by the platform layer each frame for audio cues and by the
/// tutorial/objective trackers inside the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    CutsceneStarted { id: CutsceneId },
    CutsceneFinished { id: CutsceneId },
    RhythmToggled { on: bool },
    Beat { index: u32, establishing: bool },
    TempoEstablished,
    RhythmHit { grade: HitGrade, combo: u32, points: u64 },
    RhythmMiss { combo_lost: u32 },
    AttackStarted { on_beat: bool },
    PlayerJumped,
    PlayerDamaged { amount: i32, health: i32 },
    PlayerDied { lives_left: u8 },
    EnemyHit { id: u32 },
    EnemyKilled { id: u32, kind: EnemyKind, points: u64 },
    JammerHit { remaining: i32 },
    JammerDeflected,
    JammerPulse,
    JammerDestroyed,
    BossActivated,
    BossHit { remaining: i32 },
    BossDefeated,
    FragmentCollected { id: u32, first_time: bool },
    ObjectiveCompleted { objective: ObjectiveKind },
    TutorialAdvanced { step: TutorialStep },
    GameOver,
    Victory,
}

/// PCG stream used for level population
const RNG_STREAM: u64 = 1;

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, RNG_STREAM)
    }
}

/// Per-run options taken from settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    pub tutorial: bool,
    /// Latency calibration added to rhythm inputs
    pub input_offset_ms: f64,
    pub rhythm: RhythmConfig,
    pub skip_intro: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tutorial: true,
            input_offset_ms: 0.0,
            rhythm: RhythmConfig::default(),
            skip_intro: false,
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG state
    pub rng_state: RngState,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Furthest checkpoint reached (index into `level::checkpoints`)
    pub checkpoint: usize,
    pub input_offset_ms: f64,
    pub player: Player,
    pub rhythm: RhythmSystem,
    /// Active enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    pub jammer: Jammer,
    pub boss: Boss,
    pub projectiles: Vec<Projectile>,
    pub fragments: Vec<WorldFragment>,
    pub lore: LoreLog,
    pub tutorial: Tutorial,
    pub objectives: Objectives,
    pub cutscene: Option<ActiveCutscene>,
    /// Boss arena entered (walls up)
    pub boss_triggered: bool,
    /// Left edge of the view in world units
    pub camera_x: f32,
    /// 0-1, decays each tick
    pub screen_shake: f32,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_options(seed, &RunOptions::default())
    }

    pub fn with_options(seed: u64, options: &RunOptions) -> Self {
        let rng_state = RngState::new(seed);
        let rhythm_config = match options.rhythm.validate() {
            Ok(()) => options.rhythm.clone(),
            Err(e) => {
                log::warn!("Invalid rhythm config ({}), using defaults", e);
                RhythmConfig::default()
            }
        };
        let mut state = Self {
            seed,
            rng_state,
            phase: GamePhase::Playing,
            score: 0,
            lives: PLAYER_LIVES,
            time_ticks: 0,
            checkpoint: 0,
            input_offset_ms: options.input_offset_ms.clamp(-200.0, 200.0),
            player: Player::new(level::player_spawn()),
            rhythm: RhythmSystem::new(rhythm_config),
            enemies: Vec::new(),
            jammer: Jammer::new(JAMMER_X),
            boss: Boss::new(BOSS_SPAWN_X),
            projectiles: Vec::new(),
            fragments: level::fragments().iter().map(WorldFragment::from).collect(),
            lore: LoreLog::new(),
            tutorial: Tutorial::new(options.tutorial),
            objectives: Objectives::new(),
            cutscene: None,
            boss_triggered: false,
            camera_x: 0.0,
            screen_shake: 0.0,
            particles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };

        let mut rng = state.rng_state.to_rng();
        let enemies = level::populate(&mut rng, || state.next_entity_id());
        state.enemies = enemies;

        if !options.skip_intro {
            state.start_cutscene(CutsceneId::Intro);
        }

        state
    }

    /// Carry over the persistent lore log from an earlier run
    pub fn with_lore(mut self, lore: LoreLog) -> Self {
        self.lore = lore;
        self
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        if self.phase != to {
            let from = self.phase;
            self.phase = to;
            log::info!("Phase {:?} -> {:?}", from, to);
            self.push_event(GameEvent::PhaseChanged { from, to });
        }
    }

    pub fn start_cutscene(&mut self, id: CutsceneId) {
        self.cutscene = Some(ActiveCutscene::new(id));
        self.push_event(GameEvent::CutsceneStarted { id });
        self.set_phase(GamePhase::Cutscene);
    }

    /// Respawn x of the furthest checkpoint reached
    pub fn checkpoint_x(&self) -> f32 {
        let checkpoints = level::checkpoints();
        checkpoints[self.checkpoint.min(checkpoints.len() - 1)]
    }

    /// Raise the checkpoint (never lowers it)
    pub fn reach_checkpoint(&mut self, index: usize) {
        if index > self.checkpoint {
            self.checkpoint = index;
            log::info!("Checkpoint {} reached", index);
        }
    }

    /// Add screen shake (capped at 1)
    pub fn shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(1.0);
    }

    /// Whether the run has ended
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Victory)
    }

    /// Number of fragments collected this run
    pub fn fragments_collected(&self) -> usize {
        self.fragments.iter().filter(|f| f.collected).count()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.fragments.sort_by_key(|f| f.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_starts_with_intro() {
        let mut state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Cutscene);
        assert_eq!(state.cutscene.as_ref().map(|c| c.id), Some(CutsceneId::Intro));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::CutsceneStarted { id: CutsceneId::Intro }));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_skip_intro_and_population() {
        let options = RunOptions {
            skip_intro: true,
            ..Default::default()
        };
        let state = GameState::with_options(5, &options);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.enemies.is_empty());
        assert_eq!(state.fragments.len(), 5);
        // Entity ids continue after the enemies
        let max_enemy = state.enemies.iter().map(|e| e.id).max().unwrap();
        assert_eq!(state.next_id, max_enemy + 1);
    }

    #[test]
    fn test_checkpoints_only_advance() {
        let mut state = GameState::new(1);
        state.reach_checkpoint(2);
        state.reach_checkpoint(1);
        assert_eq!(state.checkpoint, 2);
        assert_eq!(state.checkpoint_x(), level::checkpoints()[2]);
    }

    #[test]
    fn test_offset_clamped() {
        let options = RunOptions {
            input_offset_ms: 999.0,
            ..Default::default()
        };
        assert_eq!(GameState::with_options(1, &options).input_offset_ms, 200.0);
    }

    #[test]
    fn test_invalid_rhythm_config_falls_back() {
        let options = RunOptions {
            rhythm: RhythmConfig {
                bpm: 500.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let state = GameState::with_options(1, &options);
        assert_eq!(state.rhythm.config, RhythmConfig::default());
    }

    #[test]
    fn test_state_serializes_without_transients() {
        let mut state = GameState::new(3);
        state.particles.push(Particle {
            pos: glam::Vec2::ZERO,
            vel: glam::Vec2::ZERO,
            kind: super::super::particles::ParticleKind::Spark,
            life: 1.0,
            size: 2.0,
        });
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert!(back.particles.is_empty());
        assert!(back.events.is_empty());
        assert_eq!(back.enemies.len(), state.enemies.len());
        assert_eq!(back.phase, state.phase);
    }
}
