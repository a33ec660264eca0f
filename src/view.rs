//! Per-frame snapshot for the host page
//!
//! The crate does not draw. Each frame the entry point captures a
//! `FrameSnapshot` and hands it to the page as JSON; everything a renderer
//! or HUD needs is in here, already filtered by the player's settings.

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::boss::BossState;
use crate::sim::lore::title_for;
use crate::sim::rhythm::combo_multiplier;
use crate::sim::{
    EnemyKind, GamePhase, GameState, HitGrade, ObjectiveKind, ParticleKind, Rect, RhythmPhase,
};

#[derive(Debug, Clone, Serialize)]
pub struct BodyView {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<Rect> for BodyView {
    fn from(r: Rect) -> Self {
        Self {
            x: r.min.x,
            y: r.min.y,
            w: r.size.x,
            h: r.size.y,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub body: BodyView,
    pub facing: f32,
    pub on_ground: bool,
    /// Blink while invulnerable
    pub invulnerable: bool,
    /// Active swing hitbox, if any
    pub swing: Option<BodyView>,
    pub swing_on_beat: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: BodyView,
    pub health: f32,
    pub flash: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JammerView {
    pub body: BodyView,
    pub health: f32,
    /// Seconds since the last pulse
    pub pulse_age: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub body: BodyView,
    pub health: f32,
    /// Attack-cycle state name
    pub state: &'static str,
    pub facing: f32,
    pub flash: bool,
    pub phase_two: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FragmentView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub kind: ParticleKind,
    pub life: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RhythmView {
    pub active: bool,
    /// Counting in the tempo
    pub establishing: bool,
    /// Beats left until inputs are judged
    pub establish_remaining: Option<u32>,
    /// 0-1 through the current beat
    pub beat_phase: f32,
    pub window_open: bool,
    pub last_grade: Option<HitGrade>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveView {
    pub kind: ObjectiveKind,
    pub progress: u32,
    pub required: u32,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub score: u64,
    pub combo: u32,
    pub multiplier: f64,
    pub max_combo: u32,
    pub lives: u8,
    pub health: i32,
    pub max_health: i32,
    pub fragments: usize,
    pub objectives: Vec<ObjectiveView>,
    /// Titles of every lore entry unlocked so far
    pub lore: Vec<&'static str>,
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub camera_x: f32,
    pub shake: f32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub jammer: Option<JammerView>,
    pub boss: Option<BossView>,
    pub projectiles: Vec<BodyView>,
    pub fragments: Vec<FragmentView>,
    pub particles: Vec<ParticleView>,
    pub rhythm: RhythmView,
    pub hud: HudView,
    pub caption_key: Option<&'static str>,
    pub tutorial_key: Option<&'static str>,
}

fn boss_state_name(state: BossState) -> &'static str {
    match state {
        BossState::Dormant => "dormant",
        BossState::Idle { .. } => "idle",
        BossState::Telegraph { .. } => "telegraph",
        BossState::Charge { .. } => "charge",
        BossState::Recover { .. } => "recover",
        BossState::Volley { .. } => "volley",
        BossState::Defeated => "defeated",
    }
}

fn ratio(hp: i32, max: i32) -> f32 {
    if max <= 0 { 0.0 } else { hp.max(0) as f32 / max as f32 }
}

impl FrameSnapshot {
    pub fn capture(state: &GameState, settings: &Settings) -> Self {
        let player = &state.player;
        let rhythm = &state.rhythm;

        let enemies = state
            .enemies
            .iter()
            .map(|e| EnemyView {
                id: e.id,
                kind: e.kind,
                body: e.body().into(),
                health: ratio(e.hp, e.kind.max_hp()),
                flash: e.hit_flash > 0.0,
            })
            .collect();

        let jammer = state.jammer.is_active().then(|| JammerView {
            body: state.jammer.body().into(),
            health: ratio(state.jammer.hp, state.jammer.max_hp),
            pulse_age: state.jammer.pulse_age,
        });

        let boss = state.boss.is_engaged().then(|| BossView {
            body: state.boss.body().into(),
            health: ratio(state.boss.hp, state.boss.max_hp),
            state: boss_state_name(state.boss.state),
            facing: state.boss.facing,
            flash: state.boss.hit_flash > 0.0,
            phase_two: state.boss.phase_two(),
        });

        let fragments = state
            .fragments
            .iter()
            .filter(|f| !f.collected)
            .map(|f| FragmentView {
                id: f.id,
                x: f.pos.x,
                y: f.pos.y,
            })
            .collect();

        // Newest particles win when the preset caps them
        let cap = settings.max_particles();
        let skip = state.particles.len().saturating_sub(cap);
        let particles = state
            .particles
            .iter()
            .skip(skip)
            .map(|p| ParticleView {
                x: p.pos.x,
                y: p.pos.y,
                kind: p.kind,
                life: p.life,
                size: p.size,
            })
            .collect();

        let hud = HudView {
            score: state.score,
            combo: rhythm.combo,
            multiplier: combo_multiplier(rhythm.combo),
            max_combo: rhythm.max_combo,
            lives: state.lives,
            health: player.health,
            max_health: crate::consts::PLAYER_MAX_HEALTH,
            fragments: state.fragments_collected(),
            objectives: state
                .objectives
                .iter()
                .map(|o| ObjectiveView {
                    kind: o.kind,
                    progress: o.progress,
                    required: o.required,
                    complete: o.complete,
                })
                .collect(),
            lore: state.lore.ids().filter_map(title_for).collect(),
        };

        let caption_key = if state.phase == GamePhase::Cutscene {
            state
                .cutscene
                .as_ref()
                .and_then(|c| c.current_shot())
                .map(|s| s.caption_key)
        } else {
            None
        };

        Self {
            phase: state.phase,
            camera_x: state.camera_x,
            shake: if settings.effective_screen_shake() {
                state.screen_shake
            } else {
                0.0
            },
            player: PlayerView {
                body: player.body().into(),
                facing: player.facing,
                on_ground: player.on_ground,
                invulnerable: player.invuln > 0.0,
                swing: player.attack_hitbox().map(BodyView::from),
                swing_on_beat: player.attack.is_some_and(|a| a.is_on_beat()),
            },
            enemies,
            jammer,
            boss,
            projectiles: state.projectiles.iter().map(|p| p.body().into()).collect(),
            fragments,
            particles,
            rhythm: RhythmView {
                active: rhythm.is_active(),
                establishing: matches!(
                    rhythm.phase(),
                    RhythmPhase::WaitingForFirstBeat | RhythmPhase::Establishing { .. }
                ),
                establish_remaining: rhythm.establish_remaining(),
                beat_phase: rhythm.beat_phase(),
                window_open: rhythm.attack_window_open(),
                last_grade: rhythm.last_grade,
            },
            hud,
            caption_key,
            tutorial_key: if state.phase == GamePhase::Playing {
                state.tutorial.prompt_key()
            } else {
                None
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
