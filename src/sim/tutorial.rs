//! Tutorial sequencer
//!
//! Walks the player through movement, attacking and rhythm mode. Steps
//! advance from gameplay events; the host shows the prompt for the current
//! step.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;

/// Distance the player must walk to clear the first step
pub const MOVE_DISTANCE: f32 = 120.0;
/// On-beat hits needed to finish
pub const REQUIRED_BEAT_HITS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TutorialStep {
    Move,
    Jump,
    Attack,
    EnableRhythm,
    HitOnBeat,
    Done,
}

impl TutorialStep {
    /// Host lookup key for the on-screen prompt
    pub fn prompt_key(self) -> Option<&'static str> {
        match self {
            TutorialStep::Move => Some("tutorial.move"),
            TutorialStep::Jump => Some("tutorial.jump"),
            TutorialStep::Attack => Some("tutorial.attack"),
            TutorialStep::EnableRhythm => Some("tutorial.enable_rhythm"),
            TutorialStep::HitOnBeat => Some("tutorial.hit_on_beat"),
            TutorialStep::Done => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tutorial {
    pub step: TutorialStep,
    pub enabled: bool,
    /// On-beat hits counted during `HitOnBeat`
    pub beat_hits: u32,
}

impl Tutorial {
    pub fn new(enabled: bool) -> Self {
        Self {
            step: if enabled { TutorialStep::Move } else { TutorialStep::Done },
            enabled,
            beat_hits: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.step != TutorialStep::Done
    }

    /// Current prompt, if any
    pub fn prompt_key(&self) -> Option<&'static str> {
        if self.is_active() { self.step.prompt_key() } else { None }
    }

    pub fn skip(&mut self) {
        if self.is_active() {
            log::info!("Tutorial skipped at {:?}", self.step);
        }
        self.step = TutorialStep::Done;
    }

    /// Feed the player's total walked distance; returns the step entered
    pub fn observe_travel(&mut self, travelled: f32) -> Option<TutorialStep> {
        if self.is_active() && self.step == TutorialStep::Move && travelled >= MOVE_DISTANCE {
            return Some(self.enter(TutorialStep::Jump));
        }
        None
    }

    /// Feed one gameplay event; returns the step entered, if any
    pub fn observe(&mut self, event: &GameEvent) -> Option<TutorialStep> {
        if !self.is_active() {
            return None;
        }

        match (self.step, event) {
            (TutorialStep::Jump, GameEvent::PlayerJumped) => Some(self.enter(TutorialStep::Attack)),
            (TutorialStep::Attack, GameEvent::AttackStarted { .. }) => {
                Some(self.enter(TutorialStep::EnableRhythm))
            }
            (TutorialStep::EnableRhythm, GameEvent::RhythmToggled { on: true }) => {
                self.beat_hits = 0;
                Some(self.enter(TutorialStep::HitOnBeat))
            }
            (TutorialStep::HitOnBeat, GameEvent::RhythmToggled { on: false }) => {
                Some(self.enter(TutorialStep::EnableRhythm))
            }
            (TutorialStep::HitOnBeat, GameEvent::RhythmHit { .. }) => {
                self.beat_hits += 1;
                (self.beat_hits >= REQUIRED_BEAT_HITS).then(|| self.enter(TutorialStep::Done))
            }
            _ => None,
        }
    }

    fn enter(&mut self, step: TutorialStep) -> TutorialStep {
        log::info!("Tutorial: {:?} -> {:?}", self.step, step);
        self.step = step;
        step
    }
}
