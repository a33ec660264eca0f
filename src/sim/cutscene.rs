//! Timed, skippable cutscenes
//!
//! A cutscene is an ordered list of shots. Each shot carries a caption key
//! the host resolves to text and art; the sim only runs the clock.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutsceneId {
    Intro,
    BossIntro,
    Outro,
}

/// A single held frame of a cutscene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub caption_key: &'static str,
    pub duration_s: f32,
}

const INTRO: &[Shot] = &[
    Shot { caption_key: "intro.boot", duration_s: 2.5 },
    Shot { caption_key: "intro.signal_lost", duration_s: 3.0 },
    Shot { caption_key: "intro.override", duration_s: 3.0 },
];

const BOSS_INTRO: &[Shot] = &[
    Shot { caption_key: "boss.arrival", duration_s: 2.0 },
    Shot { caption_key: "boss.challenge", duration_s: 2.5 },
];

const OUTRO: &[Shot] = &[
    Shot { caption_key: "outro.silence", duration_s: 2.5 },
    Shot { caption_key: "outro.broadcast_restored", duration_s: 3.5 },
];

impl CutsceneId {
    pub fn shots(self) -> &'static [Shot] {
        match self {
            CutsceneId::Intro => INTRO,
            CutsceneId::BossIntro => BOSS_INTRO,
            CutsceneId::Outro => OUTRO,
        }
    }

    pub fn total_duration(self) -> f32 {
        self.shots().iter().map(|s| s.duration_s).sum()
    }
}

/// A cutscene in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveCutscene {
    pub id: CutsceneId,
    pub shot_index: usize,
    /// Seconds into the current shot
    pub shot_elapsed: f32,
}

impl ActiveCutscene {
    pub fn new(id: CutsceneId) -> Self {
        Self {
            id,
            shot_index: 0,
            shot_elapsed: 0.0,
        }
    }

    pub fn current_shot(&self) -> Option<&'static Shot> {
        self.id.shots().get(self.shot_index)
    }

    /// Advance the clock; true once the last shot has finished
    pub fn advance(&mut self, dt: f32) -> bool {
        self.shot_elapsed += dt;
        while let Some(shot) = self.current_shot() {
            if self.shot_elapsed < shot.duration_s {
                return false;
            }
            self.shot_elapsed -= shot.duration_s;
            self.shot_index += 1;
        }
        true
    }

    /// Jump to the end
    pub fn skip(&mut self) {
        self.shot_index = self.id.shots().len();
        self.shot_elapsed = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.current_shot().is_none()
    }
}
