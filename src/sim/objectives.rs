//! Mission objectives
//!
//! Progress is event driven. Each objective reports completion exactly once
//! per run.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;

/// Fragments needed for the recovery objective
pub const REQUIRED_FRAGMENTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    DestroyJammer,
    RecoverFragments,
    DefeatBoss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub progress: u32,
    pub required: u32,
    pub complete: bool,
}

impl Objective {
    fn new(kind: ObjectiveKind, required: u32) -> Self {
        Self {
            kind,
            progress: 0,
            required,
            complete: false,
        }
    }

    /// Add progress; true if this call completed the objective
    fn bump(&mut self) -> bool {
        if self.complete {
            return false;
        }
        self.progress = (self.progress + 1).min(self.required);
        self.complete = self.progress >= self.required;
        self.complete
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objectives {
    list: Vec<Objective>,
}

impl Default for Objectives {
    fn default() -> Self {
        Self::new()
    }
}

impl Objectives {
    pub fn new() -> Self {
        Self {
            list: vec![
                Objective::new(ObjectiveKind::DestroyJammer, 1),
                Objective::new(ObjectiveKind::RecoverFragments, REQUIRED_FRAGMENTS),
                Objective::new(ObjectiveKind::DefeatBoss, 1),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Objective> {
        self.list.iter()
    }

    pub fn get(&self, kind: ObjectiveKind) -> Option<&Objective> {
        self.list.iter().find(|o| o.kind == kind)
    }

    /// Apply an event; returns the objective it completed, if any
    pub fn observe(&mut self, event: &GameEvent) -> Option<ObjectiveKind> {
        let kind = match event {
            GameEvent::JammerDestroyed => ObjectiveKind::DestroyJammer,
            GameEvent::FragmentCollected { .. } => ObjectiveKind::RecoverFragments,
            GameEvent::BossDefeated => ObjectiveKind::DefeatBoss,
            _ => return None,
        };
        let objective = self.list.iter_mut().find(|o| o.kind == kind)?;
        if objective.bump() {
            log::info!("Objective complete: {:?}", kind);
            Some(kind)
        } else {
            None
        }
    }

    pub fn all_complete(&self) -> bool {
        self.list.iter().all(|o| o.complete)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
