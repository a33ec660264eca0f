//! Lost Data fragments and the lore log
//!
//! Fragments are world pickups. Collecting one unlocks its lore entry in a
//! log that outlives the run; the host resolves entry text by id.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// Pickup size (square)
pub const FRAGMENT_SIZE: f32 = 20.0;

/// A fragment definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub id: u32,
    pub title: &'static str,
    /// Center of the pickup
    pub pos: Vec2,
}

pub const FRAGMENTS: [Fragment; 5] = [
    Fragment { id: 1, title: "Checksum Zero", pos: Vec2::new(780.0, 220.0) },
    Fragment { id: 2, title: "Dead Channel", pos: Vec2::new(1560.0, 250.0) },
    Fragment { id: 3, title: "Signal Ghost", pos: Vec2::new(2680.0, 240.0) },
    Fragment { id: 4, title: "Override Key", pos: Vec2::new(3970.0, 230.0) },
    Fragment { id: 5, title: "Last Broadcast", pos: Vec2::new(5520.0, 190.0) },
];

/// Title for a fragment id
pub fn title_for(id: u32) -> Option<&'static str> {
    FRAGMENTS.iter().find(|f| f.id == id).map(|f| f.title)
}

/// A fragment placed in the current run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFragment {
    pub id: u32,
    pub pos: Vec2,
    pub collected: bool,
}

impl WorldFragment {
    pub fn body(&self) -> Rect {
        Rect::from_center(self.pos, FRAGMENT_SIZE, FRAGMENT_SIZE)
    }
}

impl From<&Fragment> for WorldFragment {
    fn from(f: &Fragment) -> Self {
        Self {
            id: f.id,
            pos: f.pos,
            collected: false,
        }
    }
}

/// Unlocked lore entries (persists across runs)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoreLog {
    unlocked: BTreeSet<u32>,
}

impl LoreLog {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "barcode_lore";

    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock an entry; returns true the first time
    pub fn unlock(&mut self, id: u32) -> bool {
        self.unlocked.insert(id)
    }

    pub fn is_unlocked(&self, id: u32) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// Unlocked ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.unlocked.iter().copied()
    }
}
