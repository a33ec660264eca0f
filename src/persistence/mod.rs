//! Save/load persistence
//!
//! Runs are saved as a versioned JSON envelope. Encoding and decoding are
//! pure so they can be tested natively; `save`/`load`/`clear` go through
//! `platform::storage`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::storage;
use crate::sim::GameState;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;
/// LocalStorage key for the in-progress run
pub const SAVE_KEY: &str = "barcode_save";

/// Errors from saving or loading persisted data
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("save version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("no saved data")]
    Missing,
    #[error("storage unavailable: {0}")]
    Storage(String),
}

/// Versioned wrapper around a saved run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// Unix timestamp (ms) when saved
    pub saved_at: f64,
    pub state: GameState,
}

impl SaveEnvelope {
    pub fn new(state: GameState, saved_at: f64) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at,
            state,
        }
    }
}

/// Serialize a run into an envelope
pub fn encode_save(state: &GameState, saved_at: f64) -> Result<String, PersistError> {
    let envelope = SaveEnvelope::new(state.clone(), saved_at);
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse an envelope, rejecting other format versions
pub fn decode_save(json: &str) -> Result<SaveEnvelope, PersistError> {
    // Peek at the version first so an old layout reports a mismatch
    // rather than a field error
    #[derive(Deserialize)]
    struct VersionOnly {
        version: u32,
    }
    let VersionOnly { version } = serde_json::from_str(json)?;
    if version != SAVE_VERSION {
        return Err(PersistError::VersionMismatch {
            found: version,
            expected: SAVE_VERSION,
        });
    }

    let mut envelope: SaveEnvelope = serde_json::from_str(json)?;
    envelope.state.normalize_order();
    Ok(envelope)
}

/// Save the run to storage
pub fn save(state: &GameState, saved_at: f64) -> Result<(), PersistError> {
    let json = encode_save(state, saved_at)?;
    storage::save_raw(SAVE_KEY, &json)?;
    log::info!("Game saved (score {}, checkpoint {})", state.score, state.checkpoint);
    Ok(())
}

/// Load the saved run, if any
pub fn load() -> Result<SaveEnvelope, PersistError> {
    let json = storage::load_raw(SAVE_KEY)?;
    decode_save(&json)
}

/// Drop the saved run
pub fn clear() {
    storage::remove(SAVE_KEY);
    log::info!("Saved game cleared");
}
