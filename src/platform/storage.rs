//! LocalStorage access
//!
//! Thin JSON wrappers over `window.localStorage`. Natively there is no
//! backing store: loads report `Missing` and saves only validate that the
//! value serializes.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::persistence::PersistError;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, PersistError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or_else(|| PersistError::Storage("localStorage unavailable".to_string()))
}

/// Read the raw string stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn load_raw(key: &str) -> Result<String, PersistError> {
    local_storage()?
        .get_item(key)
        .map_err(|e| PersistError::Storage(format!("{:?}", e)))?
        .ok_or(PersistError::Missing)
}

/// Store a raw string under `key`
#[cfg(target_arch = "wasm32")]
pub fn save_raw(key: &str, value: &str) -> Result<(), PersistError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|e| PersistError::Storage(format!("{:?}", e)))
}

/// Delete `key` (errors are logged and ignored)
#[cfg(target_arch = "wasm32")]
pub fn remove(key: &str) {
    match local_storage() {
        Ok(storage) => {
            if storage.remove_item(key).is_err() {
                log::warn!("Failed to remove {}", key);
            }
        }
        Err(e) => log::warn!("{}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_raw(_key: &str) -> Result<String, PersistError> {
    Err(PersistError::Missing)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_raw(_key: &str, _value: &str) -> Result<(), PersistError> {
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove(_key: &str) {}

/// Load and deserialize the value under `key`
pub fn load_json<T: DeserializeOwned>(key: &str) -> Result<T, PersistError> {
    let json = load_raw(key)?;
    Ok(serde_json::from_str(&json)?)
}

/// Serialize and store `value` under `key`
pub fn save_json<T: Serialize>(key: &str, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    save_raw(key, &json)
}
