//! Persisted playback position (last played index and offset).
//!
//! Values are stored as plain strings under two keys so they survive reloads
//! and stay readable from the browser's storage inspector.

use crate::config::{LAST_INDEX_KEY, LAST_TIME_KEY};
#[cfg(any(not(target_arch = "wasm32"), test))]
use std::collections::HashMap;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use tracing::warn;
#[cfg(target_arch = "wasm32")]
use web_sys::Storage;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to write {key}: {message}")]
    Write { key: &'static str, message: String },
}

/// Position restored at startup. Each field is `None` when absent or unusable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SavedPosition {
    pub index: Option<usize>,
    pub offset: Option<f64>,
}

/// Key-value persistence for the last played position.
pub trait PositionStore {
    fn load(&self) -> SavedPosition;
    fn save_index(&mut self, index: usize) -> Result<(), StoreError>;
    fn save_offset(&mut self, seconds: f64) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

pub fn parse_index(raw: Option<&str>) -> Option<usize> {
    let value = raw?.trim().parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    Some(value as usize)
}

pub fn parse_offset(raw: Option<&str>) -> Option<f64> {
    let value = raw?.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Browser local storage backed store.
///
/// Storage can be missing or throw on access (blocked cookies, sandboxed
/// frames), so it is resolved on every call and never assumed.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPositionStore;

#[cfg(target_arch = "wasm32")]
impl LocalPositionStore {
    fn storage() -> Result<Storage, StoreError> {
        web_sys::window()
            .and_then(|win| win.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }

    fn read(storage: &Storage, key: &str) -> Option<String> {
        storage.get_item(key).ok().flatten()
    }

    fn write(key: &'static str, value: String) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(key, &value)
            .map_err(|err| StoreError::Write {
                key,
                message: format!("{err:?}"),
            })
    }

    fn remove(storage: &Storage, key: &'static str) -> Result<(), StoreError> {
        storage.remove_item(key).map_err(|err| StoreError::Write {
            key,
            message: format!("{err:?}"),
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl PositionStore for LocalPositionStore {
    fn load(&self) -> SavedPosition {
        let storage = match Self::storage() {
            Ok(storage) => storage,
            Err(err) => {
                warn!(%err, "starting without a saved position");
                return SavedPosition::default();
            }
        };
        SavedPosition {
            index: parse_index(Self::read(&storage, LAST_INDEX_KEY).as_deref()),
            offset: parse_offset(Self::read(&storage, LAST_TIME_KEY).as_deref()),
        }
    }

    fn save_index(&mut self, index: usize) -> Result<(), StoreError> {
        Self::write(LAST_INDEX_KEY, index.to_string())
    }

    fn save_offset(&mut self, seconds: f64) -> Result<(), StoreError> {
        Self::write(LAST_TIME_KEY, seconds.to_string())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        Self::remove(&storage, LAST_INDEX_KEY)?;
        Self::remove(&storage, LAST_TIME_KEY)
    }
}

/// Process-local store, used off the web and in tests.
#[cfg(any(not(target_arch = "wasm32"), test))]
#[derive(Debug, Default, Clone)]
pub struct MemoryPositionStore {
    values: HashMap<&'static str, String>,
    read_only: bool,
}

#[cfg(any(not(target_arch = "wasm32"), test))]
impl MemoryPositionStore {
    /// A store that behaves like blocked browser storage: nothing saved,
    /// every write fails with [`StoreError::Unavailable`].
    #[cfg(test)]
    pub fn unavailable() -> Self {
        Self {
            values: HashMap::new(),
            read_only: true,
        }
    }

    #[cfg(test)]
    pub fn with_raw(index: Option<&str>, offset: Option<&str>) -> Self {
        let mut values = HashMap::new();
        if let Some(index) = index {
            values.insert(LAST_INDEX_KEY, index.to_string());
        }
        if let Some(offset) = offset {
            values.insert(LAST_TIME_KEY, offset.to_string());
        }
        Self {
            values,
            read_only: false,
        }
    }

    #[cfg(test)]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn write(&mut self, key: &'static str, value: String) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Unavailable);
        }
        self.values.insert(key, value);
        Ok(())
    }
}

#[cfg(any(not(target_arch = "wasm32"), test))]
impl PositionStore for MemoryPositionStore {
    fn load(&self) -> SavedPosition {
        let raw = |key: &str| self.values.get(key).map(String::as_str);
        SavedPosition {
            index: parse_index(raw(LAST_INDEX_KEY)),
            offset: parse_offset(raw(LAST_TIME_KEY)),
        }
    }

    fn save_index(&mut self, index: usize) -> Result<(), StoreError> {
        self.write(LAST_INDEX_KEY, index.to_string())
    }

    fn save_offset(&mut self, seconds: f64) -> Result<(), StoreError> {
        self.write(LAST_TIME_KEY, seconds.to_string())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Unavailable);
        }
        self.values.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_parsing_rejects_garbage() {
        assert_eq!(parse_index(Some("3")), Some(3));
        assert_eq!(parse_index(Some(" 12 ")), Some(12));
        assert_eq!(parse_index(Some("-1")), None);
        assert_eq!(parse_index(Some("1.5")), None);
        assert_eq!(parse_index(Some("NaN")), None);
        assert_eq!(parse_index(Some("abc")), None);
        assert_eq!(parse_index(None), None);
    }

    #[test]
    fn offset_parsing_requires_finite_non_negative() {
        assert_eq!(parse_offset(Some("42.25")), Some(42.25));
        assert_eq!(parse_offset(Some("0")), Some(0.0));
        assert_eq!(parse_offset(Some("inf")), None);
        assert_eq!(parse_offset(Some("-3")), None);
        assert_eq!(parse_offset(Some("")), None);
    }

    #[test]
    fn memory_store_round_trips_as_strings() {
        let mut store = MemoryPositionStore::default();
        store.save_index(4).expect("writable");
        store.save_offset(61.5).expect("writable");
        assert_eq!(store.raw(LAST_INDEX_KEY), Some("4"));
        assert_eq!(store.raw(LAST_TIME_KEY), Some("61.5"));
        assert_eq!(
            store.load(),
            SavedPosition {
                index: Some(4),
                offset: Some(61.5)
            }
        );

        store.clear().expect("writable");
        assert_eq!(store.load(), SavedPosition::default());
    }

    #[test]
    fn unavailable_store_reports_errors_and_loads_nothing() {
        let mut store = MemoryPositionStore::unavailable();
        assert!(matches!(store.save_index(1), Err(StoreError::Unavailable)));
        assert!(matches!(store.save_offset(2.0), Err(StoreError::Unavailable)));
        assert!(matches!(store.clear(), Err(StoreError::Unavailable)));
        assert_eq!(store.load(), SavedPosition::default());
    }
}
