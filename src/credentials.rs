use rustc_hash::FxHashMap;

use crate::error::AppError;
use crate::pin::Pin;
use crate::registry::KeyPinControl;

/// Immutable credential -> pins lookup, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialMap {
    entries: FxHashMap<String, Vec<Pin>>,
}

impl CredentialMap {
    pub fn build(entries: &[KeyPinControl]) -> Result<Self, AppError> {
        let mut map = FxHashMap::default();

        for entry in entries {
            if map.insert(entry.key.clone(), entry.pins.clone()).is_some() {
                return Err(AppError::Config(format!(
                    "duplicate credential key '{}'",
                    entry.key
                )));
            }
        }

        Ok(Self { entries: map })
    }

    pub fn pins(&self, key: &str) -> Option<&[Pin]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
