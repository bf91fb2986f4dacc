use crate::credentials::CredentialMap;
use crate::error::AppError;
use crate::pin::Pin;

/// Answers which pins a credential may touch. Unknown or absent credentials
/// simply see no pins.
#[derive(Debug, Clone)]
pub struct AccessResolver {
    map: CredentialMap,
}

impl AccessResolver {
    pub fn new(map: CredentialMap) -> Self {
        Self { map }
    }

    pub fn accessible_pins(&self, credential: Option<&str>) -> &[Pin] {
        credential
            .and_then(|key| self.map.pins(key))
            .unwrap_or_default()
    }

    pub fn is_accessible(&self, credential: Option<&str>, number: u32) -> bool {
        self.accessible_pins(credential)
            .iter()
            .any(|pin| pin.number == number)
    }

    /// Callers are expected to check [`Self::is_accessible`] first.
    pub fn pin_by_number(&self, credential: Option<&str>, number: u32) -> Result<&Pin, AppError> {
        self.accessible_pins(credential)
            .iter()
            .find(|pin| pin.number == number)
            .ok_or_else(|| AppError::NotFoundPin(number.to_string()))
    }
}
