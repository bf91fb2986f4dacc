use serde::Serialize;

use crate::config::PinEntryConfig;
use crate::error::AppError;

/// Physical logic level of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    pub name: String,
    pub number: u32,
    pub active_high: bool,
}

impl Pin {
    pub fn new(name: impl Into<String>, number: u32, active_high: bool) -> Self {
        Self {
            name: name.into(),
            number,
            active_high,
        }
    }

    /// Level that engages whatever is wired to the line.
    pub fn active_level(&self) -> Level {
        if self.active_high {
            Level::High
        } else {
            Level::Low
        }
    }

    pub fn inactive_level(&self) -> Level {
        if self.active_high {
            Level::Low
        } else {
            Level::High
        }
    }
}

impl TryFrom<&PinEntryConfig> for Pin {
    type Error = AppError;

    fn try_from(entry: &PinEntryConfig) -> Result<Self, Self::Error> {
        let number = entry.number.ok_or_else(|| {
            AppError::Config(format!("pin '{}' is missing a number", entry.name))
        })?;

        // only the exact string "low" selects active-low
        Ok(Pin::new(entry.name.clone(), number, entry.active != "low"))
    }
}
