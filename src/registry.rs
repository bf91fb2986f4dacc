use log::info;

use crate::config::KeyPinControlConfig;
use crate::error::AppError;
use crate::gpio::GpioBackend;
use crate::pin::{Level, Pin};

/// The pins a single credential may control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPinControl {
    pub key: String,
    pub pins: Vec<Pin>,
}

impl TryFrom<&KeyPinControlConfig> for KeyPinControl {
    type Error = AppError;

    fn try_from(cfg: &KeyPinControlConfig) -> Result<Self, Self::Error> {
        let pins = cfg
            .pins
            .iter()
            .map(Pin::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key: cfg.key.clone(),
            pins,
        })
    }
}

impl KeyPinControl {
    pub fn from_config(groups: &[KeyPinControlConfig]) -> Result<Vec<Self>, AppError> {
        groups.iter().map(Self::try_from).collect()
    }
}

/// Every physical line the service drives, one entry per distinct pin number.
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    pins: Vec<Pin>,
}

impl PinRegistry {
    /// Collects the distinct pins of `entries` and opens each line once as an
    /// output driven high.
    pub fn build<B: GpioBackend + ?Sized>(
        entries: &[KeyPinControl],
        backend: &B,
    ) -> Result<Self, AppError> {
        let registry = Self::collect(entries)?;

        for pin in &registry.pins {
            backend.open_output(pin.number, Level::High)?;
            info!(
                "Opened line {} ({}) as output, active {}",
                pin.number,
                pin.name,
                if pin.active_high { "high" } else { "low" }
            );
        }

        Ok(registry)
    }

    fn collect(entries: &[KeyPinControl]) -> Result<Self, AppError> {
        let mut pins: Vec<Pin> = Vec::new();

        for pin in entries.iter().flat_map(|entry| entry.pins.iter()) {
            match pins.iter().find(|known| known.number == pin.number) {
                Some(known) if known.active_high != pin.active_high => {
                    return Err(AppError::Config(format!(
                        "pin {} declared with conflicting polarity",
                        pin.number
                    )));
                }
                Some(_) => {}
                None => pins.push(pin.clone()),
            }
        }

        Ok(Self { pins })
    }

    pub fn contains(&self, number: u32) -> bool {
        self.get(number).is_some()
    }

    pub fn get(&self, number: u32) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.number == number)
    }

    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pins.iter().map(|pin| pin.number)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}
