use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::access::AccessResolver;
use crate::config::BlinkTiming;
use crate::error::AppError;
use crate::pin::{Level, Pin};
use crate::registry::PinRegistry;

/// Capability to drive numbered output lines.
pub trait GpioBackend: Send + Sync {
    fn open_output(&self, line: u32, initial: Level) -> Result<(), AppError>;
    fn write_level(&self, line: u32, level: Level) -> Result<(), AppError>;
}

/// Outcome of an actuation request that did not fail at the driver.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    Applied,
    Denied,
}

impl Actuation {
    pub fn is_denied(&self) -> bool {
        matches!(self, Actuation::Denied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    On,
    Off,
    Blink,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::On => "on",
            Operation::Off => "off",
            Operation::Blink => "blink",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlinkPhase {
    Idle,
    Released,
    Engaged,
    Finished,
}

struct BlinkStep {
    level: Level,
    pause: Duration,
    next: BlinkPhase,
}

impl BlinkPhase {
    fn step(self, pin: &Pin, timing: &BlinkTiming) -> Option<BlinkStep> {
        match self {
            BlinkPhase::Idle => Some(BlinkStep {
                level: pin.inactive_level(),
                pause: timing.release(),
                next: BlinkPhase::Released,
            }),
            BlinkPhase::Released => Some(BlinkStep {
                level: pin.active_level(),
                pause: timing.hold(),
                next: BlinkPhase::Engaged,
            }),
            BlinkPhase::Engaged => Some(BlinkStep {
                level: pin.inactive_level(),
                pause: Duration::ZERO,
                next: BlinkPhase::Finished,
            }),
            BlinkPhase::Finished => None,
        }
    }
}

pub struct PinController<B: GpioBackend> {
    backend: Arc<B>,
    registry: PinRegistry,
    resolver: AccessResolver,
    blink: BlinkTiming,
}

impl<B: GpioBackend> PinController<B> {
    pub fn new(
        backend: Arc<B>,
        registry: PinRegistry,
        resolver: AccessResolver,
        blink: BlinkTiming,
    ) -> Self {
        Self {
            backend,
            registry,
            resolver,
            blink,
        }
    }

    pub fn accessible_pins(&self, credential: Option<&str>) -> &[Pin] {
        self.resolver.accessible_pins(credential)
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    fn authorize(
        &self,
        credential: Option<&str>,
        number: u32,
        op: Operation,
    ) -> Result<Option<&Pin>, AppError> {
        if !self.resolver.is_accessible(credential, number) {
            debug!("Denied {op} on pin {number}");
            return Ok(None);
        }

        let pin = self.resolver.pin_by_number(credential, number)?;
        if !self.registry.contains(pin.number) {
            return Err(AppError::NotFoundPin(format!("line {number} was never opened")));
        }

        Ok(Some(pin))
    }

    fn write(&self, pin: &Pin, level: Level, op: Operation) -> Result<(), AppError> {
        self.backend.write_level(pin.number, level).inspect_err(|e| {
            warn!("Failed to drive pin {} ({}) for {op}: {e}", pin.number, pin.name);
        })
    }

    pub async fn turn_on(&self, credential: Option<&str>, number: u32) -> Result<Actuation, AppError> {
        let Some(pin) = self.authorize(credential, number, Operation::On)? else {
            return Ok(Actuation::Denied);
        };
        self.write(pin, pin.active_level(), Operation::On)?;

        Ok(Actuation::Applied)
    }

    pub async fn turn_off(
        &self,
        credential: Option<&str>,
        number: u32,
    ) -> Result<Actuation, AppError> {
        let Some(pin) = self.authorize(credential, number, Operation::Off)? else {
            return Ok(Actuation::Denied);
        };
        self.write(pin, pin.inactive_level(), Operation::Off)?;

        Ok(Actuation::Applied)
    }

    /// Release, pause, engage, hold, release. Runs to completion once started;
    /// other requests may drive any pin in between.
    pub async fn blink(&self, credential: Option<&str>, number: u32) -> Result<Actuation, AppError> {
        let Some(pin) = self.authorize(credential, number, Operation::Blink)? else {
            return Ok(Actuation::Denied);
        };

        let mut phase = BlinkPhase::Idle;
        while let Some(step) = phase.step(pin, &self.blink) {
            self.write(pin, step.level, Operation::Blink)?;
            if !step.pause.is_zero() {
                tokio::time::sleep(step.pause).await;
            }
            phase = step.next;
        }

        Ok(Actuation::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blink_phases_release_engage_release() {
        let pin = Pin::new("relay", 4, false);
        let timing = BlinkTiming::default();

        let mut phase = BlinkPhase::Idle;
        let mut steps = Vec::new();
        while let Some(step) = phase.step(&pin, &timing) {
            steps.push((step.level, step.pause));
            phase = step.next;
        }

        assert_eq!(phase, BlinkPhase::Finished);
        assert_eq!(
            steps,
            vec![
                (Level::High, Duration::from_millis(200)),
                (Level::Low, Duration::from_millis(1000)),
                (Level::High, Duration::ZERO),
            ]
        );
    }
}
