pub mod access;
pub mod backend;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gpio;
pub mod pin;
pub mod registry;
pub mod routes;

pub use access::AccessResolver;
pub use config::{
    AppConfig, BlinkTiming, GpioConfig, HttpConfig, KeyPinControlConfig, PinEntryConfig,
};
pub use credentials::CredentialMap;
pub use error::AppError;
pub use gpio::{Actuation, GpioBackend, PinController};
pub use pin::{Level, Pin};
pub use registry::{KeyPinControl, PinRegistry};
pub use routes::AppState;

#[cfg(feature = "hardware-gpio")]
pub use backend::LibgpiodBackend;
pub use backend::MockGpioBackend;

use std::sync::Arc;

/// Opens every configured line on `backend` and wires up the controller.
pub fn build_controller<B: GpioBackend>(
    config: &AppConfig,
    backend: Arc<B>,
) -> Result<PinController<B>, AppError> {
    let entries = KeyPinControl::from_config(&config.key_pin_control)?;
    let credentials = CredentialMap::build(&entries)?;
    let registry = PinRegistry::build(&entries, backend.as_ref())?;

    Ok(PinController::new(
        backend,
        registry,
        AccessResolver::new(credentials),
        config.gpio.blink,
    ))
}
