use std::path::PathBuf;

use libgpiod::{chip::Chip, line, request};
use parking_lot::{FairMutex, RwLock};
use rustc_hash::FxHashMap;

use crate::error::AppError;
use crate::gpio::GpioBackend;
use crate::pin::Level;

pub struct LibgpiodBackend {
    chip: String,
    lines: RwLock<FxHashMap<u32, FairMutex<request::Request>>>, // keyed by line offset
}

impl LibgpiodBackend {
    pub fn new(chip: impl Into<String>) -> Result<Self, AppError> {
        let chip = chip.into();
        // fail early on a missing chip instead of at the first open
        Self::open_chip(&chip)?;

        Ok(Self {
            chip,
            lines: RwLock::new(FxHashMap::default()),
        })
    }

    fn open_chip(path: &str) -> Result<Chip, AppError> {
        let p = PathBuf::from(path);
        Chip::open(&p).map_err(|e| AppError::Gpio(format!("open chip {path}: {e}")))
    }

    fn make_line_config(offset: u32, initial: Level) -> Result<line::Config, AppError> {
        let mut ls =
            line::Settings::new().map_err(|e| AppError::Gpio(format!("libgpiod settings: {e}")))?;
        ls.set_direction(line::Direction::Output)
            .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
        ls.set_drive(line::Drive::PushPull)
            .map_err(|e| AppError::Gpio(format!("set drive: {e}")))?;
        ls.set_output_value(to_value(initial))
            .map_err(|e| AppError::Gpio(format!("set output value: {e}")))?;

        let mut cfg =
            line::Config::new().map_err(|e| AppError::Gpio(format!("line config: {e}")))?;
        cfg.add_line_settings(&[offset], ls)
            .map_err(|e| AppError::Gpio(format!("line config add settings: {e}")))?;
        Ok(cfg)
    }

    fn request_line(chip: &Chip, line_cfg: &line::Config) -> Result<request::Request, AppError> {
        let mut req_cfg =
            request::Config::new().map_err(|e| AppError::Gpio(format!("request config: {e}")))?;
        req_cfg
            .set_consumer(env!("CARGO_PKG_NAME"))
            .map_err(|e| AppError::Gpio(format!("request consumer: {e}")))?;
        chip.request_lines(Some(&req_cfg), line_cfg)
            .map_err(|e| AppError::Gpio(format!("request lines: {e}")))
    }
}

fn to_value(level: Level) -> line::Value {
    match level {
        Level::High => line::Value::Active,
        Level::Low => line::Value::InActive,
    }
}

impl GpioBackend for LibgpiodBackend {
    fn open_output(&self, offset: u32, initial: Level) -> Result<(), AppError> {
        let mut lines = self.lines.write();
        if lines.contains_key(&offset) {
            return Err(AppError::Gpio(format!("line {offset} already open")));
        }

        let chip = Self::open_chip(&self.chip)?;
        let line_cfg = Self::make_line_config(offset, initial)?;
        let request = Self::request_line(&chip, &line_cfg)?;

        lines.insert(offset, FairMutex::new(request));
        Ok(())
    }

    fn write_level(&self, offset: u32, level: Level) -> Result<(), AppError> {
        let lines = self.lines.read();
        let request = lines
            .get(&offset)
            .ok_or_else(|| AppError::InvalidState(format!("line {offset} not opened")))?;

        request
            .lock()
            .set_value(offset, to_value(level))
            .map_err(|e| AppError::Gpio(format!("set value: {e}")))?;
        Ok(())
    }
}
