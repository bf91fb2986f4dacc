use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::time::Instant;

use crate::error::AppError;
use crate::gpio::GpioBackend;
use crate::pin::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    Open,
    Write,
}

#[derive(Debug, Clone, Copy)]
pub struct MockCall {
    pub op: MockOp,
    pub line: u32,
    pub level: Level,
    pub at: Instant,
}

/// In-memory driver that records every call it receives.
#[derive(Default)]
pub struct MockGpioBackend {
    levels: Mutex<FxHashMap<u32, Level>>,
    calls: Mutex<Vec<MockCall>>,
    fail_writes: AtomicBool,
}

impl MockGpioBackend {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn opened(&self) -> Vec<(u32, Level)> {
        self.filtered(MockOp::Open)
    }

    pub fn writes(&self) -> Vec<(u32, Level)> {
        self.filtered(MockOp::Write)
    }

    pub fn level(&self, line: u32) -> Option<Level> {
        self.levels.lock().get(&line).copied()
    }

    fn filtered(&self, op: MockOp) -> Vec<(u32, Level)> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.op == op)
            .map(|call| (call.line, call.level))
            .collect()
    }

    fn record(&self, op: MockOp, line: u32, level: Level) {
        self.calls.lock().push(MockCall {
            op,
            line,
            level,
            at: Instant::now(),
        });
    }
}

impl GpioBackend for MockGpioBackend {
    fn open_output(&self, line: u32, initial: Level) -> Result<(), AppError> {
        let mut levels = self.levels.lock();
        if levels.contains_key(&line) {
            return Err(AppError::Gpio(format!("line {line} already open")));
        }
        levels.insert(line, initial);

        self.record(MockOp::Open, line, initial);
        Ok(())
    }

    fn write_level(&self, line: u32, level: Level) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(AppError::Gpio(format!("set value: line {line} unavailable")));
        }

        let mut levels = self.levels.lock();
        let current = levels
            .get_mut(&line)
            .ok_or_else(|| AppError::InvalidState(format!("line {line} not opened")))?;
        *current = level;

        self.record(MockOp::Write, line, level);
        Ok(())
    }
}
