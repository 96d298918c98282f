use crate::level::Level;
use std::sync::atomic::{AtomicI32, Ordering};

/// The single authoritative level threshold of a host logger.
///
/// Readers always see the latest `set`; nothing is cached.
#[derive(Debug)]
pub struct Threshold {
    level: AtomicI32,
}

impl Threshold {
    pub fn new(level: Level) -> Self {
        Self {
            level: AtomicI32::new(level.into()),
        }
    }

    pub fn get(&self) -> Level {
        // Only `set` writes here, and it only stores valid levels.
        Level::try_from(self.level.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn set(&self, level: Level) {
        self.level.store(level.into(), Ordering::Release);
    }

    pub fn permits(&self, level: Level) -> bool {
        level.passes(self.get())
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::new(Level::default())
    }
}
