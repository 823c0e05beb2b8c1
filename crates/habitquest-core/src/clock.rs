//! Wall-clock source for the engine shell.
//!
//! All engine arithmetic is timezone-naive local time: the shell reads the
//! clock once per operation and hands the instant to the reducer.

use chrono::{Duration, Local, NaiveDateTime};
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock. Clones share the same instant, so a test can keep a
/// handle and move time forward under an engine that owns another clone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}
