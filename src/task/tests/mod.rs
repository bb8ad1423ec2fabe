//! Unit tests for the task context.


use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Clock that advances one second on every read.
#[derive(Debug)]
pub(crate) struct StepClock {
    seconds: AtomicI64,
}

impl StepClock {
    pub(crate) fn new() -> Self {
        Self {
            seconds: AtomicI64::new(0),
        }
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
            .single()
            .expect("valid fixed epoch")
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let offset = self.seconds.fetch_add(1, Ordering::SeqCst);
        Self::epoch() + TimeDelta::seconds(offset)
    }
}
