use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// Hands out strictly increasing cell timestamps in milliseconds.
///
/// Wall-clock time is used when it is ahead; otherwise the previous stamp
/// plus one, so two writes within the same millisecond still order.
#[derive(Debug, Default)]
pub struct Clock {
    last: AtomicU64,
}

impl Clock {
    pub fn new() -> Self {
        Clock::default()
    }

    pub fn next(&self) -> u64 {
        let now = wall_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    /// Make sure later stamps are above `timestamp`, e.g. after log replay.
    pub fn observe(&self, timestamp: u64) {
        self.last.fetch_max(timestamp, Ordering::AcqRel);
    }

    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

fn wall_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
