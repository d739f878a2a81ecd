use crate::common::ID_WIDTH;
use chrono::Utc;
use log::warn;
use parking_lot::Mutex;

/// Source of object ids for documents added without one.
///
/// Implementations must return ids that are unique within the process and that
/// never sort below an id returned earlier.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates ids from the wall clock in milliseconds.
///
/// Ids are rendered as zero-padded decimal strings, so numeric and lexicographic
/// ordering agree. When the clock has not advanced since the previous id, or has
/// moved backwards, the previous value plus one is used instead.
pub struct TimeMillisIdGenerator {
    last_millis: Mutex<u64>,
}

impl TimeMillisIdGenerator {
    pub fn new() -> Self {
        TimeMillisIdGenerator {
            last_millis: Mutex::new(0),
        }
    }

    pub(crate) fn next_millis(&self) -> u64 {
        let mut last_millis = self.last_millis.lock();
        let current = current_millis();

        let next = if current > *last_millis {
            current
        } else {
            if current + 1 < *last_millis {
                warn!(
                    "Clock moved backwards by {}ms, continuing from the last id",
                    *last_millis - current
                );
            }
            *last_millis + 1
        };

        *last_millis = next;
        next
    }
}

// a clock before the epoch reads as zero
fn current_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

impl Default for TimeMillisIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for TimeMillisIdGenerator {
    fn generate(&self) -> String {
        format!("{:0width$}", self.next_millis(), width = ID_WIDTH)
    }
}
