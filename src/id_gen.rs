//! Task id generation.
//!
//! The store asks an [`IdGenerator`] for every new task id so tests can swap
//! the wall clock for a counter.

use chrono::{DateTime, Utc};

use crate::task::TaskId;

pub trait IdGenerator {
    fn next_id(&mut self) -> TaskId;
}

/// Millisecond Unix timestamps rendered as decimal strings, bumped so that
/// ids handed out by one generator are strictly increasing even when two
/// tasks are created within the same millisecond.
#[derive(Debug)]
pub struct TimestampIdGenerator<F = fn() -> DateTime<Utc>> {
    now: F,
    last: i64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self {
            now: Utc::now,
            last: 0,
        }
    }
}

impl Default for TimestampIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FnMut() -> DateTime<Utc>> TimestampIdGenerator<F> {
    pub fn with_clock(now: F) -> Self {
        Self { now, last: 0 }
    }
}

impl<F: FnMut() -> DateTime<Utc>> IdGenerator for TimestampIdGenerator<F> {
    fn next_id(&mut self) -> TaskId {
        let millis = (self.now)().timestamp_millis();
        self.last = millis.max(self.last + 1);
        TaskId::new(self.last.to_string())
    }
}

/// Counter-backed ids (`task-1`, `task-2`, ...).
#[derive(Debug, Default, Clone)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> TaskId {
        self.next += 1;
        TaskId::new(format!("task-{}", self.next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_ids_follow_the_clock() {
        let fixed = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut ids = TimestampIdGenerator::with_clock(move || fixed);

        assert_eq!(ids.next_id().as_str(), fixed.timestamp_millis().to_string());
    }

    #[test]
    fn timestamp_ids_stay_unique_within_one_millisecond() {
        let fixed = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut ids = TimestampIdGenerator::with_clock(move || fixed);

        let first = ids.next_id();
        let second = ids.next_id();
        let third = ids.next_id();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(
            third.as_str(),
            (fixed.timestamp_millis() + 2).to_string()
        );
    }

    #[test]
    fn timestamp_ids_do_not_go_backwards_with_the_clock() {
        let mut ticks = vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
        ]
        .into_iter();
        let mut ids = TimestampIdGenerator::with_clock(move || {
            ticks.next().unwrap_or_else(Utc::now)
        });

        let first: i64 = ids.next_id().as_str().parse().unwrap();
        let second: i64 = ids.next_id().as_str().parse().unwrap();

        assert!(second > first);
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIdGenerator::new();

        assert_eq!(ids.next_id(), TaskId::new("task-1"));
        assert_eq!(ids.next_id(), TaskId::new("task-2"));
        assert_eq!(
            SequentialIdGenerator::starting_at(41).next_id(),
            TaskId::new("task-42")
        );
    }
}
