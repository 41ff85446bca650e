use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Bounded `key → last sent` map used to suppress repeat notifications.
///
/// Entries older than `window` are expired on every check; if the map is
/// still over `max_entries` the oldest entries are evicted.
#[derive(Debug, Clone)]
pub struct CooldownMap {
    window: Duration,
    max_entries: usize,
    entries: HashMap<String, DateTime<Utc>>,
}

impl CooldownMap {
    pub fn new(window: Duration, max_entries: usize) -> Self {
        Self {
            window,
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
        }
    }

    /// Returns `true` and records `now` if `key` is not cooling down.
    pub fn check_and_record(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        self.evict_expired(now);
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), now);
        while self.entries.len() > self.max_entries {
            self.evict_oldest();
        }
        true
    }

    /// Drop every entry whose window has elapsed.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) {
        let window = self.window;
        self.entries.retain(|_, sent| is_fresh(*sent, now, window));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, sent)| **sent)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

// A timestamp in the future (clock stepped back) counts as fresh.
fn is_fresh(sent: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    match now.signed_duration_since(sent).to_std() {
        Ok(elapsed) => elapsed < window,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn second_send_within_window_is_suppressed() {
        let mut map = CooldownMap::new(Duration::from_secs(60), 10);
        assert!(map.check_and_record("BTCUSDT:LONG", at(0)));
        assert!(!map.check_and_record("BTCUSDT:LONG", at(30)));
        assert!(map.check_and_record("BTCUSDT:SHORT", at(30)));
    }

    #[test]
    fn key_is_released_after_window() {
        let mut map = CooldownMap::new(Duration::from_secs(60), 10);
        assert!(map.check_and_record("k", at(0)));
        assert!(!map.check_and_record("k", at(59)));
        assert!(map.check_and_record("k", at(60)));
    }

    #[test]
    fn expired_entries_are_evicted() {
        let mut map = CooldownMap::new(Duration::from_secs(10), 10);
        map.check_and_record("a", at(0));
        map.check_and_record("b", at(5));
        map.evict_expired(at(12));
        assert_eq!(map.len(), 1);
        map.evict_expired(at(20));
        assert!(map.is_empty());
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut map = CooldownMap::new(Duration::from_secs(3600), 2);
        map.check_and_record("a", at(0));
        map.check_and_record("b", at(1));
        map.check_and_record("c", at(2));
        assert_eq!(map.len(), 2);
        // "a" was evicted, so it may fire again.
        assert!(map.check_and_record("a", at(3)));
        assert!(!map.check_and_record("c", at(3)));
    }

    #[test]
    fn future_timestamp_counts_as_fresh() {
        let mut map = CooldownMap::new(Duration::from_secs(60), 10);
        map.check_and_record("k", at(100));
        assert!(!map.check_and_record("k", at(0)));
    }
}
