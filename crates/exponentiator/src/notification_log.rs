use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Source of the current time. Injected so re-notification windows can be
/// tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Last time a compounding-opportunity message went out, per wallet.
///
/// In-memory only and never evicted: the wallet set is small and fixed at
/// startup, and the log is lost on restart.
pub struct NotificationLog {
    sent: DashMap<String, DateTime<Utc>>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl NotificationLog {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sent: DashMap::new(),
            window,
            clock,
        }
    }

    /// `true` if `wallet` was notified less than one window ago.
    pub fn recently_notified(&self, wallet: &str) -> bool {
        match self.sent.get(wallet) {
            Some(last) => *last > self.clock.now() - self.window,
            None => false,
        }
    }

    /// Record a successful send for `wallet` at the current time.
    pub fn record(&self, wallet: &str) {
        self.sent.insert(wallet.to_string(), self.clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn test_unknown_wallet_was_never_notified() {
        let log = NotificationLog::new(Duration::hours(3), Arc::new(SystemClock));
        assert!(!log.recently_notified("main"));
        assert!(log.sent.get("main").is_none());
    }

    #[test]
    fn test_window_suppresses_then_expires() {
        let clock = Arc::new(ManualClock::new());
        let log = NotificationLog::new(Duration::hours(3), clock.clone());

        log.record("main");
        assert!(log.recently_notified("main"));
        assert!(!log.recently_notified("spare"));

        clock.advance(Duration::minutes(179));
        assert!(log.recently_notified("main"));

        clock.advance(Duration::minutes(1));
        assert!(!log.recently_notified("main"));
    }

    #[test]
    fn test_record_moves_the_window() {
        let clock = Arc::new(ManualClock::new());
        let log = NotificationLog::new(Duration::hours(1), clock.clone());

        log.record("main");
        let first = log.sent.get("main").map(|t| *t).unwrap();
        clock.advance(Duration::hours(2));
        log.record("main");
        assert_eq!(log.sent.get("main").map(|t| *t).unwrap() - first, Duration::hours(2));
    }
}
