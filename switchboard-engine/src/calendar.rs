//! Clock and business calendar
//!
//! Maps instants to civil dates in the single configured business timezone.
//! All daily-cap arithmetic goes through [`BusinessCalendar::business_date`];
//! no other notion of "today" exists in the engine.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use switchboard_core::Timestamp;

use crate::error::{EngineError, EngineResult};

/// Source of "now" for the engine.
///
/// Injectable so tests can simulate day rollover; engine callers must not
/// read the wall clock independently.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: std::sync::RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: std::sync::RwLock::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.write().expect("clock lock") = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.write().expect("clock lock");
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read().expect("clock lock")
    }
}

/// Business calendar fixed to one IANA timezone at process start.
///
/// The timezone's civil date is the source of truth for cap bucketing:
/// daylight-saving transitions must neither double-count nor skip a day.
#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar {
    tz: Tz,
}

impl BusinessCalendar {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Parse an IANA timezone name (e.g. "Asia/Kolkata").
    pub fn from_name(name: &str) -> EngineResult<Self> {
        let tz: Tz = name.parse().map_err(|_| EngineError::Config {
            reason: format!("Unknown IANA timezone: {}", name),
        })?;
        Ok(Self::new(tz))
    }

    /// Map an instant to the business date it falls on.
    pub fn business_date(&self, instant: Timestamp) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    fn instant(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_business_date_crosses_utc_midnight() {
        // 20:00 UTC on Jan 1 is already Jan 2 in Kolkata (UTC+5:30).
        let cal = BusinessCalendar::from_name("Asia/Kolkata").unwrap();
        assert_eq!(
            cal.business_date(instant("2025-01-01T20:00:00Z")),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
        assert_eq!(
            cal.business_date(instant("2025-01-01T18:29:59Z")),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_business_date_over_dst_fall_back() {
        // US DST ends 2025-11-02; the repeated 01:xx hour must stay on
        // Nov 2, not fold into a phantom extra day.
        let cal = BusinessCalendar::from_name("America/New_York").unwrap();
        let before = instant("2025-11-02T05:30:00Z"); // 01:30 EDT
        let after = instant("2025-11-02T06:30:00Z"); // 01:30 EST
        assert_eq!(cal.business_date(before), cal.business_date(after));
        assert_eq!(
            cal.business_date(after),
            NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
        );
    }

    #[test]
    fn test_business_date_over_dst_spring_forward() {
        // US DST starts 2025-03-09; 02:30 local does not exist but the
        // surrounding instants still map to Mar 9.
        let cal = BusinessCalendar::from_name("America/New_York").unwrap();
        assert_eq!(
            cal.business_date(instant("2025-03-09T06:59:00Z")),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
        assert_eq!(
            cal.business_date(instant("2025-03-09T07:01:00Z")),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_from_name_rejects_garbage() {
        assert!(BusinessCalendar::from_name("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_manual_clock_rollover() {
        let cal = BusinessCalendar::from_name("Asia/Kolkata").unwrap();
        let clock = ManualClock::new(instant("2025-06-01T18:00:00Z"));
        let d1 = cal.business_date(clock.now());
        clock.advance(Duration::hours(1));
        let d2 = cal.business_date(clock.now());
        assert_eq!(d1.succ_opt().unwrap(), d2);
    }
}
