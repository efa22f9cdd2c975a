use chrono::{prelude::*, Utc};
use chrono_tz::Tz;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;

    /// The calendar day it currently is in `tz`
    fn today(&self, tz: &Tz) -> NaiveDate {
        match Utc.timestamp_millis_opt(self.get_timestamp_millis()).single() {
            Some(now) => now.with_timezone(tz).date_naive(),
            None => Utc::now().with_timezone(tz).date_naive(),
        }
    }
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// System frozen at a fixed timestamp
pub struct StaticTimeSys {
    pub timestamp_millis: i64,
}

impl StaticTimeSys {
    /// Frozen at noon UTC of `date`
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            timestamp_millis: date.and_hms_opt(12, 0, 0).map_or(0, |dt| dt.timestamp_millis()),
        }
    }
}

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn today_depends_on_timezone() {
        let sys = StaticTimeSys {
            // 2024-03-01T23:30:00Z
            timestamp_millis: Utc
                .with_ymd_and_hms(2024, 3, 1, 23, 30, 0)
                .unwrap()
                .timestamp_millis(),
        };
        assert_eq!(sys.today(&Tz::UTC), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(
            sys.today(&chrono_tz::Europe::Oslo),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert_eq!(
            sys.today(&chrono_tz::America::New_York),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn static_sys_at_date() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(StaticTimeSys::at_date(date).today(&Tz::UTC), date);
    }
}
