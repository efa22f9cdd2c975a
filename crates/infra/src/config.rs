use chrono_tz::Tz;
use tracing::{info, warn};

const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    /// Timezone used to decide which calendar day "today" is
    pub timezone: Tz,
    /// How many days ahead a billing counts as upcoming
    pub upcoming_window_days: i64,
    /// Filter directive handed to the log subscriber
    pub log_level: String,
}

impl Config {
    pub fn new() -> Self {
        let timezone = match std::env::var("SUBTRACK_TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given SUBTRACK_TIMEZONE: {} is not valid, falling back to UTC.",
                        tz
                    );
                    Tz::UTC
                }
            },
            Err(_) => {
                info!("Did not find SUBTRACK_TIMEZONE environment variable. Using UTC.");
                Tz::UTC
            }
        };

        let upcoming_window_days = match std::env::var("SUBTRACK_UPCOMING_WINDOW_DAYS") {
            Ok(days) => match days.parse::<i64>() {
                Ok(days) if days >= 0 => days,
                _ => {
                    warn!(
                        "The given SUBTRACK_UPCOMING_WINDOW_DAYS: {} is not valid, falling back to the default: {}.",
                        days, DEFAULT_UPCOMING_WINDOW_DAYS
                    );
                    DEFAULT_UPCOMING_WINDOW_DAYS
                }
            },
            Err(_) => DEFAULT_UPCOMING_WINDOW_DAYS,
        };

        Self {
            timezone,
            upcoming_window_days,
            log_level: Self::log_level_from_env(),
        }
    }

    /// Readable before the log subscriber is installed
    pub fn log_level_from_env() -> String {
        std::env::var("SUBTRACK_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
