//! Time utilities for farepass
//!
//! Expiry checks never read the system time directly. They go through a
//! [`Clock`], so tests and the demo driver can substitute a fixed or
//! advancing clock.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `FAREPASS_MOCK_TIME` environment variable can be set
//! to override the system time seen by [`SystemClock`]. This is useful for
//! trying out expiration behaviour from the command line.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! FAREPASS_MOCK_TIME="2030-01-01 08:00:00" farepass consume P-000002
//! ```

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::{PassError, Result};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FAREPASS_MOCK_TIME";

/// Format accepted for pass expiration dates
pub const EXPIRATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Earliest and latest calendar years accepted for expiration dates
pub const MIN_EXPIRATION_YEAR: i32 = 1;
pub const MAX_EXPIRATION_YEAR: i32 = 9999;

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

/// Initialize the mock time offset based on the environment variable.
/// Returns the offset between mock time and real time at process start.
#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => match Local.from_local_datetime(&naive_dt).single() {
                        Some(mock_dt) => {
                            let offset = mock_dt.signed_duration_since(chrono::Local::now());
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset.num_seconds(),
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        None => {
                            tracing::warn!(
                                mock_time = %mock_time_str,
                                "Failed to convert mock time to local timezone"
                            );
                        }
                    },
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Source of the current instant for expiry evaluation
///
/// Instants are local wall-clock times without a zone, the same frame that
/// expiration dates are parsed into.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the local system time (and `FAREPASS_MOCK_TIME`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        now().naive_local()
    }
}

/// Manually driven clock for tests and scripted demos
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: NaiveDateTime) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move the clock forward (or backward, for a negative duration)
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse a `YYYY-MM-DD` calendar date into the instant at the start of that day
pub fn parse_expiration_date(value: &str) -> Result<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(value, EXPIRATION_DATE_FORMAT)
        .map_err(|e| PassError::expiration(value, e.to_string()))?;

    if !(MIN_EXPIRATION_YEAR..=MAX_EXPIRATION_YEAR).contains(&date.year()) {
        return Err(PassError::expiration(
            value,
            format!(
                "year must be between {} and {}",
                MIN_EXPIRATION_YEAR, MAX_EXPIRATION_YEAR
            ),
        ));
    }

    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| PassError::expiration(value, "no start of day for date"))
}

/// Format an instant as a calendar date (the expiration display form)
pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format(EXPIRATION_DATE_FORMAT).to_string()
}

/// Format an instant with full date and time.
pub fn format_datetime_full(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
