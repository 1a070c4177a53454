// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Timestamp layout used wherever a lottery timestamp is stored or rendered.
const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Source of the current time for lottery operations.
///
/// Threaded through lottery creation, ballot submission, and the closing
/// cycle so tests can inject deterministic timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock time.
    fn now(&self) -> PrimitiveDateTime;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The instant this clock always reports.
    instant: PrimitiveDateTime,
}

impl FixedClock {
    /// Creates a clock that always reports `instant`.
    ///
    /// # Arguments
    ///
    /// * `instant` - The instant to report
    #[must_use]
    pub const fn new(instant: PrimitiveDateTime) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.instant
    }
}

/// Renders a timestamp in the service-wide `yyyy-MM-ddTHH:mm:ss` layout.
///
/// # Arguments
///
/// * `value` - The timestamp to render
///
/// # Errors
///
/// Returns `DomainError::DateFormatError` if the timestamp cannot be
/// rendered in the service layout.
pub fn format_timestamp(value: PrimitiveDateTime) -> Result<String, DomainError> {
    value
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| DomainError::DateFormatError {
            error: e.to_string(),
        })
}

/// Parses a timestamp in the service-wide `yyyy-MM-ddTHH:mm:ss` layout.
///
/// # Arguments
///
/// * `value` - The timestamp string to parse
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string does not match the
/// service layout.
pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, DomainError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}
