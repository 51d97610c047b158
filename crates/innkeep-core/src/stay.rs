use crate::error::{CoreError, Result};
use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// Length of one billable night.
pub const ONE_NIGHT: SignedDuration = SignedDuration::from_secs(24 * 60 * 60);

/// A validated, half-open stay `[check_in, check_out)`.
///
/// The check-out instant itself is not occupied, so a new stay may start
/// exactly when the previous one ends. Both ends are kept at millisecond
/// precision, the precision bookings are persisted at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStay")]
pub struct Stay {
    check_in: Timestamp,
    check_out: Timestamp,
}

#[derive(Deserialize)]
struct RawStay {
    check_in: Timestamp,
    check_out: Timestamp,
}

impl TryFrom<RawStay> for Stay {
    type Error = CoreError;

    fn try_from(raw: RawStay) -> Result<Self> {
        Stay::new(raw.check_in, raw.check_out)
    }
}

impl Stay {
    /// Creates a stay, rejecting `check_out <= check_in` with
    /// [`CoreError::InvalidRange`].
    ///
    /// Sub-millisecond parts are truncated before the ends are compared.
    pub fn new(check_in: Timestamp, check_out: Timestamp) -> Result<Self> {
        let check_in = truncate_to_millisecond(check_in)?;
        let check_out = truncate_to_millisecond(check_out)?;
        if check_out <= check_in {
            return Err(CoreError::InvalidRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Creates a stay from calendar dates, each taken at 00:00 UTC.
    pub fn from_dates(check_in: Date, check_out: Date) -> Result<Self> {
        Self::new(start_of_day(check_in)?, start_of_day(check_out)?)
    }

    /// Parses both ends with [`parse_instant`].
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self> {
        Self::new(parse_instant(check_in)?, parse_instant(check_out)?)
    }

    pub fn check_in(&self) -> Timestamp {
        self.check_in
    }

    pub fn check_out(&self) -> Timestamp {
        self.check_out
    }

    pub fn duration(&self) -> SignedDuration {
        self.check_out.duration_since(self.check_in)
    }

    /// Number of billable nights, rounded up to whole nights.
    ///
    /// Always at least 1 because the stay is non-empty.
    pub fn nights(&self) -> u64 {
        let span = self.check_out.as_nanosecond() - self.check_in.as_nanosecond();
        let night = ONE_NIGHT.as_nanos();
        // span > 0, so this is ceil(span / night) without going through floats
        ((span + night - 1) / night) as u64
    }

    /// Half-open overlap test.
    pub fn overlaps(&self, other: &Stay) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }

    /// Returns true if `other` lies entirely inside this stay.
    pub fn encloses(&self, other: &Stay) -> bool {
        self.check_in <= other.check_in && other.check_out <= self.check_out
    }
}

fn truncate_to_millisecond(instant: Timestamp) -> Result<Timestamp> {
    Timestamp::from_millisecond(instant.as_millisecond())
        .map_err(|e| CoreError::InvalidDate(format!("{instant}: {e}")))
}

/// Normalizes a calendar date to its first instant in UTC.
pub fn start_of_day(date: Date) -> Result<Timestamp> {
    date.to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|e| CoreError::InvalidDate(format!("{date}: {e}")))
}

/// Parses either an RFC 3339 instant (`2024-06-10T14:00:00Z`) or a plain
/// calendar date (`2024-06-10`, taken at 00:00 UTC).
///
/// A time of day without an offset is rejected rather than read as a date.
pub fn parse_instant(input: &str) -> Result<Timestamp> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CoreError::InvalidDate("date cannot be empty".to_string()));
    }
    if let Ok(timestamp) = input.parse::<Timestamp>() {
        return Ok(timestamp);
    }
    if input.contains(['T', 't', ' ']) {
        return Err(CoreError::InvalidDate(format!(
            "'{input}': a time of day needs an offset such as Z or +02:00"
        )));
    }
    let date: Date = input
        .parse()
        .map_err(|e| CoreError::InvalidDate(format!("'{input}': {e}")))?;
    start_of_day(date)
}
