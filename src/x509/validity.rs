//! Certificate validity windows

use time::{Duration, OffsetDateTime};

/// Validity window of an issued certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validity {
    /// First instant the certificate is valid
    pub not_before: OffsetDateTime,
    /// Last instant the certificate is valid
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Lifetime of the root and of every leaf.
    pub const YEARS: i32 = 10;

    /// Window with explicit bounds.
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Self {
        Self {
            not_before,
            not_after,
        }
    }

    /// `[now, now + 10 years]`
    pub fn starting_now() -> Self {
        Self::starting_at(OffsetDateTime::now_utc())
    }

    /// Ten calendar years from `not_before`.
    pub fn starting_at(not_before: OffsetDateTime) -> Self {
        Self::new(not_before, add_years(not_before, Self::YEARS))
    }

    /// Whether `at` falls inside the window, bounds included.
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        at >= self.not_before && at <= self.not_after
    }
}

/// Calendar-year addition. Feb 29 lands on Mar 1 when the target year is not a leap year.
fn add_years(at: OffsetDateTime, years: i32) -> OffsetDateTime {
    let target = at.year() + years;
    match at.replace_year(target) {
        Ok(shifted) => shifted,
        Err(_) => at
            .replace_day(28)
            .and_then(|d| d.replace_year(target))
            .map(|d| d + Duration::days(1))
            .unwrap_or_else(|_| at + Duration::days(365 * i64::from(years))),
    }
}
