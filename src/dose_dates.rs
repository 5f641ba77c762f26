//! Synthesized vaccination dates drawn onto the certificate.
//!
//! Both dates are generated fresh per fill from the current wall-clock time;
//! they are never stored and never derived from the subject. The ordering
//! guarantees below are range constraints on the random draw itself, not
//! post-hoc validation.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// First dose is at least this many days old.
pub const MIN_FIRST_DOSE_AGE_DAYS: i64 = 180;
/// First dose is at most this many days old.
pub const MAX_FIRST_DOSE_AGE_DAYS: i64 = 365;
/// Minimum gap between the two doses.
pub const MIN_DOSE_INTERVAL_DAYS: i64 = 21;

/// A pair of synthesized dose dates.
///
/// Guarantees: `first` falls in `[now − 365 d, now − 180 d)`, `second` falls
/// in `[first + 21 d, now)` — so `second` always trails `first` by at least
/// 21 days and never passes the generation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseDates {
    pub first: DateTime<Utc>,
    pub second: DateTime<Utc>,
}

impl DoseDates {
    /// Draw a pair of dates relative to `now`.
    ///
    /// Parameterized over the RNG and the clock so the range invariants are
    /// testable deterministically.
    pub fn generate<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let min_age_ms = Duration::days(MIN_FIRST_DOSE_AGE_DAYS).num_milliseconds();
        let max_age_ms = Duration::days(MAX_FIRST_DOSE_AGE_DAYS).num_milliseconds();
        let interval_ms = Duration::days(MIN_DOSE_INTERVAL_DAYS).num_milliseconds();

        // First dose: uniform over (180, 365] days before now.
        let first_age_ms = rng.gen_range(min_age_ms + 1..=max_age_ms);
        let first = now - Duration::milliseconds(first_age_ms);

        // Second dose: uniform over [first + 21 d, now). The first dose is
        // older than 180 days, so this range is never empty.
        let second_offset_ms = rng.gen_range(interval_ms..first_age_ms);
        let second = first + Duration::milliseconds(second_offset_ms);

        Self { first, second }
    }

    /// Draw a pair of dates from the wall clock and thread RNG.
    pub fn fresh() -> Self {
        Self::generate(Utc::now(), &mut rand::thread_rng())
    }
}

/// Long-form rendering used on the certificate, e.g. "January 2, 2026".
pub fn format_long(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}
