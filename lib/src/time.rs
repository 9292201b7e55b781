//! In-game day count.
//!
//! Orbits are propagated in "Adalia days" counted from the orbit epoch.
//! One real-world hour is one in-game day.

use std::{fmt, ops};

use serde::{Deserialize, Serialize};
use time::{macros::datetime, OffsetDateTime};

/// Day zero of every orbit.
pub const ORBIT_EPOCH: OffsetDateTime = datetime!(2021-01-01 00:00:00 UTC);

/// Day zero of the displayed calendar ("The Arrival").
pub const ARRIVAL_EPOCH: OffsetDateTime = datetime!(2021-04-17 14:00:00 UTC);

const SECONDS_PER_ADALIA_DAY: f64 = 60.0 * 60.0;

#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
pub struct AdaliaDay(f64);

impl AdaliaDay {
    pub const ZERO: AdaliaDay = AdaliaDay(0.0);

    pub fn new(days: f64) -> Self {
        Self(days)
    }

    /// Orbit day at wall-clock time `at`. Negative before the orbit epoch.
    pub fn at(at: OffsetDateTime) -> Self {
        Self((at - ORBIT_EPOCH).as_seconds_f64() / SECONDS_PER_ADALIA_DAY)
    }

    /// Calendar day shown to players, counted from [`ARRIVAL_EPOCH`].
    /// Not suitable for propagating orbits.
    pub fn display_at(at: OffsetDateTime) -> Self {
        Self((at - ARRIVAL_EPOCH).as_seconds_f64() / SECONDS_PER_ADALIA_DAY)
    }

    pub fn now() -> Self {
        Self::at(OffsetDateTime::now_utc())
    }

    pub fn days(self) -> f64 {
        self.0
    }

    /// Reduce to the day within one orbit of `period` days, in `[0, period)`.
    ///
    /// Position functions never do this on their own; callers that want it
    /// must ask for it.
    #[must_use]
    pub fn within_orbit(self, period: u32) -> Self {
        if period == 0 {
            return self;
        }
        Self(self.0.rem_euclid(period as f64))
    }
}

impl ops::Sub<AdaliaDay> for AdaliaDay {
    type Output = f64;

    fn sub(self, rhs: AdaliaDay) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for AdaliaDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AD({:.3})", self.0)
    }
}

impl fmt::Debug for AdaliaDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
