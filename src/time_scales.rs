//! Deals with different time scales, specifically, conversion between TT, in
//! which the ephemeris is evaluated, and UT (UTC or UT1), which decides the
//! civil date of an instant.

use std::ops::{Add, Sub};

use crate::date::Date;

/// [Terristrial time](https://en.wikipedia.org/wiki/Terrestrial_Time),
/// represented in Julian date (JD).
///
/// TDB differs no more than a few milliseconds from TT, so ephemeris series
/// are evaluated directly in this scale.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tt(pub f64);

/// [Universal time](https://en.wikipedia.org/wiki/Universal_Time), the actual
/// civil time used for determining the actual date at a given time point.
///
/// This is UTC from 1972-01-01T00:00Z to the end of the leap second table,
/// and an estimate of UT1 otherwise.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ut(pub f64);

impl Tt {
    /// Converts into UT by subtracting ΔT.
    pub fn to_ut(self) -> Ut {
        Ut(self.0 - delta_t(self.0) / 86400.0)
    }
}

impl Ut {
    /// Converts into TT by adding ΔT.
    ///
    /// ```
    /// use nongli::time_scales::Ut;
    ///
    /// // 2020-01-01T00:00Z, TT - UTC = 37 + 32.184 s
    /// let tt = Ut(2458849.5).to_tt();
    /// assert!((tt.0 - 2458849.5 - 69.184 / 86400.0).abs() < 1e-9);
    /// ```
    pub fn to_tt(self) -> Tt {
        Tt(self.0 + delta_t(self.0) / 86400.0)
    }

    /// Returns the date at the time point in timezone ahead (east) of UTC by
    /// `tz_offset_minutes` minutes.
    ///
    /// For Beijing time (UTC+8), `tz_offset_minutes` should be +480.
    ///
    /// # Example
    ///
    /// ```
    /// use nongli::time_scales::Ut;
    ///
    /// let ut = Ut(2451542.2); // 1999-12-29T16:48Z
    /// assert_eq!((1999, 12, 29), ut.date_in_timezone(0).gregorian());
    /// assert_eq!((1999, 12, 30), ut.date_in_timezone(480).gregorian());
    /// ```
    pub fn date_in_timezone(&self, tz_offset_minutes: i32) -> Date {
        let jdn = (self.0 + 0.5 + tz_offset_minutes as f64 / 1440.0).floor() as i32;
        Date::from_jdn(jdn)
    }

    /// Returns the instant of local midnight starting `date`, in timezone ahead
    /// of UTC by `tz_offset_minutes` minutes.
    ///
    /// ```
    /// use nongli::Date;
    /// use nongli::time_scales::Ut;
    ///
    /// let date = Date::from_gregorian(2000, 1, 1).unwrap();
    /// assert_eq!(Ut(2451544.5), Ut::midnight(date, 0));
    /// ```
    pub fn midnight(date: Date, tz_offset_minutes: i32) -> Self {
        Ut(date.jdn() as f64 - 0.5 - tz_offset_minutes as f64 / 1440.0)
    }
}

impl Add<f64> for Ut {
    type Output = Ut;
    fn add(self, days: f64) -> Ut {
        Ut(self.0 + days)
    }
}

impl Sub<f64> for Ut {
    type Output = Ut;
    fn sub(self, days: f64) -> Ut {
        Ut(self.0 - days)
    }
}

impl Sub<Ut> for Ut {
    type Output = f64;
    fn sub(self, rhs: Ut) -> f64 {
        self.0 - rhs.0
    }
}

/// Returns ΔT = TT − UT in seconds at Julian date `jd`.
///
/// Inside the leap second table this is exact (TAI − UTC + 32.184 s).
/// Outside, the polynomial fit of Espenak & Meeus is used, shifted so the
/// value is continuous at both ends of the table.
pub fn delta_t(jd: f64) -> f64 {
    let table = leap_seconds::data();
    if jd < table.starts {
        polynomial::estimate(jd) + table.offset_before
    } else if jd >= table.expires {
        polynomial::estimate(jd) + table.offset_after
    } else {
        let idx = table.steps.partition_point(|&(step, _)| step <= jd);
        let tai_utc = match idx {
            0 => 10.0,
            i => table.steps[i - 1].1,
        };
        tai_utc + TT_TAI
    }
}

const TT_TAI: f64 = 32.184;

mod leap_seconds {
    use super::{TT_TAI, polynomial};
    use crate::date::Date;
    use std::sync::LazyLock;

    /// Days ending with a positive leap second.
    pub const DATES: &[(i32, i32, i32)] = &[
        (1972, 6, 30),
        (1972, 12, 31),
        (1973, 12, 31),
        (1974, 12, 31),
        (1975, 12, 31),
        (1976, 12, 31),
        (1977, 12, 31),
        (1978, 12, 31),
        (1979, 12, 31),
        (1981, 6, 30),
        (1982, 6, 30),
        (1983, 6, 30),
        (1985, 6, 30),
        (1987, 12, 31),
        (1989, 12, 31),
        (1990, 12, 31),
        (1992, 6, 30),
        (1993, 6, 30),
        (1994, 6, 30),
        (1995, 12, 31),
        (1997, 6, 30),
        (1998, 12, 31),
        (2005, 12, 31),
        (2008, 12, 31),
        (2012, 6, 30),
        (2015, 6, 30),
        (2016, 12, 31),
    ];
    /// Last day covered by the latest IERS bulletin.
    pub const DATE_EXPIRES: (i32, i32, i32) = (2026, 12, 31);

    #[derive(Debug, Clone)]
    pub struct Data {
        /// 1972-01-01T00:00Z
        pub starts: f64,
        /// `(first instant with the new offset, TAI − UTC)`
        pub steps: Vec<(f64, f64)>,
        pub expires: f64,
        pub offset_before: f64,
        pub offset_after: f64,
    }

    static DATA: LazyLock<Data> = LazyLock::new(|| {
        let midnight_after = |(y, m, d): (i32, i32, i32)| {
            let date = Date::from_gregorian(y, m, d)
                .unwrap_or_else(|| panic!("date not recognized: {:?}", (y, m, d)));
            date.jdn() as f64 + 0.5
        };
        let starts = midnight_after((1971, 12, 31));
        let steps: Vec<_> = (11..)
            .zip(DATES)
            .map(|(tai_utc, &ymd)| (midnight_after(ymd), tai_utc as f64))
            .collect();
        let expires = midnight_after(DATE_EXPIRES);
        let last = steps.last().map_or(10.0, |&(_, tai_utc)| tai_utc);
        Data {
            starts,
            offset_before: 10.0 + TT_TAI - polynomial::estimate(starts),
            offset_after: last + TT_TAI - polynomial::estimate(expires),
            steps,
            expires,
        }
    });

    pub fn data() -> &'static Data {
        &DATA
    }
}

mod polynomial {
    /// Espenak & Meeus (2006) fit of ΔT in seconds.
    pub fn estimate(jd: f64) -> f64 {
        let y = 2000.0 + (jd - 2451544.5) / 365.2425;
        let long_term = |y: f64| {
            let u = (y - 1820.0) / 100.0;
            -20.0 + 32.0 * u * u
        };
        match y {
            y if y < 1600.0 => long_term(y),
            y if y < 1700.0 => {
                let t = y - 1600.0;
                120.0 - 0.9808 * t - 0.01532 * t.powi(2) + t.powi(3) / 7129.0
            }
            y if y < 1800.0 => {
                let t = y - 1700.0;
                8.83 + 0.1603 * t - 0.0059285 * t.powi(2) + 0.00013336 * t.powi(3)
                    - t.powi(4) / 1174000.0
            }
            y if y < 1860.0 => {
                let t = y - 1800.0;
                13.72 - 0.332447 * t + 0.0068612 * t.powi(2) + 0.0041116 * t.powi(3)
                    - 0.00037436 * t.powi(4)
                    + 0.0000121272 * t.powi(5)
                    - 0.0000001699 * t.powi(6)
                    + 0.000000000875 * t.powi(7)
            }
            y if y < 1900.0 => {
                let t = y - 1860.0;
                7.62 + 0.5737 * t - 0.251754 * t.powi(2) + 0.01680668 * t.powi(3)
                    - 0.0004473624 * t.powi(4)
                    + t.powi(5) / 233174.0
            }
            y if y < 1920.0 => {
                let t = y - 1900.0;
                -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
                    - 0.000197 * t.powi(4)
            }
            y if y < 1941.0 => {
                let t = y - 1920.0;
                21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
            }
            y if y < 1961.0 => {
                let t = y - 1950.0;
                29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
            }
            y if y < 1986.0 => {
                let t = y - 1975.0;
                45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
            }
            y if y < 2005.0 => {
                let t = y - 2000.0;
                63.86 + 0.3345 * t - 0.060374 * t.powi(2)
                    + 0.0017275 * t.powi(3)
                    + 0.000651814 * t.powi(4)
                    + 0.00002373599 * t.powi(5)
            }
            y if y < 2050.0 => {
                let t = y - 2000.0;
                62.92 + 0.32217 * t + 0.005589 * t.powi(2)
            }
            y if y < 2150.0 => long_term(y) - 0.5628 * (2150.0 - y),
            y => long_term(y),
        }
    }
}
