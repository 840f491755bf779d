//! Ephemeris collaborator: finds when the sun reaches an ecliptic longitude
//! and when the moon reaches a phase angle.
//!
//! The calendar only talks to the [`Ephemeris`] trait. [`Analytic`] is the
//! built-in implementation, based on truncated VSOP87 (sun) and ELP-2000/82
//! (moon) series; its accuracy is a few seconds of time for solar terms and
//! about half a minute for lunar phases over 1700–2200.
//!
//! Searches work on the target difference wrapped to (−180°, 180°]: a coarse
//! scan in one-day steps looks for an ascending zero crossing, then bisection
//! refines it.

use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{CalendarError, Result};
use crate::time_scales::{Tt, Ut};

pub mod moon;
pub mod sun;

/// Which angle a search follows.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Body {
    /// Apparent geocentric ecliptic longitude of the sun.
    Sun,
    /// Moon minus sun apparent longitude.
    Moon,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Body::Sun => "solar longitude",
            Body::Moon => "moon phase",
        })
    }
}

/// Source of solar longitudes and lunar phase angles.
///
/// Implementors provide the two angles as functions of TT; the windowed
/// searches are provided on top of them and may be overridden.
pub trait Ephemeris: Send + Sync {
    /// Years for which the model is trusted.
    fn supported_years(&self) -> RangeInclusive<i32>;

    /// Apparent geocentric ecliptic longitude of the sun, degrees in `0..360`.
    fn sun_longitude(&self, tt: Tt) -> f64;

    /// Phase angle of the moon (moon minus sun longitude), degrees in `0..360`.
    /// 0° is new moon, 90° first quarter, 180° full moon, 270° last quarter.
    fn moon_phase(&self, tt: Tt) -> f64;

    /// Finds the first instant within `window_days` after `start` at which the
    /// sun's longitude equals `target_deg`.
    ///
    /// # Errors
    ///
    /// [`CalendarError::EphemerisNotFound`] if no crossing lies in the window.
    fn find_solar_longitude(&self, target_deg: f64, start: Ut, window_days: f64) -> Result<Ut> {
        search(Body::Sun, target_deg, start, window_days, |tt| {
            self.sun_longitude(tt)
        })
    }

    /// Finds the first instant within `window_days` after `start` at which the
    /// moon's phase angle equals `target_deg`.
    ///
    /// # Errors
    ///
    /// [`CalendarError::EphemerisNotFound`] if no crossing lies in the window.
    fn find_moon_phase(&self, target_deg: f64, start: Ut, window_days: f64) -> Result<Ut> {
        search(Body::Moon, target_deg, start, window_days, |tt| {
            self.moon_phase(tt)
        })
    }
}

/// Built-in analytic ephemeris.
///
/// # Example
///
/// ```
/// use nongli::ephemeris::{Analytic, Ephemeris};
/// use nongli::time_scales::Ut;
///
/// // 2024-02-01T00:00Z; the new moon of 2024-02-09T22:59Z follows
/// let new_moon = Analytic.find_moon_phase(0.0, Ut(2460341.5), 30.0).unwrap();
/// assert!((new_moon.0 - 2460350.458).abs() < 0.01);
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct Analytic;

impl Ephemeris for Analytic {
    fn supported_years(&self) -> RangeInclusive<i32> {
        1700..=2200
    }

    fn sun_longitude(&self, tt: Tt) -> f64 {
        sun::apparent_longitude(tt)
    }

    fn moon_phase(&self, tt: Tt) -> f64 {
        (moon::apparent_longitude(tt) - sun::apparent_longitude(tt)).rem_euclid(360.0)
    }
}

/// Coarse scan step, in days. The phase angle moves about 12.2° a day, far
/// below the 180° that would hide a crossing.
const STEP_DAYS: f64 = 1.0;
/// Bisection stops below this interval, in days (about 9 ms).
const CONVERGENCE_DAYS: f64 = 1e-7;
const MAX_ITERATIONS: usize = 64;

/// Normalize an angle to (−180, +180].
pub(crate) fn normalize_to_pm180(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d > 180.0 { d - 360.0 } else { d }
}

/// A sign change from negative to non-negative with both values small; the
/// jump from +180 to −180 is the wrap-around, not a crossing.
fn is_ascending_crossing(f_a: f64, f_b: f64) -> bool {
    f_a < 0.0 && f_b >= 0.0 && f_b - f_a < 180.0
}

fn search<F>(body: Body, target_deg: f64, start: Ut, window_days: f64, angle: F) -> Result<Ut>
where
    F: Fn(Tt) -> f64,
{
    let not_found = || CalendarError::EphemerisNotFound {
        body,
        target_deg,
        start: start.0,
        window_days,
    };
    let f = |t: f64| normalize_to_pm180(angle(Tt(t)) - target_deg);

    let t_start = start.to_tt().0;
    let t_end = t_start + window_days;
    let mut t_prev = t_start;
    let mut f_prev = f(t_prev);
    while t_prev < t_end {
        let t_curr = (t_prev + STEP_DAYS).min(t_end);
        let f_curr = f(t_curr);
        if is_ascending_crossing(f_prev, f_curr) {
            let tt = bisect(&f, t_prev, t_curr);
            tracing::trace!(%body, target_deg, jd_tt = tt, "crossing found");
            return Ok(Tt(tt).to_ut());
        }
        t_prev = t_curr;
        f_prev = f_curr;
    }
    Err(not_found())
}

fn bisect<F: Fn(f64) -> f64>(f: F, mut t_a: f64, mut t_b: f64) -> f64 {
    for _ in 0..MAX_ITERATIONS {
        if t_b - t_a < CONVERGENCE_DAYS {
            break;
        }
        let t_mid = 0.5 * (t_a + t_b);
        if f(t_mid) < 0.0 {
            t_a = t_mid;
        } else {
            t_b = t_mid;
        }
    }
    0.5 * (t_a + t_b)
}

/// Nutation in longitude, degrees, from the four largest terms (accurate to
/// about 0.5″).
pub(crate) fn nutation_in_longitude(t: f64) -> f64 {
    let omega = (125.04452 - 1934.136261 * t).to_radians();
    let l_sun = (280.4665 + 36000.7698 * t).to_radians();
    let l_moon = (218.3165 + 481267.8813 * t).to_radians();
    let arcsec = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin() - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    arcsec / 3600.0
}

/// Julian centuries since J2000.0.
pub(crate) fn julian_centuries(tt: Tt) -> f64 {
    (tt.0 - 2451545.0) / 36525.0
}
