//! Apparent geocentric longitude of the moon from the main periodic terms of
//! ELP-2000/82, as abridged by Meeus (Astronomical Algorithms, ch. 47).

#![allow(clippy::unreadable_literal)]

use super::{julian_centuries, nutation_in_longitude};
use crate::time_scales::Tt;

/// Fundamental arguments, degrees.
struct Arguments {
    /// Mean longitude of the moon.
    l: f64,
    /// Mean elongation.
    d: f64,
    /// Sun's mean anomaly.
    m: f64,
    /// Moon's mean anomaly.
    mp: f64,
    /// Argument of latitude.
    f: f64,
}

impl Arguments {
    fn at(t: f64) -> Self {
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;
        Self {
            l: 218.3164477 + 481267.88123421 * t - 0.0015786 * t2 + t3 / 538841.0
                - t4 / 65194000.0,
            d: 297.8501921 + 445267.1114034 * t - 0.0018819 * t2 + t3 / 545868.0
                - t4 / 113065000.0,
            m: 357.5291092 + 35999.0502909 * t - 0.0001536 * t2 + t3 / 24490000.0,
            mp: 134.9633964 + 477198.8675055 * t + 0.0087414 * t2 + t3 / 69699.0
                - t4 / 14712000.0,
            f: 93.272095 + 483202.0175233 * t - 0.0036539 * t2 - t3 / 3526000.0
                + t4 / 863310000.0,
        }
    }
}

/// Returns the moon's apparent longitude at `tt`, in degrees `0..360`.
pub fn apparent_longitude(tt: Tt) -> f64 {
    let t = julian_centuries(tt);
    geometric_longitude(t) + nutation_in_longitude(t)
}

fn geometric_longitude(t: f64) -> f64 {
    let Arguments { l, d, m, mp, f } = Arguments::at(t);
    // eccentricity of the Earth's orbit scales terms with the sun's anomaly
    let e = 1.0 - 0.002516 * t - 0.0000074 * t * t;

    let mut sum_l: f64 = TERMS
        .iter()
        .map(|&(cd, cm, cmp, cf, coeff)| {
            let arg = (cd * d + cm * m + cmp * mp + cf * f).to_radians();
            let scale = match cm.abs() as u32 {
                1 => e,
                2 => e * e,
                _ => 1.0,
            };
            coeff * scale * arg.sin()
        })
        .sum();

    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479264.29 * t).to_radians();
    sum_l += 3958.0 * a1.sin() + 1962.0 * (l - f).to_radians().sin() + 318.0 * a2.sin();

    (l + sum_l / 1e6).rem_euclid(360.0)
}

/// `(D, M, M′, F, Σl in 1e-6°)`
const TERMS: &[(f64, f64, f64, f64, f64)] = &[
    (0.0, 0.0, 1.0, 0.0, 6288774.0),
    (2.0, 0.0, -1.0, 0.0, 1274027.0),
    (2.0, 0.0, 0.0, 0.0, 658314.0),
    (0.0, 0.0, 2.0, 0.0, 213618.0),
    (0.0, 1.0, 0.0, 0.0, -185116.0),
    (0.0, 0.0, 0.0, 2.0, -114332.0),
    (2.0, 0.0, -2.0, 0.0, 58793.0),
    (2.0, -1.0, -1.0, 0.0, 57066.0),
    (2.0, 0.0, 1.0, 0.0, 53322.0),
    (2.0, -1.0, 0.0, 0.0, 45758.0),
    (0.0, 1.0, -1.0, 0.0, -40923.0),
    (1.0, 0.0, 0.0, 0.0, -34720.0),
    (0.0, 1.0, 1.0, 0.0, -30383.0),
    (2.0, 0.0, 0.0, -2.0, 15327.0),
    (0.0, 0.0, 1.0, 2.0, -12528.0),
    (0.0, 0.0, 1.0, -2.0, 10980.0),
    (4.0, 0.0, -1.0, 0.0, 10675.0),
    (0.0, 0.0, 3.0, 0.0, 10034.0),
    (4.0, 0.0, -2.0, 0.0, 8548.0),
    (2.0, 1.0, -1.0, 0.0, -7888.0),
    (2.0, 1.0, 0.0, 0.0, -6766.0),
    (1.0, 0.0, -1.0, 0.0, -5163.0),
    (1.0, 1.0, 0.0, 0.0, 4987.0),
    (2.0, -1.0, 1.0, 0.0, 4036.0),
    (2.0, 0.0, 2.0, 0.0, 3994.0),
    (4.0, 0.0, 0.0, 0.0, 3861.0),
    (2.0, 0.0, -3.0, 0.0, 3665.0),
    (0.0, 1.0, -2.0, 0.0, -2689.0),
    (2.0, 0.0, -1.0, 2.0, -2602.0),
    (2.0, -1.0, -2.0, 0.0, 2390.0),
    (1.0, 0.0, 1.0, 0.0, -2348.0),
    (2.0, -2.0, 0.0, 0.0, 2236.0),
    (0.0, 1.0, 2.0, 0.0, -2120.0),
    (0.0, 2.0, 0.0, 0.0, -2069.0),
    (2.0, -2.0, -1.0, 0.0, 2048.0),
    (2.0, 0.0, 1.0, -2.0, -1773.0),
    (2.0, 0.0, 0.0, 2.0, -1595.0),
    (4.0, -1.0, -1.0, 0.0, 1215.0),
    (0.0, 0.0, 2.0, 2.0, -1110.0),
    (3.0, 0.0, -1.0, 0.0, -892.0),
    (2.0, 1.0, 1.0, 0.0, -810.0),
    (4.0, -1.0, -2.0, 0.0, 759.0),
    (0.0, 2.0, -1.0, 0.0, -713.0),
    (2.0, 2.0, -1.0, 0.0, -700.0),
    (2.0, 1.0, -2.0, 0.0, 691.0),
    (2.0, -1.0, 0.0, -2.0, 596.0),
    (4.0, 0.0, 1.0, 0.0, 549.0),
    (0.0, 0.0, 4.0, 0.0, 537.0),
    (4.0, -1.0, 0.0, 0.0, 520.0),
    (1.0, 0.0, -2.0, 0.0, -487.0),
    (2.0, 1.0, 0.0, -2.0, -399.0),
    (0.0, 0.0, 2.0, -2.0, -381.0),
    (1.0, 1.0, 1.0, 0.0, 351.0),
    (3.0, 0.0, -2.0, 0.0, -340.0),
    (4.0, 0.0, -3.0, 0.0, 330.0),
    (2.0, -1.0, 2.0, 0.0, 327.0),
    (0.0, 2.0, 1.0, 0.0, -323.0),
    (1.0, 1.0, -1.0, 0.0, 299.0),
    (2.0, 0.0, 3.0, 0.0, 294.0),
];
