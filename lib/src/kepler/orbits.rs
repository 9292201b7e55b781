//! Keplerian orbits.
//!
//! Two-body, perturbation-free propagation of heliocentric orbits given
//! in classical elements. Distances are in AU and times in days.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Gaussian gravitational constant (AU^(3/2) / day).
pub const GAUSSIAN_K: f64 = 0.017_202_098_95;

/// Calibration constant for Kepler's third law, `T = sqrt(a^3 / C)`
/// with `a` in AU and `T` in days.
pub const THIRD_LAW: f64 = 0.000_007_495;

/// Multiplier from AU to display units (millions of km).
pub const AU_SCALE: f64 = 149.597_871;

/// Convergence tolerance for the Kepler equation solver.
pub const KEPLER_TOL: f64 = 1e-7;

/// Iteration cap for the Kepler equation solver.
pub const KEPLER_MAXITER: u64 = 100;

/// Classical orbital elements at epoch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (AU).
    pub a: f64,
    /// Eccentricity (dimensionless).
    pub e: f64,
    /// Inclination (radians).
    pub i: f64,
    /// Longitude of ascending node (radians).
    #[serde(rename = "o")]
    pub lan: f64,
    /// Argument of periapsis (radians).
    #[serde(rename = "w")]
    pub argpe: f64,
    /// Mean anomaly at epoch (radians).
    #[serde(rename = "m")]
    pub ma: f64,
}

impl OrbitalElements {
    pub fn new(a: f64, e: f64, i: f64, lan: f64, argpe: f64, ma: f64) -> Result<Self> {
        let elements = Self {
            a,
            e,
            i,
            lan,
            argpe,
            ma,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Check that these elements describe a closed (elliptical) orbit.
    pub fn validate(&self) -> Result<()> {
        check_semi_major_axis(self.a, self.e)?;
        if !(0.0..1.0).contains(&self.e) {
            return Err(Error::InvalidElements {
                a: self.a,
                e: self.e,
                reason: "eccentricity must be in [0, 1)",
            });
        }
        Ok(())
    }

    pub fn periapsis_radius(&self) -> f64 {
        self.a * (1.0 - self.e)
    }

    pub fn apoapsis_radius(&self) -> f64 {
        self.a * (1.0 + self.e)
    }

    /// Longitude of perihelion, `ω + Ω`.
    pub fn lonpe(&self) -> f64 {
        self.argpe + self.lan
    }

    /// Mean motion (radians / day).
    pub fn mean_motion(&self) -> f64 {
        GAUSSIAN_K / libm::sqrt(self.a.powi(3))
    }

    pub fn period(&self) -> Result<u32> {
        period(self.a)
    }

    /// Position `t` days after epoch, multiplied by `scale`.
    pub fn position_at(&self, t: f64, scale: f64) -> Result<Vector3<f64>> {
        Ok(position(self, t)? * scale)
    }
}

fn check_semi_major_axis(a: f64, e: f64) -> Result<()> {
    if a > 0.0 && a.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidElements {
            a,
            e,
            reason: "semi-major axis must be positive",
        })
    }
}

/// Orbital period in whole days from Kepler's third law.
pub fn period(a: f64) -> Result<u32> {
    check_semi_major_axis(a, 0.0)?;
    Ok(libm::floor(libm::sqrt(a.powi(3) / THIRD_LAW)) as u32)
}

/// Heliocentric position (AU) `t` days after epoch.
///
/// `t` is used as given: it is not reduced modulo the orbital period, and
/// may be negative.
pub fn position(elements: &OrbitalElements, t: f64) -> Result<Vector3<f64>> {
    elements.validate()?;
    let OrbitalElements {
        a, e, i, lan, ma, ..
    } = *elements;

    let ma = ma + elements.mean_motion() * t;
    let ea = solve_kepler(ma, e, KEPLER_TOL, KEPLER_MAXITER)?;
    let ta = ea_to_ta(ea, e);
    let r = a * (1.0 - e.powi(2)) / (1.0 + e * libm::cos(ta));

    // Argument of latitude
    let u = ta + elements.lonpe() - lan;
    let (sin_u, cos_u) = (libm::sin(u), libm::cos(u));
    let (sin_lan, cos_lan) = (libm::sin(lan), libm::cos(lan));
    let (sin_i, cos_i) = (libm::sin(i), libm::cos(i));

    Ok(Vector3::new(
        r * (cos_lan * cos_u - sin_lan * sin_u * cos_i),
        r * (sin_lan * cos_u + cos_lan * sin_u * cos_i),
        r * sin_u * sin_i,
    ))
}

/// Positions for every whole day from epoch through `period` inclusive.
pub fn orbit_trace(elements: &OrbitalElements, period: u32) -> Result<Vec<Vector3<f64>>> {
    (0..=period)
        .map(|day| position(elements, day as f64))
        .collect()
}

/// Solve Kepler's equation `E = M + e sin E` for the eccentric anomaly
/// by fixed-point iteration seeded at `E = M`.
pub fn solve_kepler(ma: f64, e: f64, tol: f64, maxiter: u64) -> Result<f64> {
    let mut ea = ma;
    for _ in 0..maxiter {
        let ea_new = ma + e * libm::sin(ea);
        if (ea_new - ea).abs() < tol {
            return Ok(ea_new);
        }
        ea = ea_new;
    }
    Err(Error::ConvergenceFailure { ma, e, maxiter })
}

/// Eccentric anomaly to true anomaly.
pub fn ea_to_ta(ea: f64, e: f64) -> f64 {
    2.0 * libm::atan(libm::sqrt((1.0 + e) / (1.0 - e)) * libm::tan(ea / 2.0))
}

#[cfg(test)]
mod tests {
    use std::f64::consts;

    use super::*;

    fn assert_close(actual: Vector3<f64>, expected: Vector3<f64>, tol: f64) {
        assert!(
            (actual - expected).norm() < tol,
            "{actual:?} != {expected:?} (tol {tol})"
        );
    }

    fn circular(a: f64, i: f64, lan: f64, argpe: f64, ma: f64) -> OrbitalElements {
        OrbitalElements::new(a, 0.0, i, lan, argpe, ma).unwrap()
    }

    #[test]
    fn earth_like_period() {
        assert_eq!(period(1.0).unwrap(), 365);
    }

    #[test]
    fn period_increases_with_axis() {
        let periods = [0.5, 1.0, 1.5, 2.2, 2.8, 3.3, 5.2, 9.5]
            .iter()
            .map(|&a| period(a).unwrap())
            .collect::<Vec<_>>();
        assert!(periods.windows(2).all(|w| w[0] < w[1]), "{periods:?}");
    }

    #[test]
    fn period_rejects_bad_axis() {
        assert!(matches!(period(0.0), Err(Error::InvalidElements { .. })));
        assert!(matches!(period(-1.2), Err(Error::InvalidElements { .. })));
        assert!(matches!(period(f64::NAN), Err(Error::InvalidElements { .. })));
    }

    #[test]
    fn rejects_open_orbits() {
        assert!(OrbitalElements::new(2.0, 1.0, 0.0, 0.0, 0.0, 0.0).is_err());
        assert!(OrbitalElements::new(2.0, -0.1, 0.0, 0.0, 0.0, 0.0).is_err());
        let escaping = OrbitalElements {
            a: 2.0,
            e: 1.3,
            i: 0.0,
            lan: 0.0,
            argpe: 0.0,
            ma: 0.0,
        };
        assert!(matches!(
            position(&escaping, 0.0),
            Err(Error::InvalidElements { .. })
        ));
    }

    #[test]
    fn circular_orbit_keeps_its_radius() {
        let elements = circular(2.7, 0.4, 1.1, 2.3, 0.6);
        for t in [-500.0, 0.0, 1.0, 365.25, 1234.5, 10_000.0] {
            let r = position(&elements, t).unwrap().norm();
            assert!((r - 2.7).abs() < 1e-9, "t = {t}: r = {r}");
        }
    }

    #[test]
    fn epoch_position_is_reproducible() {
        let elements = OrbitalElements::new(2.19, 0.32, 0.13, 4.1, 0.7, 5.3).unwrap();
        let first = position(&elements, 0.0).unwrap();
        for _ in 0..10 {
            assert_eq!(position(&elements, 0.0).unwrap(), first);
        }
    }

    #[test]
    fn known_positions() {
        // Circular, planar: on the x axis at epoch, on the y axis a quarter
        // orbit later.
        let planar = circular(1.0, 0.0, 0.0, 0.0, 0.0);
        assert_close(position(&planar, 0.0).unwrap(), Vector3::new(1.0, 0.0, 0.0), 1e-12);
        let quarter = consts::FRAC_PI_2 / GAUSSIAN_K;
        assert_close(
            position(&planar, quarter).unwrap(),
            Vector3::new(0.0, 1.0, 0.0),
            0.005,
        );

        // Polar orbit a quarter turn past the node sits on the z axis.
        let polar = circular(3.0, consts::FRAC_PI_2, 0.0, 0.0, consts::FRAC_PI_2);
        assert_close(position(&polar, 0.0).unwrap(), Vector3::new(0.0, 0.0, 3.0), 1e-9);

        // Inclined, eccentric and rotated, well past epoch (reference
        // values in AU).
        let rock = OrbitalElements::new(2.19, 0.32, 0.13, 4.1, 0.7, 5.3).unwrap();
        assert_close(
            position(&rock, 1000.0).unwrap(),
            Vector3::new(-1.811_833, 1.849_793, -0.332_842),
            1e-5,
        );
        let rock = OrbitalElements::new(1.4, 0.1, 0.31, 1.2, 0.3, 2.1).unwrap();
        assert_close(
            position(&rock, 4321.25).unwrap(),
            Vector3::new(-0.308_347, -1.505_229, -0.082_657),
            1e-5,
        );
    }

    #[test]
    fn eccentric_apsides() {
        let elements = OrbitalElements::new(2.0, 0.5, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert_close(
            position(&elements, 0.0).unwrap(),
            Vector3::new(elements.periapsis_radius(), 0.0, 0.0),
            1e-12,
        );

        let at_apoapsis = OrbitalElements {
            ma: consts::PI,
            ..elements
        };
        assert_close(
            position(&at_apoapsis, 0.0).unwrap(),
            Vector3::new(-elements.apoapsis_radius(), 0.0, 0.0),
            1e-6,
        );
    }

    #[test]
    fn eccentric_orbit_stays_between_apsides() {
        let elements = OrbitalElements::new(2.6, 0.28, 0.3, 1.9, 4.2, 0.1).unwrap();
        let q = elements.periapsis_radius();
        let big_q = elements.apoapsis_radius();
        for day in (0..3000).step_by(37) {
            let r = position(&elements, day as f64).unwrap().norm();
            assert!(r >= q - 1e-6 && r <= big_q + 1e-6, "day {day}: r = {r}");
        }
    }

    #[test]
    fn time_is_not_wrapped() {
        let elements = OrbitalElements::new(1.8, 0.2, 0.1, 0.2, 0.3, 0.4).unwrap();
        let period = elements.period().unwrap() as f64;
        let a = position(&elements, 100.0).unwrap();
        let b = position(&elements, 100.0 + period).unwrap();
        // `period` is floored, so one whole-day period is not quite one orbit.
        assert_ne!(a, b);
    }

    #[test]
    fn solver_reports_non_convergence() {
        assert!(matches!(
            solve_kepler(1e-3, 0.999_999, KEPLER_TOL, KEPLER_MAXITER),
            Err(Error::ConvergenceFailure { maxiter: 100, .. })
        ));
        let ea = solve_kepler(1.0, 0.1, KEPLER_TOL, KEPLER_MAXITER).unwrap();
        assert!((ea - 0.1 * libm::sin(ea) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn trace_covers_whole_orbit() {
        let elements = circular(1.0, 0.0, 0.0, 0.0, 0.0);
        let trace = orbit_trace(&elements, 365).unwrap();
        assert_eq!(trace.len(), 366);
        assert_eq!(trace[0], position(&elements, 0.0).unwrap());
        // Nearly closed after one period.
        assert!((trace[365] - trace[0]).norm() < 0.01);
    }

    #[test]
    fn scaled_position() {
        let elements = circular(1.0, 0.0, 0.0, 0.0, 0.0);
        let p = elements.position_at(0.0, AU_SCALE).unwrap();
        assert!((p.x - AU_SCALE).abs() < 1e-9);
    }
}
