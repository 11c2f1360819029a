//! Circular-orbit kinematics — pure math, no engine state.
//!
//! Uses f64 throughout; angles are only wrapped at the backend boundary
//! where transforms drop to f32.

use std::f64::consts::TAU;

use glam::DVec3;

use crate::bodies::CelestialBody;

/// Position and spin of one body at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalSample {
    /// Position in the orbital (XZ) plane.
    pub position: DVec3,
    /// Accumulated self-rotation, unwrapped.
    pub self_rotation_angle: f64,
}

/// Sample a body's orbit and spin `elapsed` tick units after the epoch.
pub fn advance(elapsed: f64, body: &CelestialBody) -> OrbitalSample {
    let theta = elapsed * body.orbit_rate;
    OrbitalSample {
        position: DVec3::new(
            body.orbit_radius * theta.cos(),
            0.0,
            body.orbit_radius * theta.sin(),
        ),
        self_rotation_angle: spin(elapsed, body.rotation_rate),
    }
}

/// Self-rotation after `elapsed` tick units at `rate` rad/tick.
/// Shared by orbiting bodies and the central body.
#[inline]
pub fn spin(elapsed: f64, rate: f64) -> f64 {
    elapsed * rate
}

/// Normalize an angle to [0, 2π).
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Immutable guide polyline of an orbit, closed (last point connects to first).
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPath {
    pub radius: f64,
    points: Vec<DVec3>,
}

impl OrbitPath {
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len()
    }
}

/// Sample a circle of `radius` in the orbital plane with `segments` evenly
/// spaced points.
pub fn orbit_path(radius: f64, segments: usize) -> OrbitPath {
    let points = (0..segments)
        .map(|i| {
            let a = (i as f64 / segments as f64) * TAU;
            DVec3::new(radius * a.cos(), 0.0, radius * a.sin())
        })
        .collect();
    OrbitPath { radius, points }
}

/// Per-body state written once per tick by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyRenderState {
    /// Index into `BodyRegistry::list_bodies()`.
    pub body: usize,
    pub position: DVec3,
    pub self_rotation_angle: f64,
}

impl BodyRenderState {
    pub fn new(body: usize) -> Self {
        Self {
            body,
            position: DVec3::ZERO,
            self_rotation_angle: 0.0,
        }
    }

    pub fn apply(&mut self, sample: OrbitalSample) {
        self.position = sample.position;
        self.self_rotation_angle = sample.self_rotation_angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth() -> CelestialBody {
        CelestialBody::new("Earth", "earth")
            .with_orbit(40.0, 0.02 / 3.0)
            .with_visual_radius(3.0)
            .with_rotation_rate(0.03)
    }

    fn close(a: DVec3, b: DVec3, eps: f64) -> bool {
        (a - b).length() < eps
    }

    #[test]
    fn earth_at_epoch() {
        let s = advance(0.0, &earth());
        assert_eq!(s.position, DVec3::new(40.0, 0.0, 0.0));
        assert_eq!(s.self_rotation_angle, 0.0);
    }

    #[test]
    fn earth_after_one_hundred_ticks() {
        let s = advance(100.0, &earth());
        let theta: f64 = 100.0 * 0.02 / 3.0;
        let expected = DVec3::new(40.0 * theta.cos(), 0.0, 40.0 * theta.sin());
        assert!(close(s.position, expected, 1e-12));
        assert!((s.self_rotation_angle - 3.0).abs() < 1e-12);
    }

    #[test]
    fn position_stays_on_circle_in_orbital_plane() {
        let body = earth();
        for i in 0..200 {
            let s = advance(i as f64 * 7.3, &body);
            assert_eq!(s.position.y, 0.0);
            assert!((s.position.length() - body.orbit_radius).abs() < 1e-9);
        }
    }

    #[test]
    fn position_is_periodic() {
        let body = earth();
        let period = TAU / body.orbit_rate;
        for t in [0.0, 13.0, 250.5, 1234.0] {
            let a = advance(t, &body).position;
            let b = advance(t + period, &body).position;
            assert!(close(a, b, 1e-9), "t={t}: {a:?} vs {b:?}");
        }
    }

    #[test]
    fn zero_orbit_rate_freezes_position() {
        let body = earth().with_orbit(40.0, 0.0);
        for t in [0.0, 1.0, 1e6] {
            assert_eq!(advance(t, &body).position, DVec3::new(40.0, 0.0, 0.0));
        }
    }

    #[test]
    fn rotation_is_monotonic_for_positive_rate() {
        let body = earth();
        let mut last = f64::NEG_INFINITY;
        for i in 0..500 {
            let angle = advance(i as f64 * 0.5, &body).self_rotation_angle;
            assert!(angle >= last);
            last = angle;
        }
    }

    #[test]
    fn zero_rotation_rate_disables_spin() {
        let body = earth().with_rotation_rate(0.0);
        assert_eq!(advance(0.0, &body).self_rotation_angle, 0.0);
        assert_eq!(advance(9999.0, &body).self_rotation_angle, 0.0);
    }

    #[test]
    fn advance_is_deterministic_to_the_bit() {
        let body = earth();
        let a = advance(4321.123, &body);
        let b = advance(4321.123, &body);
        assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
        assert_eq!(a.position.z.to_bits(), b.position.z.to_bits());
        assert_eq!(a.self_rotation_angle.to_bits(), b.self_rotation_angle.to_bits());
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        assert!((wrap_angle(3.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
        assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-12);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-20) < TAU);
    }

    #[test]
    fn orbit_path_has_requested_segments_on_circle() {
        let path = orbit_path(40.0, 64);
        assert_eq!(path.segment_count(), 64);
        for p in path.points() {
            assert!((p.length() - 40.0).abs() < 1e-9);
            assert_eq!(p.y, 0.0);
        }
        assert_eq!(path.points()[0], DVec3::new(40.0, 0.0, 0.0));
    }
}
