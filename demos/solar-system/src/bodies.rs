//! The Sun and eight planets. Sizes, distances and rates are illustrative,
//! chosen so every planet stays visible from the default camera.

use orrery_engine::{CelestialBody, CentralBody, SystemDefinition};

/// One planet: orbit radius, visual radius, spin and orbit rates (radians
/// per tick unit), and fallback color shown until its texture loads.
struct Planet {
    name: &'static str,
    orbit_radius: f64,
    visual_radius: f64,
    rotation_rate: f64,
    orbit_rate: f64,
    color: [f32; 3],
}

const PLANETS: [Planet; 8] = [
    Planet { name: "Mercury", orbit_radius: 20.0,  visual_radius: 1.5, rotation_rate: 0.004, orbit_rate: 0.02,       color: [0.60, 0.55, 0.50] },
    Planet { name: "Venus",   orbit_radius: 30.0,  visual_radius: 2.8, rotation_rate: 0.002, orbit_rate: 0.015,      color: [0.90, 0.75, 0.40] },
    Planet { name: "Earth",   orbit_radius: 40.0,  visual_radius: 3.0, rotation_rate: 0.03,  orbit_rate: 0.02 / 3.0, color: [0.20, 0.40, 0.80] },
    Planet { name: "Mars",    orbit_radius: 50.0,  visual_radius: 2.2, rotation_rate: 0.028, orbit_rate: 0.005,      color: [0.80, 0.30, 0.15] },
    Planet { name: "Jupiter", orbit_radius: 70.0,  visual_radius: 7.0, rotation_rate: 0.06,  orbit_rate: 0.002,      color: [0.80, 0.70, 0.50] },
    Planet { name: "Saturn",  orbit_radius: 90.0,  visual_radius: 6.0, rotation_rate: 0.055, orbit_rate: 0.0009,     color: [0.85, 0.75, 0.50] },
    Planet { name: "Uranus",  orbit_radius: 110.0, visual_radius: 4.5, rotation_rate: 0.04,  orbit_rate: 0.0004,     color: [0.50, 0.75, 0.85] },
    Planet { name: "Neptune", orbit_radius: 130.0, visual_radius: 4.3, rotation_rate: 0.042, orbit_rate: 0.0001,     color: [0.25, 0.35, 0.80] },
];

pub const SUN_RADIUS: f64 = 10.0;
pub const SUN_SPIN_RATE: f64 = 0.004;

pub struct SolarSystem;

impl SolarSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SolarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDefinition for SolarSystem {
    fn central(&self) -> CentralBody {
        CentralBody::new("Sun", "sun", SUN_RADIUS, SUN_SPIN_RATE)
    }

    // Saturn's ring comes from the default config (`ringed_body`).
    fn bodies(&self) -> Vec<CelestialBody> {
        PLANETS
            .iter()
            .map(|p| {
                CelestialBody::new(p.name, p.name.to_lowercase())
                    .with_orbit(p.orbit_radius, p.orbit_rate)
                    .with_visual_radius(p.visual_radius)
                    .with_rotation_rate(p.rotation_rate)
                    .with_color(p.color)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_web::{mount, SurfaceContainer};

    #[test]
    fn registry_is_valid_and_ordered() {
        let def = SolarSystem::new();
        let registry = def.registry(&def.config()).unwrap();
        let names: Vec<_> = registry.list_bodies().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune"]);
        assert_eq!(registry.central().name, "Sun");
    }

    #[test]
    fn only_saturn_has_a_ring() {
        let def = SolarSystem::new();
        let registry = def.registry(&def.config()).unwrap();
        let ringed: Vec<_> = registry
            .list_bodies()
            .iter()
            .filter(|b| b.ring.is_some())
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(ringed, ["Saturn"]);
    }

    #[test]
    fn orbits_clear_the_sun_and_each_other() {
        let mut inner = SUN_RADIUS;
        for p in &PLANETS {
            assert!(p.orbit_radius - p.visual_radius > inner, "{} overlaps", p.name);
            inner = p.orbit_radius + p.visual_radius;
        }
    }

    #[test]
    fn mounts_and_runs() {
        let mut handle = mount(&SolarSystem::new(), SurfaceContainer::new(1280.0, 720.0, 1.0)).unwrap();
        assert!(handle.frame(0.0));
        assert!(handle.frame(16.7));
        // 8 spheres + 8 labels + sun + ring + 3 environment objects
        assert_eq!(handle.backend().unwrap().instance_count(), 21);
    }
}
