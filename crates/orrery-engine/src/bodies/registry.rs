use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::api::config::OrreryConfig;
use crate::api::error::ConfigError;
use crate::api::types::AssetId;

/// Ring attachment carried by a body that has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingSpec {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Tilt about the body's local X axis, radians.
    #[serde(default)]
    pub tilt: f64,
    pub asset: AssetId,
}

/// An orbiting body. Rates are radians per tick unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    /// Texture identifier; travels with the body instead of a parallel array.
    pub asset: AssetId,
    pub orbit_radius: f64,
    pub visual_radius: f64,
    pub rotation_rate: f64,
    pub orbit_rate: f64,
    /// Fallback color used until (or instead of) the texture.
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default)]
    pub ring: Option<RingSpec>,
}

impl CelestialBody {
    pub fn new(name: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asset: AssetId::new(asset),
            orbit_radius: 1.0,
            visual_radius: 1.0,
            rotation_rate: 0.0,
            orbit_rate: 0.0,
            color: default_color(),
            ring: None,
        }
    }

    // -- Builder pattern --

    pub fn with_orbit(mut self, radius: f64, rate: f64) -> Self {
        self.orbit_radius = radius;
        self.orbit_rate = rate;
        self
    }

    pub fn with_visual_radius(mut self, radius: f64) -> Self {
        self.visual_radius = radius;
        self
    }

    pub fn with_rotation_rate(mut self, rate: f64) -> Self {
        self.rotation_rate = rate;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_ring(mut self, ring: RingSpec) -> Self {
        self.ring = Some(ring);
        self
    }
}

/// The body every orbit is centered on. Spins in place, never orbits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralBody {
    pub name: String,
    pub asset: AssetId,
    pub visual_radius: f64,
    /// Fixed self-rotation rate, radians per tick unit.
    pub spin_rate: f64,
    #[serde(default = "default_central_color")]
    pub color: [f32; 3],
    /// Glow multiplier for the host's emissive pass.
    #[serde(default = "default_emissive")]
    pub emissive: f32,
}

impl CentralBody {
    pub fn new(name: impl Into<String>, asset: impl Into<String>, visual_radius: f64, spin_rate: f64) -> Self {
        Self {
            name: name.into(),
            asset: AssetId::new(asset),
            visual_radius,
            spin_rate,
            color: default_central_color(),
            emissive: default_emissive(),
        }
    }
}

fn default_color() -> [f32; 3] {
    [0.6, 0.6, 0.7]
}

fn default_central_color() -> [f32; 3] {
    [1.0, 0.85, 0.4]
}

fn default_emissive() -> f32 {
    2.0
}

/// Wire shape of a registry in JSON.
#[derive(Deserialize)]
struct RegistryFile {
    central: CentralBody,
    bodies: Vec<CelestialBody>,
}

/// Validated, immutable set of bodies in render order.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRegistry {
    central: CentralBody,
    bodies: Vec<CelestialBody>,
}

impl BodyRegistry {
    /// Build and validate a registry. Fails on the first malformed entry;
    /// nothing is partially applied.
    pub fn new(central: CentralBody, bodies: Vec<CelestialBody>) -> Result<Self, ConfigError> {
        validate_central(&central)?;
        let mut names = HashSet::with_capacity(bodies.len() + 1);
        names.insert(central.name.clone());
        for (index, body) in bodies.iter().enumerate() {
            validate_body(index, body)?;
            if !names.insert(body.name.clone()) {
                return Err(ConfigError::DuplicateName(body.name.clone()));
            }
        }
        Ok(Self { central, bodies })
    }

    /// Parse `{ "central": {...}, "bodies": [...] }` and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        Self::new(file.central, file.bodies)
    }

    /// Attach `ring` to the body called `name`. No match leaves the registry
    /// unchanged; that is not an error.
    pub fn with_ring_on(mut self, name: &str, ring: RingSpec) -> Result<Self, ConfigError> {
        if let Some(index) = self.bodies.iter().position(|b| b.name == name) {
            validate_ring(&self.bodies[index].name, &ring)?;
            self.bodies[index].ring = Some(ring);
        }
        Ok(self)
    }

    /// Resolve the config's name-matched ring (scaled to the matched body).
    pub fn with_configured_ring(self, config: &OrreryConfig) -> Result<Self, ConfigError> {
        let Some(name) = config.ringed_body.as_deref() else {
            return Ok(self);
        };
        let Some(body) = self.body_by_name(name) else {
            log::info!("no body named `{name}`; no ring attached");
            return Ok(self);
        };
        let ring = RingSpec {
            inner_radius: body.visual_radius * config.ring.inner_scale,
            outer_radius: body.visual_radius * config.ring.outer_scale,
            tilt: config.ring.tilt,
            asset: AssetId::new(config.ring.asset.clone()),
        };
        self.with_ring_on(name, ring)
    }

    /// Orbiting bodies in registry order.
    pub fn list_bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn central(&self) -> &CentralBody {
        &self.central
    }

    pub fn body_by_name(&self, name: &str) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Every texture the scene will ask for, central body first, no duplicates.
    pub fn asset_ids(&self) -> Vec<AssetId> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let all = std::iter::once(&self.central.asset).chain(self.bodies.iter().flat_map(|b| {
            std::iter::once(&b.asset).chain(b.ring.as_ref().map(|r| &r.asset))
        }));
        for id in all {
            if seen.insert(id.clone()) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

fn validate_central(central: &CentralBody) -> Result<(), ConfigError> {
    if central.name.trim().is_empty() {
        return Err(ConfigError::EmptyName { index: 0 });
    }
    positive(&central.name, "visual_radius", central.visual_radius)?;
    finite(&central.name, "spin_rate", central.spin_rate)
}

fn validate_body(index: usize, body: &CelestialBody) -> Result<(), ConfigError> {
    if body.name.trim().is_empty() {
        return Err(ConfigError::EmptyName { index });
    }
    positive(&body.name, "orbit_radius", body.orbit_radius)?;
    positive(&body.name, "visual_radius", body.visual_radius)?;
    finite(&body.name, "rotation_rate", body.rotation_rate)?;
    finite(&body.name, "orbit_rate", body.orbit_rate)?;
    if let Some(ring) = &body.ring {
        validate_ring(&body.name, ring)?;
    }
    Ok(())
}

fn validate_ring(body: &str, ring: &RingSpec) -> Result<(), ConfigError> {
    positive(body, "ring.inner_radius", ring.inner_radius)?;
    positive(body, "ring.outer_radius", ring.outer_radius)?;
    finite(body, "ring.tilt", ring.tilt)?;
    if ring.inner_radius >= ring.outer_radius {
        return Err(ConfigError::InvalidRing {
            body: body.to_string(),
            inner: ring.inner_radius,
            outer: ring.outer_radius,
        });
    }
    Ok(())
}

fn positive(body: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveRadius {
            body: body.to_string(),
            field,
            value,
        })
    }
}

fn finite(body: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteRate {
            body: body.to_string(),
            field,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun() -> CentralBody {
        CentralBody::new("Sun", "sun", 10.0, 0.004)
    }

    fn earth() -> CelestialBody {
        CelestialBody::new("Earth", "earth")
            .with_orbit(40.0, 0.02 / 3.0)
            .with_visual_radius(3.0)
            .with_rotation_rate(0.03)
    }

    fn saturn() -> CelestialBody {
        CelestialBody::new("Saturn", "saturn")
            .with_orbit(90.0, 0.0009)
            .with_visual_radius(6.0)
            .with_rotation_rate(0.038)
    }

    #[test]
    fn lists_bodies_in_registry_order() {
        let reg = BodyRegistry::new(sun(), vec![earth(), saturn()]).unwrap();
        let names: Vec<&str> = reg.list_bodies().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Earth", "Saturn"]);
        assert_eq!(reg.central().name, "Sun");
    }

    #[test]
    fn rejects_non_positive_orbit_radius() {
        let bad = earth().with_orbit(0.0, 0.01);
        let err = BodyRegistry::new(sun(), vec![bad]).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveRadius { field: "orbit_radius", .. }));
    }

    #[test]
    fn rejects_non_positive_visual_radius() {
        let bad = earth().with_visual_radius(-2.0);
        let err = BodyRegistry::new(sun(), vec![bad]).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveRadius { field: "visual_radius", .. }));
    }

    #[test]
    fn rejects_nan_rate() {
        let bad = earth().with_rotation_rate(f64::NAN);
        let err = BodyRegistry::new(sun(), vec![bad]).unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteRate { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = BodyRegistry::new(sun(), vec![earth(), earth()]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "Earth"));
    }

    #[test]
    fn configured_ring_lands_on_named_body_only() {
        let config = OrreryConfig::default();
        let reg = BodyRegistry::new(sun(), vec![earth(), saturn()])
            .unwrap()
            .with_configured_ring(&config)
            .unwrap();
        assert!(reg.body_by_name("Earth").unwrap().ring.is_none());
        let ring = reg.body_by_name("Saturn").unwrap().ring.as_ref().unwrap();
        assert!((ring.inner_radius - 7.5).abs() < 1e-12);
        assert!((ring.outer_radius - 12.0).abs() < 1e-12);
        assert_eq!(ring.asset, AssetId::from("ring"));
    }

    #[test]
    fn configured_ring_without_match_is_not_an_error() {
        let config = OrreryConfig {
            ringed_body: Some("Pluto".into()),
            ..OrreryConfig::default()
        };
        let reg = BodyRegistry::new(sun(), vec![earth()])
            .unwrap()
            .with_configured_ring(&config)
            .unwrap();
        assert!(reg.list_bodies().iter().all(|b| b.ring.is_none()));
    }

    #[test]
    fn from_json_validates() {
        let json = r#"{
            "central": { "name": "Sun", "asset": "sun", "visual_radius": 10.0, "spin_rate": 0.004 },
            "bodies": [
                { "name": "Earth", "asset": "earth", "orbit_radius": 40.0, "visual_radius": 3.0,
                  "rotation_rate": 0.03, "orbit_rate": 0.006666 }
            ]
        }"#;
        let reg = BodyRegistry::from_json(json).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.list_bodies()[0].asset, AssetId::from("earth"));

        let bad = json.replace("\"orbit_radius\": 40.0", "\"orbit_radius\": -40.0");
        assert!(BodyRegistry::from_json(&bad).is_err());
    }

    #[test]
    fn asset_ids_are_deduplicated() {
        let reg = BodyRegistry::new(sun(), vec![earth(), saturn()])
            .unwrap()
            .with_configured_ring(&OrreryConfig::default())
            .unwrap();
        let ids: Vec<String> = reg.asset_ids().into_iter().map(|a| a.0).collect();
        assert_eq!(ids, ["sun", "earth", "saturn", "ring"]);
    }
}
