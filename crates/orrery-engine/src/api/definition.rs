use crate::api::config::OrreryConfig;
use crate::api::error::ConfigError;
use crate::bodies::{BodyRegistry, CelestialBody, CentralBody};

/// The contract every illustrated system must fulfill.
///
/// A definition is static data: which body sits at the center, which bodies
/// orbit it, and how the engine should be configured. The host adapter calls
/// it once per mount.
pub trait SystemDefinition {
    /// Return engine configuration. Called once before the registry is built.
    fn config(&self) -> OrreryConfig {
        OrreryConfig::default()
    }

    /// The central body.
    fn central(&self) -> CentralBody;

    /// Orbiting bodies, in render order.
    fn bodies(&self) -> Vec<CelestialBody>;

    /// Validate and assemble the registry, resolving the configured ring.
    fn registry(&self, config: &OrreryConfig) -> Result<BodyRegistry, ConfigError> {
        BodyRegistry::new(self.central(), self.bodies())?.with_configured_ring(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TwoBodies;

    impl SystemDefinition for TwoBodies {
        fn central(&self) -> CentralBody {
            CentralBody::new("Star", "star", 5.0, 0.01)
        }

        fn bodies(&self) -> Vec<CelestialBody> {
            vec![
                CelestialBody::new("Saturn", "saturn").with_orbit(30.0, 0.01).with_visual_radius(2.0),
                CelestialBody::new("Moonless", "rock").with_orbit(50.0, 0.005),
            ]
        }
    }

    #[test]
    fn default_registry_resolves_configured_ring() {
        let def = TwoBodies;
        let reg = def.registry(&def.config()).unwrap();
        assert!(reg.body_by_name("Saturn").unwrap().ring.is_some());
        assert!(reg.body_by_name("Moonless").unwrap().ring.is_none());
    }
}
