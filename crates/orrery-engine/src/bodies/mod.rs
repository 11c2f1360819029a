pub mod registry;

pub use registry::{BodyRegistry, CelestialBody, CentralBody, RingSpec};
