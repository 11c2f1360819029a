pub mod api;
pub mod assets;
pub mod bodies;
pub mod bridge;
pub mod components;
pub mod core;
pub mod extensions;
pub mod input;
pub mod renderer;
pub mod systems;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience
pub use api::config::{CameraConfig, OrreryConfig, RingConfig};
pub use api::definition::SystemDefinition;
pub use api::error::{AssetLoadError, BackendError, ConfigError, OrreryError, TransformUpdateError};
pub use api::types::{AssetId, SceneGraphHandle, TextureSlot};
pub use assets::manifest::{AssetManifest, TextureDescriptor};
pub use assets::registry::{TextureRegistry, TextureStatus};
pub use bodies::{BodyRegistry, CelestialBody, CentralBody, RingSpec};
pub use bridge::protocol::ProtocolLayout;
pub use components::material::Material;
pub use crate::core::clock::{HostClock, SimulationClock, TimeSource};
#[cfg(not(target_arch = "wasm32"))]
pub use crate::core::clock::MonotonicClock;
pub use crate::core::frame_loop::{FrameLoop, LoopState, TickReport};
pub use crate::core::orbit::{advance, orbit_path, spin, wrap_angle, BodyRenderState, OrbitPath, OrbitalSample};
pub use crate::core::scene::{BodyNodes, SceneComposer};
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::camera::{CameraController, CameraState, CameraUniform, Viewport};
pub use renderer::headless::HeadlessBackend;
pub use renderer::traits::{DrawTiming, FrameData, ObjectDesc, RenderBackend};
pub use systems::vector::{GuideColor, GuideMesh, GuideVertex};

// Extensions — scene-graph helpers
pub use extensions::{LocalTransform, TransformGraph};
