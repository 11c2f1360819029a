pub mod camera;
pub mod headless;
pub mod instance;
pub mod traits;

// Re-export key types for convenient access
pub use camera::{CameraController, CameraState, CameraUniform, Viewport};
pub use headless::HeadlessBackend;
pub use instance::{InstanceBuffer, InstanceKind, ObjectInstance};
pub use traits::{DrawTiming, FrameData, ObjectDesc, RenderBackend};
