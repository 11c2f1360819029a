//! Render backend contract.
//!
//! The scene composer creates and destroys objects through this trait; the
//! frame loop writes transforms and submits frames. The shipped backend is
//! headless (`HeadlessBackend`) and publishes flat buffers the host renderer
//! (WebGL/WebGPU in TypeScript) draws from. Native GPU backends implement the
//! same trait.

use crate::api::error::{BackendError, TransformUpdateError};
use crate::api::types::SceneGraphHandle;
use crate::components::material::Material;
use crate::core::orbit::OrbitPath;
use crate::extensions::transform::LocalTransform;
use crate::renderer::camera::{CameraUniform, Viewport};
use crate::systems::vector::GuideColor;

/// What to create.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectDesc {
    /// Textured sphere (bodies, central body).
    Sphere { radius: f32, material: Material },
    /// Flat annulus in the parent's equatorial plane.
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        material: Material,
    },
    /// Billboarded text.
    Label { text: String, height: f32 },
    /// All orbit guides, as one object.
    OrbitGuides {
        paths: Vec<OrbitPath>,
        width: f32,
        color: GuideColor,
    },
    PointLight {
        color: [f32; 3],
        intensity: f32,
        range: f32,
    },
    AmbientLight { color: [f32; 3], intensity: f32 },
    /// Sky sphere drawn behind everything.
    Background { radius: f32, material: Material },
}

impl ObjectDesc {
    pub fn material(&self) -> Option<&Material> {
        match self {
            ObjectDesc::Sphere { material, .. }
            | ObjectDesc::Ring { material, .. }
            | ObjectDesc::Background { material, .. } => Some(material),
            _ => None,
        }
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match self {
            ObjectDesc::Sphere { material, .. }
            | ObjectDesc::Ring { material, .. }
            | ObjectDesc::Background { material, .. } => Some(material),
            _ => None,
        }
    }
}

/// Timing information from a frame submit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawTiming {
    /// Instances written this frame.
    pub instances: u32,
    /// Guide vertices published this frame.
    pub guide_vertices: u32,
    pub frame: u64,
}

/// Per-frame data that is not part of the scene graph.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    pub camera: &'a CameraUniform,
}

/// Backend the scene graph lives in.
///
/// # Example Implementation
///
/// ```ignore
/// struct MetalBackend { /* device, queue, meshes... */ }
///
/// impl RenderBackend for MetalBackend {
///     fn backend(&self) -> &'static str { "metal" }
///     fn create_object(&mut self, desc: ObjectDesc, parent: Option<SceneGraphHandle>,
///                      local: LocalTransform) -> Result<SceneGraphHandle, BackendError> {
///         // Upload mesh, insert node...
///     }
///     // ...
/// }
/// ```
pub trait RenderBackend {
    /// Backend identifier (e.g., "headless", "webgl", "metal").
    fn backend(&self) -> &'static str;

    /// Create an object, optionally as a child of `parent`.
    fn create_object(
        &mut self,
        desc: ObjectDesc,
        parent: Option<SceneGraphHandle>,
        local: LocalTransform,
    ) -> Result<SceneGraphHandle, BackendError>;

    /// Replace an object's local transform. Never allocates.
    fn set_transform(
        &mut self,
        handle: SceneGraphHandle,
        local: LocalTransform,
    ) -> Result<(), TransformUpdateError>;

    /// Replace an object's material. Objects without one reject the call.
    fn set_material(
        &mut self,
        handle: SceneGraphHandle,
        material: Material,
    ) -> Result<(), TransformUpdateError>;

    /// Destroy an object. Unknown handles are ignored.
    fn destroy_object(&mut self, handle: SceneGraphHandle);

    /// The drawing surface changed size.
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame of the current scene graph.
    fn submit_frame(&mut self, frame: &FrameData<'_>) -> Result<DrawTiming, BackendError>;

    /// Give up the drawing surface. Later submits fail with `SurfaceReleased`.
    fn release_surface(&mut self);

    /// Live objects.
    fn object_count(&self) -> usize;
}
