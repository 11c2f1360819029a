/// Frame buffer layout shared with the host renderer.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 12 floats]
/// [Camera: 20 floats]  view_proj (column-major) + eye
/// [Instances: max_objects × 16 floats]
/// [Guides: max_guide_vertices × 7 floats]
/// ```
///
/// Capacities are written into the header on every frame.
/// The host reads them from the header to compute offsets dynamically.

use crate::api::config::OrreryConfig;
use crate::renderer::camera::CameraUniform;
use crate::renderer::instance::ObjectInstance;
use crate::systems::vector::GuideVertex;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_PROTOCOL_VERSION: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_MAX_INSTANCES: usize = 2;
pub const HEADER_INSTANCE_COUNT: usize = 3;
pub const HEADER_MAX_GUIDE_VERTICES: usize = 4;
pub const HEADER_GUIDE_VERTEX_COUNT: usize = 5;
pub const HEADER_VIEWPORT_WIDTH: usize = 6;
pub const HEADER_VIEWPORT_HEIGHT: usize = 7;
pub const HEADER_DEVICE_PIXEL_RATIO: usize = 8;
/// 1.0 when the guide section changed since the previous frame.
pub const HEADER_GUIDES_DIRTY: usize = 9;
/// Set by the backend when the surface has been released.
pub const HEADER_RELEASED: usize = 10;
pub const HEADER_RESERVED: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats in the camera section (wire format — never changes).
pub const CAMERA_FLOATS: usize = CameraUniform::FLOATS;

/// Floats per object instance (wire format — never changes).
pub const INSTANCE_FLOATS: usize = ObjectInstance::FLOATS;

/// Floats per guide vertex: x, y, z, r, g, b, a (wire format — never changes).
pub const GUIDE_VERTEX_FLOATS: usize = GuideVertex::FLOATS;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    /// Maximum object instances.
    pub max_instances: usize,
    /// Maximum orbit-guide vertices.
    pub max_guide_vertices: usize,

    /// Size of instance data section in floats.
    pub instance_data_floats: usize,
    /// Size of guide data section in floats.
    pub guide_data_floats: usize,

    /// Offset (in floats) where the camera section begins.
    pub camera_offset: usize,
    /// Offset (in floats) where instance data begins.
    pub instance_data_offset: usize,
    /// Offset (in floats) where guide data begins.
    pub guide_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_instances: usize, max_guide_vertices: usize) -> Self {
        let instance_data_floats = max_instances * INSTANCE_FLOATS;
        let guide_data_floats = max_guide_vertices * GUIDE_VERTEX_FLOATS;

        let camera_offset = HEADER_FLOATS;
        let instance_data_offset = camera_offset + CAMERA_FLOATS;
        let guide_data_offset = instance_data_offset + instance_data_floats;

        let buffer_total_floats = guide_data_offset + guide_data_floats;
        let buffer_total_bytes = buffer_total_floats * 4;

        Self {
            max_instances,
            max_guide_vertices,
            instance_data_floats,
            guide_data_floats,
            camera_offset,
            instance_data_offset,
            guide_data_offset,
            buffer_total_floats,
            buffer_total_bytes,
        }
    }

    /// Compute layout from an OrreryConfig.
    pub fn from_config(config: &OrreryConfig) -> Self {
        Self::new(config.max_objects, config.max_guide_vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_default_config_matches_expected_sizes() {
        let layout = ProtocolLayout::from_config(&OrreryConfig::default());

        assert_eq!(layout.max_instances, 64);
        assert_eq!(layout.max_guide_vertices, 16384);
        assert_eq!(layout.instance_data_floats, 64 * 16);
        assert_eq!(layout.guide_data_floats, 16384 * 7);
        assert_eq!(layout.camera_offset, 12);
        assert_eq!(layout.instance_data_offset, 12 + 20);
        assert_eq!(layout.buffer_total_floats, 12 + 20 + 64 * 16 + 16384 * 7);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(10, 300);

        assert_eq!(layout.camera_offset, HEADER_FLOATS);
        assert_eq!(layout.instance_data_offset, layout.camera_offset + CAMERA_FLOATS);
        assert_eq!(layout.guide_data_offset, layout.instance_data_offset + layout.instance_data_floats);
        assert_eq!(layout.buffer_total_floats, layout.guide_data_offset + layout.guide_data_floats);
    }
}
