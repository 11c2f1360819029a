use bytemuck::{Pod, Zeroable};

/// What an instance draws. Encoded as a float in `ObjectInstance::kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InstanceKind {
    Sphere = 0,
    Ring = 1,
    Label = 2,
    PointLight = 3,
    AmbientLight = 4,
    Background = 5,
}

impl InstanceKind {
    pub fn as_f32(self) -> f32 {
        self as u8 as f32
    }
}

/// Per-object render data read by the host renderer.
/// Must match the host protocol: 16 floats = 64 bytes stride.
///
/// Positions are world space after transform propagation, so the host never
/// sees the hierarchy.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct ObjectInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Spin about the world Y axis, radians in [0, 2π).
    pub rotation_y: f32,
    /// Tilt about X (rings).
    pub tilt: f32,
    /// Sphere radius, ring outer radius, label height or light range.
    pub radius: f32,
    /// Ring inner radius; label index for text lookup.
    pub extra: f32,
    /// `InstanceKind` as float.
    pub kind: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Emissive multiplier (>1.0 for HDR glow).
    pub emissive: f32,
    /// Texture slot, or -1.0 while the fallback color is in use.
    pub texture_slot: f32,
    pub alpha: f32,
    pub _pad: [f32; 2],
}

impl ObjectInstance {
    pub const FLOATS: usize = 16;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
    pub const NO_TEXTURE: f32 = -1.0;
}

/// Instances for one frame, in scene build order.
pub struct InstanceBuffer {
    pub instances: Vec<ObjectInstance>,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self {
            instances: Vec::with_capacity(64),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: ObjectInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for host reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_instance_is_16_floats() {
        assert_eq!(std::mem::size_of::<ObjectInstance>(), 64);
        assert_eq!(ObjectInstance::FLOATS, 16);
    }

    #[test]
    fn buffer_push_and_view_as_floats() {
        let mut buf = InstanceBuffer::new();
        buf.push(ObjectInstance {
            x: 1.0,
            kind: InstanceKind::Ring.as_f32(),
            ..Default::default()
        });
        buf.push(ObjectInstance::default());
        assert_eq!(buf.instance_count(), 2);
        let floats = buf.as_floats();
        assert_eq!(floats.len(), 32);
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[7], 1.0);
    }
}
