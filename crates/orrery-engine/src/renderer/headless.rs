//! Headless render backend.
//!
//! Holds the scene graph in a `TransformGraph`, resolves world transforms on
//! submit and packs one frame into a flat `f32` buffer laid out by
//! `ProtocolLayout`. The host renderer reads that buffer after each frame;
//! nothing here touches a GPU.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::{Affine3A, EulerRot};

use crate::api::error::{BackendError, TransformUpdateError};
use crate::api::types::SceneGraphHandle;
use crate::bridge::protocol::*;
use crate::components::material::Material;
use crate::extensions::transform::{LocalTransform, TransformGraph};
use crate::renderer::camera::Viewport;
use crate::renderer::instance::{InstanceBuffer, InstanceKind, ObjectInstance};
use crate::renderer::traits::{DrawTiming, FrameData, ObjectDesc, RenderBackend};
use crate::systems::vector::GuideMesh;

#[derive(Debug)]
struct SceneObject {
    desc: ObjectDesc,
    /// Index into `labels` for label objects.
    label: Option<usize>,
}

pub struct HeadlessBackend {
    layout: ProtocolLayout,
    graph: TransformGraph,
    /// Ordered by handle, which is creation order.
    objects: BTreeMap<SceneGraphHandle, SceneObject>,
    next_handle: u32,
    labels: Vec<String>,
    guides: GuideMesh,
    guides_dirty: bool,
    instances: InstanceBuffer,
    buffer: Vec<f32>,
    viewport: Viewport,
    frame_counter: u64,
    context_lost: bool,
    released: bool,
}

impl HeadlessBackend {
    pub fn new(layout: ProtocolLayout, viewport: Viewport) -> Self {
        let mut buffer = vec![0.0; layout.buffer_total_floats];
        buffer[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        buffer[HEADER_MAX_INSTANCES] = layout.max_instances as f32;
        buffer[HEADER_MAX_GUIDE_VERTICES] = layout.max_guide_vertices as f32;
        Self {
            instances: InstanceBuffer::new(),
            layout,
            graph: TransformGraph::new(),
            objects: BTreeMap::new(),
            next_handle: 1,
            labels: Vec::new(),
            guides: GuideMesh::new(),
            guides_dirty: false,
            buffer,
            viewport,
            frame_counter: 0,
            context_lost: false,
            released: false,
        }
    }

    /// Simulate the host losing its drawing context. The next submit fails.
    pub fn lose_context(&mut self) {
        log::warn!("render context lost");
        self.context_lost = true;
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Whole frame buffer (header, camera, instances, guides).
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// Raw pointer to the frame buffer for host reads.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn instances(&self) -> &[ObjectInstance] {
        &self.instances.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.instances.len()
    }

    pub fn guide_vertex_count(&self) -> usize {
        self.guides.vertex_count()
    }

    /// Text of the label whose instance carries `index` in `extra`.
    pub fn label_text(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// World-space position of an object as of the last submit.
    pub fn world_position(&self, handle: SceneGraphHandle) -> Option<glam::Vec3> {
        self.graph.world(handle).map(|w| w.translation.into())
    }

    /// Full world transform of an object as of the last submit.
    pub fn world_transform(&self, handle: SceneGraphHandle) -> Option<Affine3A> {
        self.graph.world(handle)
    }

    pub fn material(&self, handle: SceneGraphHandle) -> Option<&Material> {
        self.objects.get(&handle).and_then(|o| o.desc.material())
    }

    pub fn local_transform(&self, handle: SceneGraphHandle) -> Option<&LocalTransform> {
        self.graph.get_local(handle)
    }

    pub fn parent(&self, handle: SceneGraphHandle) -> Option<SceneGraphHandle> {
        self.graph.get_parent(handle)
    }

    fn instance_for(&self, handle: SceneGraphHandle, object: &SceneObject) -> Option<ObjectInstance> {
        let world = self.graph.world(handle)?;
        let (_, rotation, translation) = world.to_scale_rotation_translation();
        let (yaw, tilt, _) = rotation.to_euler(EulerRot::YXZ);

        let mut inst = ObjectInstance {
            x: translation.x,
            y: translation.y,
            z: translation.z,
            rotation_y: yaw.rem_euclid(TAU),
            tilt,
            alpha: 1.0,
            texture_slot: ObjectInstance::NO_TEXTURE,
            ..Default::default()
        };

        match &object.desc {
            ObjectDesc::Sphere { radius, material } => {
                inst.kind = InstanceKind::Sphere.as_f32();
                inst.radius = *radius;
                apply_material(&mut inst, material);
            }
            ObjectDesc::Ring { inner_radius, outer_radius, material } => {
                inst.kind = InstanceKind::Ring.as_f32();
                inst.radius = *outer_radius;
                inst.extra = *inner_radius;
                apply_material(&mut inst, material);
            }
            ObjectDesc::Label { height, .. } => {
                inst.kind = InstanceKind::Label.as_f32();
                inst.radius = *height;
                inst.extra = object.label.unwrap_or(0) as f32;
                [inst.r, inst.g, inst.b] = [1.0, 1.0, 1.0];
            }
            ObjectDesc::PointLight { color, intensity, range } => {
                inst.kind = InstanceKind::PointLight.as_f32();
                inst.radius = *range;
                inst.emissive = *intensity;
                [inst.r, inst.g, inst.b] = *color;
            }
            ObjectDesc::AmbientLight { color, intensity } => {
                inst.kind = InstanceKind::AmbientLight.as_f32();
                inst.emissive = *intensity;
                [inst.r, inst.g, inst.b] = *color;
            }
            ObjectDesc::Background { radius, material } => {
                inst.kind = InstanceKind::Background.as_f32();
                inst.radius = *radius;
                apply_material(&mut inst, material);
            }
            ObjectDesc::OrbitGuides { .. } => return None,
        }
        Some(inst)
    }

    fn write_header(&mut self) {
        let h = &mut self.buffer[..HEADER_FLOATS];
        h[HEADER_FRAME_COUNTER] = self.frame_counter as f32;
        h[HEADER_INSTANCE_COUNT] = self.instances.instances.len() as f32;
        h[HEADER_GUIDE_VERTEX_COUNT] = self.guides.vertex_count() as f32;
        h[HEADER_VIEWPORT_WIDTH] = self.viewport.width;
        h[HEADER_VIEWPORT_HEIGHT] = self.viewport.height;
        h[HEADER_DEVICE_PIXEL_RATIO] = self.viewport.device_pixel_ratio;
        h[HEADER_GUIDES_DIRTY] = if self.guides_dirty { 1.0 } else { 0.0 };
        h[HEADER_RELEASED] = if self.released { 1.0 } else { 0.0 };
    }
}

fn apply_material(inst: &mut ObjectInstance, material: &Material) {
    [inst.r, inst.g, inst.b] = material.color;
    inst.emissive = material.emissive;
    inst.alpha = material.alpha;
    if let Some(slot) = material.texture {
        inst.texture_slot = slot.0 as f32;
    }
}

impl RenderBackend for HeadlessBackend {
    fn backend(&self) -> &'static str {
        "headless"
    }

    fn create_object(
        &mut self,
        desc: ObjectDesc,
        parent: Option<SceneGraphHandle>,
        local: LocalTransform,
    ) -> Result<SceneGraphHandle, BackendError> {
        if self.released {
            return Err(BackendError::SurfaceReleased);
        }
        let instanced = self
            .objects
            .values()
            .filter(|o| !matches!(o.desc, ObjectDesc::OrbitGuides { .. }))
            .count();
        if !matches!(desc, ObjectDesc::OrbitGuides { .. }) && instanced >= self.layout.max_instances {
            return Err(BackendError::CapacityExceeded {
                what: "object",
                requested: instanced + 1,
                capacity: self.layout.max_instances,
            });
        }

        let mut label = None;
        match &desc {
            ObjectDesc::OrbitGuides { paths, width, color } => {
                let mut mesh = GuideMesh::new();
                for path in paths {
                    mesh.add_path(path, *width, *color);
                }
                let total = self.guides.vertex_count() + mesh.vertex_count();
                if total > self.layout.max_guide_vertices {
                    return Err(BackendError::CapacityExceeded {
                        what: "guide vertex",
                        requested: total,
                        capacity: self.layout.max_guide_vertices,
                    });
                }
                let offset = self.layout.guide_data_offset
                    + self.guides.vertex_count() * GUIDE_VERTEX_FLOATS;
                let floats = mesh.as_floats();
                self.buffer[offset..offset + floats.len()].copy_from_slice(floats);
                self.guides.append(&mesh);
                self.guides_dirty = true;
            }
            ObjectDesc::Label { text, .. } => {
                label = Some(self.labels.len());
                self.labels.push(text.clone());
            }
            _ => {}
        }

        let handle = SceneGraphHandle(self.next_handle);
        self.next_handle += 1;
        self.graph.register_with(handle, local);
        if parent.is_some() {
            self.graph.set_parent(handle, parent);
        }
        self.objects.insert(handle, SceneObject { desc, label });
        Ok(handle)
    }

    fn set_transform(
        &mut self,
        handle: SceneGraphHandle,
        local: LocalTransform,
    ) -> Result<(), TransformUpdateError> {
        if !local.is_finite() {
            return Err(TransformUpdateError::NonFinite(handle));
        }
        if !self.objects.contains_key(&handle) || !self.graph.set_local(handle, local) {
            return Err(TransformUpdateError::UnknownHandle(handle));
        }
        Ok(())
    }

    fn set_material(
        &mut self,
        handle: SceneGraphHandle,
        material: Material,
    ) -> Result<(), TransformUpdateError> {
        let slot = self
            .objects
            .get_mut(&handle)
            .and_then(|o| o.desc.material_mut())
            .ok_or(TransformUpdateError::UnknownHandle(handle))?;
        *slot = material;
        Ok(())
    }

    fn destroy_object(&mut self, handle: SceneGraphHandle) {
        let Some(object) = self.objects.remove(&handle) else {
            log::debug!("destroy of unknown object {handle}");
            return;
        };
        if matches!(object.desc, ObjectDesc::OrbitGuides { .. }) {
            self.guides = GuideMesh::new();
            self.guides_dirty = true;
        }
        self.graph.remove(handle);
    }

    fn resize(&mut self, viewport: Viewport) {
        let (w, h) = viewport.buffer_size();
        log::debug!("drawing buffer now {w}x{h}");
        self.viewport = viewport;
    }

    fn submit_frame(&mut self, frame: &FrameData<'_>) -> Result<DrawTiming, BackendError> {
        if self.released {
            return Err(BackendError::SurfaceReleased);
        }
        if self.context_lost {
            return Err(BackendError::ContextLost);
        }

        self.graph.propagate();

        let mut instances = std::mem::take(&mut self.instances);
        instances.clear();
        for (handle, object) in &self.objects {
            if let Some(inst) = self.instance_for(*handle, object) {
                instances.push(inst);
            }
        }
        self.instances = instances;

        let cam = self.layout.camera_offset;
        self.buffer[cam..cam + CAMERA_FLOATS]
            .copy_from_slice(bytemuck::cast_slice(std::slice::from_ref(frame.camera)));
        let start = self.layout.instance_data_offset;
        let floats = self.instances.as_floats();
        self.buffer[start..start + floats.len()].copy_from_slice(floats);

        self.frame_counter += 1;
        self.write_header();
        self.guides_dirty = false;

        Ok(DrawTiming {
            instances: self.instances.instance_count(),
            guide_vertices: self.guides.vertex_count() as u32,
            frame: self.frame_counter,
        })
    }

    fn release_surface(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.instances.clear();
        self.write_header();
        log::info!("render surface released after {} frames", self.frame_counter);
    }

    fn object_count(&self) -> usize {
        self.objects.len()
    }
}
