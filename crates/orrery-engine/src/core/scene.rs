use glam::{DVec3, Vec3};

use crate::api::config::OrreryConfig;
use crate::api::error::{AssetLoadError, BackendError, OrreryError, TransformUpdateError};
use crate::api::types::{AssetId, SceneGraphHandle, TextureSlot};
use crate::bodies::BodyRegistry;
use crate::components::material::Material;
use crate::core::orbit::{orbit_path, wrap_angle};
use crate::extensions::transform::LocalTransform;
use crate::renderer::traits::{ObjectDesc, RenderBackend};
use crate::systems::vector::GuideColor;

const RING_COLOR: [f32; 3] = [0.8, 0.75, 0.6];
const SKY_COLOR: [f32; 3] = [0.01, 0.01, 0.03];
const LABEL_HEIGHT: f32 = 2.0;
const AMBIENT_INTENSITY: f32 = 0.15;
const SUNLIGHT_INTENSITY: f32 = 1.5;

/// Backend objects belonging to one orbiting body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyNodes {
    pub mesh: SceneGraphHandle,
    /// Child of `mesh`; positioned by a fixed local offset.
    pub label: SceneGraphHandle,
    /// Child of `mesh`, present when the body has a ring.
    pub ring: Option<SceneGraphHandle>,
}

/// Builds the scene graph once and owns every handle in it.
///
/// After `build` the composer only writes transforms and materials; it never
/// creates or destroys objects until `release`.
pub struct SceneComposer<B: RenderBackend> {
    backend: B,
    central: SceneGraphHandle,
    bodies: Vec<BodyNodes>,
    guides: SceneGraphHandle,
    environment: Vec<SceneGraphHandle>,
    /// Current material of every textured object.
    materials: Vec<(SceneGraphHandle, Material)>,
    released: bool,
}

impl<B: RenderBackend> SceneComposer<B> {
    /// Create every object for `registry`. On failure, whatever was created is
    /// destroyed and the surface released before the error is returned.
    pub fn build(registry: &BodyRegistry, config: &OrreryConfig, mut backend: B) -> Result<Self, OrreryError> {
        let mut builder = Builder {
            backend: &mut backend,
            created: Vec::new(),
            materials: Vec::new(),
        };
        match builder.compose(registry, config) {
            Ok((central, bodies, guides, environment)) => {
                let materials = builder.materials;
                log::info!(
                    "scene built: {} bodies, {} objects on `{}` backend",
                    bodies.len(),
                    backend.object_count(),
                    backend.backend()
                );
                Ok(Self {
                    backend,
                    central,
                    bodies,
                    guides,
                    environment,
                    materials,
                    released: false,
                })
            }
            Err(e) => {
                let created = builder.created;
                for handle in created.into_iter().rev() {
                    backend.destroy_object(handle);
                }
                backend.release_surface();
                log::error!("scene build failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Write one body's transform. Touches no backend state on error.
    pub fn set_body_transform(
        &mut self,
        handle: SceneGraphHandle,
        position: DVec3,
        rotation_angle: f64,
    ) -> Result<(), TransformUpdateError> {
        if self.released {
            return Err(TransformUpdateError::Released(handle));
        }
        if !(position.is_finite() && rotation_angle.is_finite()) {
            return Err(TransformUpdateError::NonFinite(handle));
        }
        let local = LocalTransform::new()
            .with_translation(position.as_vec3())
            .with_rotation_y(wrap_angle(rotation_angle) as f32);
        self.backend.set_transform(handle, local)
    }

    /// Swap every object using `asset` from its fallback color to `slot`.
    /// Returns how many objects changed.
    pub fn apply_texture(&mut self, asset: &AssetId, slot: TextureSlot) -> usize {
        if self.released {
            return 0;
        }
        let mut applied = 0;
        for (handle, material) in self.materials.iter_mut().filter(|(_, m)| &m.asset == asset) {
            material.texture = Some(slot);
            match self.backend.set_material(*handle, material.clone()) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("texture `{asset}` not applied: {e}"),
            }
        }
        applied
    }

    /// A texture will never arrive. Objects keep their fallback color.
    /// Returns how many objects stay on the fallback.
    pub fn texture_failed(&self, err: &AssetLoadError) -> usize {
        let affected = self.materials.iter().filter(|(_, m)| m.asset == err.asset).count();
        log::warn!("{err}; keeping fallback color on {affected} objects");
        affected
    }

    /// Body meshes + labels, the orbit-guide group, the central body and rings.
    pub fn scene_object_count(&self) -> usize {
        if self.released {
            return 0;
        }
        let rings = self.bodies.iter().filter(|b| b.ring.is_some()).count();
        2 * self.bodies.len() + 1 + 1 + rings
    }

    /// Lights and the star background.
    pub fn environment_object_count(&self) -> usize {
        if self.released {
            0
        } else {
            self.environment.len()
        }
    }

    pub fn body_nodes(&self) -> &[BodyNodes] {
        &self.bodies
    }

    pub fn central_handle(&self) -> SceneGraphHandle {
        self.central
    }

    pub fn guides_handle(&self) -> SceneGraphHandle {
        self.guides
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Destroy every object, then release the surface. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for body in &self.bodies {
            if let Some(ring) = body.ring {
                self.backend.destroy_object(ring);
            }
            self.backend.destroy_object(body.label);
            self.backend.destroy_object(body.mesh);
        }
        self.backend.destroy_object(self.guides);
        self.backend.destroy_object(self.central);
        for handle in &self.environment {
            self.backend.destroy_object(*handle);
        }
        self.materials.clear();
        self.backend.release_surface();
        log::info!("scene released");
    }
}

type Composed = (SceneGraphHandle, Vec<BodyNodes>, SceneGraphHandle, Vec<SceneGraphHandle>);

/// Tracks what has been created so a failed build can be unwound.
struct Builder<'a, B: RenderBackend> {
    backend: &'a mut B,
    created: Vec<SceneGraphHandle>,
    materials: Vec<(SceneGraphHandle, Material)>,
}

impl<B: RenderBackend> Builder<'_, B> {
    fn create(
        &mut self,
        desc: ObjectDesc,
        parent: Option<SceneGraphHandle>,
        local: LocalTransform,
    ) -> Result<SceneGraphHandle, BackendError> {
        let material = desc.material().cloned();
        let handle = self.backend.create_object(desc, parent, local)?;
        self.created.push(handle);
        if let Some(material) = material {
            self.materials.push((handle, material));
        }
        Ok(handle)
    }

    fn compose(&mut self, registry: &BodyRegistry, config: &OrreryConfig) -> Result<Composed, BackendError> {
        let sun = registry.central();
        let central = self.create(
            ObjectDesc::Sphere {
                radius: sun.visual_radius as f32,
                material: Material::fallback(sun.asset.clone(), sun.color).with_emissive(sun.emissive),
            },
            None,
            LocalTransform::new(),
        )?;

        let mut bodies = Vec::with_capacity(registry.len());
        for body in registry.list_bodies() {
            let mesh = self.create(
                ObjectDesc::Sphere {
                    radius: body.visual_radius as f32,
                    material: Material::fallback(body.asset.clone(), body.color),
                },
                None,
                LocalTransform::new().with_translation(Vec3::new(body.orbit_radius as f32, 0.0, 0.0)),
            )?;

            let offset = (body.visual_radius + config.label_offset) as f32;
            let label = self.create(
                ObjectDesc::Label {
                    text: body.name.clone(),
                    height: LABEL_HEIGHT,
                },
                Some(mesh),
                LocalTransform::new()
                    .with_translation(Vec3::new(0.0, offset, 0.0))
                    .without_parent_rotation(),
            )?;

            let ring = match &body.ring {
                Some(spec) => Some(self.create(
                    ObjectDesc::Ring {
                        inner_radius: spec.inner_radius as f32,
                        outer_radius: spec.outer_radius as f32,
                        material: Material::fallback(spec.asset.clone(), RING_COLOR).with_alpha(0.8),
                    },
                    Some(mesh),
                    LocalTransform::new().with_tilt_x(spec.tilt as f32).without_parent_rotation(),
                )?),
                None => None,
            };

            bodies.push(BodyNodes { mesh, label, ring });
        }

        let paths = registry
            .list_bodies()
            .iter()
            .map(|b| orbit_path(b.orbit_radius, config.orbit_segments))
            .collect();
        let guides = self.create(
            ObjectDesc::OrbitGuides {
                paths,
                width: config.orbit_guide_width,
                color: GuideColor::GUIDE,
            },
            None,
            LocalTransform::new(),
        )?;

        let reach = registry
            .list_bodies()
            .iter()
            .map(|b| b.orbit_radius)
            .fold(sun.visual_radius, f64::max) as f32;
        let environment = vec![
            self.create(
                ObjectDesc::AmbientLight {
                    color: [1.0, 1.0, 1.0],
                    intensity: AMBIENT_INTENSITY,
                },
                None,
                LocalTransform::new(),
            )?,
            self.create(
                ObjectDesc::PointLight {
                    color: [1.0, 0.95, 0.85],
                    intensity: SUNLIGHT_INTENSITY,
                    range: reach * 2.0,
                },
                None,
                LocalTransform::new(),
            )?,
            self.create(
                ObjectDesc::Background {
                    radius: config.camera.far * 0.9,
                    material: Material::fallback(AssetId::new(config.background_asset.clone()), SKY_COLOR),
                },
                None,
                LocalTransform::new(),
            )?,
        ];

        Ok((central, bodies, guides, environment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessBackend;
    use crate::testing::{solar_registry, BackendCall, RecordingBackend};
    use crate::bridge::protocol::ProtocolLayout;
    use crate::renderer::camera::Viewport;

    fn composer() -> (SceneComposer<RecordingBackend>, crate::testing::CallLog) {
        let config = OrreryConfig::default();
        let (backend, calls) = RecordingBackend::new(&config);
        let composer = SceneComposer::build(&solar_registry(), &config, backend).unwrap();
        (composer, calls)
    }

    #[test]
    fn object_count_matches_bodies_labels_guides_central_and_rings() {
        let (composer, _) = composer();
        // 8 bodies, 1 ring (Saturn)
        assert_eq!(composer.scene_object_count(), 2 * 8 + 1 + 1 + 1);
        assert_eq!(composer.environment_object_count(), 3);
        assert_eq!(composer.backend().object_count(), 19 + 3);
    }

    #[test]
    fn exactly_one_ring_on_saturn() {
        let (composer, _) = composer();
        let registry = solar_registry();
        let ringed: Vec<&str> = composer
            .body_nodes()
            .iter()
            .zip(registry.list_bodies())
            .filter(|(nodes, _)| nodes.ring.is_some())
            .map(|(_, body)| body.name.as_str())
            .collect();
        assert_eq!(ringed, ["Saturn"]);

        let saturn = composer.body_nodes()[5];
        let ring = saturn.ring.unwrap();
        assert_eq!(composer.backend().inner.parent(ring), Some(saturn.mesh));
        let local = composer.backend().inner.local_transform(ring).unwrap();
        assert!((local.tilt_x - 0.47).abs() < 1e-6);
        assert!(!local.inherit_rotation);
    }

    #[test]
    fn no_ring_when_no_name_matches() {
        let config = OrreryConfig {
            ringed_body: Some("Pluto".into()),
            ..OrreryConfig::default()
        };
        let registry = solar_registry();
        let bodies: Vec<_> = registry
            .list_bodies()
            .iter()
            .cloned()
            .map(|mut b| {
                b.ring = None;
                b
            })
            .collect();
        let registry = BodyRegistry::new(registry.central().clone(), bodies)
            .unwrap()
            .with_configured_ring(&config)
            .unwrap();
        let backend = HeadlessBackend::new(ProtocolLayout::from_config(&config), Viewport::default());
        let composer = SceneComposer::build(&registry, &config, backend).unwrap();
        assert!(composer.body_nodes().iter().all(|b| b.ring.is_none()));
        assert_eq!(composer.scene_object_count(), 2 * 8 + 2);
    }

    #[test]
    fn labels_hang_above_their_body() {
        let (composer, _) = composer();
        let earth = composer.body_nodes()[2];
        let inner = &composer.backend().inner;
        assert_eq!(inner.parent(earth.label), Some(earth.mesh));
        let offset = inner.local_transform(earth.label).unwrap().translation;
        assert!((offset.y - (3.0 + 2.0)).abs() < 1e-6);
        assert_eq!(inner.labels()[2], "Earth");
    }

    #[test]
    fn orbit_guides_are_one_object() {
        let (composer, _) = composer();
        let inner = &composer.backend().inner;
        assert!(inner.guide_vertex_count() > 0);
        assert!(inner.material(composer.guides_handle()).is_none());
    }

    #[test]
    fn non_finite_transform_never_reaches_backend() {
        let (mut composer, calls) = composer();
        let mesh = composer.body_nodes()[0].mesh;
        let before = calls.borrow().len();
        let err = composer
            .set_body_transform(mesh, DVec3::new(f64::NAN, 0.0, 0.0), 0.0)
            .unwrap_err();
        assert_eq!(err, TransformUpdateError::NonFinite(mesh));
        assert_eq!(calls.borrow().len(), before);
    }

    #[test]
    fn released_composer_rejects_writes_without_touching_backend() {
        let (mut composer, calls) = composer();
        let mesh = composer.body_nodes()[0].mesh;
        composer.release();
        composer.release();
        let releases = calls.borrow().iter().filter(|c| **c == BackendCall::Release).count();
        assert_eq!(releases, 1);
        assert_eq!(composer.backend().object_count(), 0);

        let before = calls.borrow().len();
        let err = composer.set_body_transform(mesh, DVec3::ZERO, 0.0).unwrap_err();
        assert_eq!(err, TransformUpdateError::Released(mesh));
        assert_eq!(composer.apply_texture(&AssetId::from("earth"), TextureSlot(1)), 0);
        assert_eq!(calls.borrow().len(), before);
    }

    #[test]
    fn texture_swaps_fallback_and_failure_keeps_it() {
        let (mut composer, _) = composer();
        let earth = composer.body_nodes()[2].mesh;
        let mars = composer.body_nodes()[3].mesh;

        assert_eq!(composer.apply_texture(&AssetId::from("earth"), TextureSlot(7)), 1);
        let err = AssetLoadError {
            asset: AssetId::from("mars"),
            reason: "404".into(),
        };
        assert_eq!(composer.texture_failed(&err), 1);

        let inner = &composer.backend().inner;
        assert_eq!(inner.material(earth).unwrap().texture, Some(TextureSlot(7)));
        assert_eq!(inner.material(mars).unwrap().texture, None);
    }

    #[test]
    fn failed_build_unwinds_created_objects() {
        let config = OrreryConfig {
            max_objects: 4,
            ..OrreryConfig::default()
        };
        let (backend, calls) = RecordingBackend::new(&config);
        let result = SceneComposer::build(&solar_registry(), &config, backend);
        assert!(matches!(
            result,
            Err(OrreryError::Backend(BackendError::CapacityExceeded { .. }))
        ));

        // Sun, Mercury + label, Venus created; Venus's label hit the cap.
        let calls = calls.borrow();
        let created = calls.iter().filter(|c| **c == BackendCall::Create).count();
        let destroyed: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::Destroy(h) => Some(h.0),
                _ => None,
            })
            .collect();
        assert_eq!(created, 5);
        assert_eq!(destroyed, [4, 3, 2, 1]);
        assert_eq!(calls.iter().filter(|c| **c == BackendCall::Release).count(), 1);
        assert_eq!(calls.last(), Some(&BackendCall::Release));
    }
}
