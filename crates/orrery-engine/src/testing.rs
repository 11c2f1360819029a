//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::config::OrreryConfig;
use crate::api::error::{BackendError, TransformUpdateError};
use crate::api::types::SceneGraphHandle;
use crate::bodies::{BodyRegistry, CelestialBody, CentralBody};
use crate::bridge::protocol::ProtocolLayout;
use crate::components::material::Material;
use crate::extensions::transform::LocalTransform;
use crate::renderer::camera::Viewport;
use crate::renderer::headless::HeadlessBackend;
use crate::renderer::traits::{DrawTiming, FrameData, ObjectDesc, RenderBackend};

/// Every call that reaches the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Create,
    SetTransform(SceneGraphHandle),
    SetMaterial(SceneGraphHandle),
    Destroy(SceneGraphHandle),
    Resize(Viewport),
    Submit,
    Release,
}

pub type CallLog = Rc<RefCell<Vec<BackendCall>>>;

/// Headless backend that records its calls into a log the test keeps.
pub struct RecordingBackend {
    pub inner: HeadlessBackend,
    pub calls: CallLog,
}

impl RecordingBackend {
    pub fn new(config: &OrreryConfig) -> (Self, CallLog) {
        let calls = CallLog::default();
        let backend = Self {
            inner: HeadlessBackend::new(ProtocolLayout::from_config(config), Viewport::default()),
            calls: Rc::clone(&calls),
        };
        (backend, calls)
    }

    fn record(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl RenderBackend for RecordingBackend {
    fn backend(&self) -> &'static str {
        "recording"
    }

    fn create_object(
        &mut self,
        desc: ObjectDesc,
        parent: Option<SceneGraphHandle>,
        local: LocalTransform,
    ) -> Result<SceneGraphHandle, BackendError> {
        self.record(BackendCall::Create);
        self.inner.create_object(desc, parent, local)
    }

    fn set_transform(
        &mut self,
        handle: SceneGraphHandle,
        local: LocalTransform,
    ) -> Result<(), TransformUpdateError> {
        self.record(BackendCall::SetTransform(handle));
        self.inner.set_transform(handle, local)
    }

    fn set_material(
        &mut self,
        handle: SceneGraphHandle,
        material: Material,
    ) -> Result<(), TransformUpdateError> {
        self.record(BackendCall::SetMaterial(handle));
        self.inner.set_material(handle, material)
    }

    fn destroy_object(&mut self, handle: SceneGraphHandle) {
        self.record(BackendCall::Destroy(handle));
        self.inner.destroy_object(handle)
    }

    fn resize(&mut self, viewport: Viewport) {
        self.record(BackendCall::Resize(viewport));
        self.inner.resize(viewport)
    }

    fn submit_frame(&mut self, frame: &FrameData<'_>) -> Result<DrawTiming, BackendError> {
        self.record(BackendCall::Submit);
        self.inner.submit_frame(frame)
    }

    fn release_surface(&mut self) {
        self.record(BackendCall::Release);
        self.inner.release_surface()
    }

    fn object_count(&self) -> usize {
        self.inner.object_count()
    }
}

/// Sun plus the eight planets, Saturn's ring resolved from the default config.
pub fn solar_registry() -> BodyRegistry {
    let planets = [
        ("Mercury", 1.5, 20.0, 0.004, 0.02),
        ("Venus", 2.8, 30.0, 0.002, 0.015),
        ("Earth", 3.0, 40.0, 0.03, 0.02 / 3.0),
        ("Mars", 2.2, 50.0, 0.028, 0.005),
        ("Jupiter", 7.0, 70.0, 0.06, 0.002),
        ("Saturn", 6.0, 90.0, 0.055, 0.0009),
        ("Uranus", 4.5, 110.0, 0.04, 0.0004),
        ("Neptune", 4.3, 130.0, 0.042, 0.0001),
    ];
    let bodies = planets
        .iter()
        .map(|&(name, visual, orbit, spin, rate)| {
            CelestialBody::new(name, name.to_lowercase())
                .with_orbit(orbit, rate)
                .with_visual_radius(visual)
                .with_rotation_rate(spin)
        })
        .collect();
    let central = CentralBody::new("Sun", "sun", 10.0, 0.004);
    BodyRegistry::new(central, bodies)
        .and_then(|r| r.with_configured_ring(&OrreryConfig::default()))
        .unwrap()
}
