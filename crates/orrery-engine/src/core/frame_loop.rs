use glam::DVec3;

use crate::api::config::OrreryConfig;
use crate::api::error::{AssetLoadError, OrreryError};
use crate::api::types::{AssetId, TextureSlot};
use crate::assets::manifest::AssetManifest;
use crate::assets::registry::TextureRegistry;
use crate::bodies::BodyRegistry;
use crate::core::clock::{SimulationClock, TimeSource};
use crate::core::orbit::{advance, spin, BodyRenderState};
use crate::core::scene::SceneComposer;
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::camera::{CameraController, Viewport};
use crate::renderer::traits::{DrawTiming, FrameData, RenderBackend};

/// Whether the loop still accepts ticks. There is no way back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Outcome of one successful tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Elapsed tick units used for every body this tick.
    pub elapsed: f64,
    pub bodies_updated: usize,
    /// Bodies whose transform write failed; they keep last tick's pose.
    pub bodies_skipped: usize,
    pub timing: DrawTiming,
}

/// Drives simulation, camera and frame submission, one tick per host frame.
///
/// Owns every piece of mutable state for one mount. Ticks are strictly
/// sequential; input pushed between ticks is applied at the next one.
pub struct FrameLoop<B: RenderBackend> {
    state: LoopState,
    time_source: Box<dyn TimeSource>,
    clock: SimulationClock,
    registry: BodyRegistry,
    composer: SceneComposer<B>,
    camera: CameraController,
    input: InputQueue,
    body_states: Vec<BodyRenderState>,
    central_angle: f64,
    textures: TextureRegistry,
    manifest: AssetManifest,
    ticks: u64,
}

impl<B: RenderBackend> FrameLoop<B> {
    /// Build the scene and start running. The first clock sample is the epoch.
    pub fn start(
        registry: BodyRegistry,
        config: &OrreryConfig,
        backend: B,
        viewport: Viewport,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, OrreryError> {
        config.validate()?;
        let composer = SceneComposer::build(&registry, config, backend)?;
        let manifest = AssetManifest::for_system(&registry, config);
        let clock = SimulationClock::start(time_source.now_seconds(), config.ticks_per_second);
        let body_states = (0..registry.len()).map(BodyRenderState::new).collect();

        log::info!(
            "frame loop started: {} bodies around `{}`",
            registry.len(),
            registry.central().name
        );

        Ok(Self {
            state: LoopState::Running,
            time_source,
            clock,
            camera: CameraController::new(&config.camera, viewport),
            composer,
            input: InputQueue::new(),
            body_states,
            central_angle: 0.0,
            textures: TextureRegistry::from_manifest(&manifest),
            manifest,
            registry,
            ticks: 0,
        })
    }

    /// Queue input for the next tick. Dropped once stopped.
    pub fn push_input(&mut self, event: InputEvent) {
        if self.state == LoopState::Running {
            self.input.push(event);
        }
    }

    /// Run one iteration: simulate, apply input, submit exactly one frame.
    pub fn tick(&mut self) -> Result<TickReport, OrreryError> {
        if self.state == LoopState::Stopped {
            return Err(OrreryError::LoopStopped);
        }

        let now = self.time_source.now_seconds();
        let elapsed = self.clock.elapsed(now);

        self.central_angle = spin(elapsed, self.registry.central().spin_rate);
        let central = self.composer.central_handle();
        if let Err(e) = self.composer.set_body_transform(central, DVec3::ZERO, self.central_angle) {
            log::warn!("central body not updated this tick: {e}");
        }

        let mut updated = 0;
        let mut skipped = 0;
        for (i, body) in self.registry.list_bodies().iter().enumerate() {
            let sample = advance(elapsed, body);
            self.body_states[i].apply(sample);
            let mesh = self.composer.body_nodes()[i].mesh;
            match self
                .composer
                .set_body_transform(mesh, sample.position, sample.self_rotation_angle)
            {
                Ok(()) => updated += 1,
                Err(e) => {
                    log::warn!("skipping `{}` this tick: {e}", body.name);
                    skipped += 1;
                }
            }
        }

        for event in self.input.drain() {
            self.apply_input(event, now);
        }
        self.camera.tick_damp();
        if let Some(viewport) = self.camera.take_resize() {
            self.composer.backend_mut().resize(viewport);
        }

        let camera = self.camera.uniform();
        let frame = FrameData { camera: &camera };
        match self.composer.backend_mut().submit_frame(&frame) {
            Ok(timing) => {
                self.ticks += 1;
                Ok(TickReport {
                    elapsed,
                    bodies_updated: updated,
                    bodies_skipped: skipped,
                    timing,
                })
            }
            Err(e) => {
                log::error!("render backend failed, stopping: {e}");
                self.stop();
                Err(e.into())
            }
        }
    }

    fn apply_input(&mut self, event: InputEvent, now: f64) {
        match event {
            InputEvent::Drag { dx, dy } => self.camera.on_drag_input(dx, dy),
            InputEvent::Zoom { delta } => self.camera.on_zoom_input(delta),
            InputEvent::Pan { dx, dy } => self.camera.on_pan_input(dx, dy),
            InputEvent::Resize {
                width,
                height,
                device_pixel_ratio,
            } => self.camera.on_resize(width, height, device_pixel_ratio),
            InputEvent::TogglePause => {
                self.clock.toggle_pause(now);
                log::info!("simulation {}", if self.clock.is_paused() { "paused" } else { "resumed" });
            }
            InputEvent::SetTimeScale { scale } => self.clock.set_time_scale(now, scale as f64),
            InputEvent::ResetView => self.camera.reset_view(),
        }
    }

    /// Stop and release everything. Synchronous and idempotent.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;
        self.input.clear();
        self.composer.release();
        log::info!("frame loop stopped after {} ticks", self.ticks);
    }

    /// The host uploaded a texture.
    pub fn texture_loaded(&mut self, asset: &AssetId, slot: TextureSlot) {
        if self.state == LoopState::Stopped {
            return;
        }
        if !self.textures.mark_loaded(asset, slot) {
            log::warn!("texture `{asset}` is not in the manifest");
        }
        self.composer.apply_texture(asset, slot);
    }

    /// The host gave up on a texture. Returns the logged error.
    pub fn texture_failed(&mut self, asset: &AssetId, reason: &str) -> Option<AssetLoadError> {
        if self.state == LoopState::Stopped {
            return None;
        }
        let err = self.textures.mark_failed(asset, reason);
        self.composer.texture_failed(&err);
        Some(err)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn body_states(&self) -> &[BodyRenderState] {
        &self.body_states
    }

    pub fn central_angle(&self) -> f64 {
        self.central_angle
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn composer(&self) -> &SceneComposer<B> {
        &self.composer
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn backend(&self) -> &B {
        self.composer.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.composer.backend_mut()
    }
}

impl<B: RenderBackend> Drop for FrameLoop<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
