use orrery_engine::{
    AssetId, ConfigError, FrameLoop, HeadlessBackend, HostClock, InputEvent, OrreryError,
    ProtocolLayout, SystemDefinition, TextureSlot, Viewport,
};

/// The host element the orrery draws into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContainer {
    /// CSS pixels.
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl SurfaceContainer {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.device_pixel_ratio)
    }
}

/// One mounted orrery. Owns the frame loop; dropping the handle unmounts.
///
/// Each concrete system (e.g., `solar-system`) keeps its handle in a
/// `thread_local!` generated by `export_orrery!`, because wasm-bindgen
/// cannot export generic structs directly.
pub struct LoopHandle {
    frame_loop: Option<FrameLoop<HeadlessBackend>>,
    clock: HostClock,
    /// Host timestamp of the first frame; simulated time starts there.
    origin_ms: Option<f64>,
    last_error: Option<String>,
}

/// Build the system described by `definition` and start its loop.
///
/// A malformed definition returns `ConfigError` and nothing is created.
pub fn mount<D: SystemDefinition>(definition: &D, surface: SurfaceContainer) -> Result<LoopHandle, OrreryError> {
    let config = definition.config();
    config.validate()?;
    let registry = definition.registry(&config)?;

    let viewport = surface.viewport();
    if !viewport.is_drawable() {
        return Err(ConfigError::InvalidSetting {
            field: "surface",
            reason: format!("cannot draw into {}x{} @{}", surface.width, surface.height, surface.device_pixel_ratio),
        }
        .into());
    }

    let backend = HeadlessBackend::new(ProtocolLayout::from_config(&config), viewport);
    let clock = HostClock::new();
    let frame_loop = FrameLoop::start(registry, &config, backend, viewport, Box::new(clock.clone()))?;

    Ok(LoopHandle {
        frame_loop: Some(frame_loop),
        clock,
        origin_ms: None,
        last_error: None,
    })
}

/// Stop the loop and release every scene object before returning.
/// Calling it again is a no-op.
pub fn unmount(handle: &mut LoopHandle) {
    if let Some(mut frame_loop) = handle.frame_loop.take() {
        frame_loop.stop();
        log::info!("orrery unmounted");
    }
}

impl LoopHandle {
    /// Run one tick at the host's refresh timestamp (milliseconds).
    /// Returns false once the loop has stopped, for whatever reason.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        let Some(frame_loop) = self.frame_loop.as_mut() else {
            return false;
        };
        let origin = *self.origin_ms.get_or_insert(now_ms);
        self.clock.set_millis(now_ms - origin);

        match frame_loop.tick() {
            Ok(_) => true,
            Err(e) => {
                if e.is_fatal() && self.last_error.is_none() {
                    self.last_error = Some(e.to_string());
                }
                frame_loop.is_running()
            }
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.push_input(event);
        }
    }

    pub fn texture_loaded(&mut self, asset: &str, slot: u32) {
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.texture_loaded(&AssetId::from(asset), TextureSlot(slot));
        }
    }

    pub fn texture_failed(&mut self, asset: &str, reason: &str) {
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.texture_failed(&AssetId::from(asset), reason);
        }
    }

    /// The host's drawing context is gone. The next frame stops the loop.
    pub fn context_lost(&mut self) {
        if let Some(frame_loop) = self.frame_loop.as_mut() {
            frame_loop.backend_mut().lose_context();
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.as_ref().is_some_and(|fl| fl.is_running())
    }

    /// The first fatal error, for display to the user.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn frame_loop(&self) -> Option<&FrameLoop<HeadlessBackend>> {
        self.frame_loop.as_ref()
    }

    pub fn backend(&self) -> Option<&HeadlessBackend> {
        self.frame_loop.as_ref().map(|fl| fl.backend())
    }

    /// Texture manifest as JSON, for the host loader.
    pub fn manifest_json(&self) -> Option<String> {
        let frame_loop = self.frame_loop.as_ref()?;
        match frame_loop.manifest().to_json() {
            Ok(json) => Some(json),
            Err(e) => {
                log::error!("failed to serialize texture manifest: {e}");
                None
            }
        }
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        unmount(self);
    }
}
