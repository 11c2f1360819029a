pub mod lifecycle;

pub use lifecycle::{mount, unmount, LoopHandle, SurfaceContainer};

// Used by `export_orrery!` expansions so systems need not depend on them.
pub use js_sys;
pub use orrery_engine;

/// Route `log` output to the browser console and panics to `console.error`.
/// Safe to call on every mount; only the first call installs anything.
pub fn init_host_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Labels of the mounted scene as a JSON array, indexed by the `extra`
/// field of label instances.
pub fn labels_json(handle: &LoopHandle) -> String {
    let labels = handle.backend().map(|b| b.labels()).unwrap_or(&[]);
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

/// Generate all `#[wasm_bindgen]` exports for a system definition.
///
/// Generates:
/// - `thread_local!` storage for the mounted `LoopHandle`
/// - `with_handle()` helper function
/// - Lifecycle exports (`orrery_mount`, `orrery_frame`, `orrery_unmount`)
/// - Input, texture and context-loss exports
/// - Frame buffer accessors
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod bodies;
/// use bodies::SolarSystem;
///
/// orrery_web::export_orrery!(SolarSystem, "solar-system");
/// ```
///
/// # Arguments
///
/// - `$definition`: A type implementing `orrery_engine::SystemDefinition` with a `new()` constructor
/// - `$name`: A string literal used in log messages
#[macro_export]
macro_rules! export_orrery {
    ($definition:ty, $name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static HANDLE: RefCell<Option<$crate::LoopHandle>> = RefCell::new(None);
            static MOUNT_ERROR: RefCell<Option<String>> = RefCell::new(None);
        }

        /// Run `f` against the mounted handle. `None` when nothing is mounted.
        fn with_handle<R>(f: impl FnOnce(&mut $crate::LoopHandle) -> R) -> Option<R> {
            HANDLE.with(|cell| cell.borrow_mut().as_mut().map(f))
        }

        fn push(event: $crate::orrery_engine::InputEvent) {
            with_handle(|h| h.push_input(event));
        }

        // ---- Lifecycle ----

        /// Mount into a surface of `width`×`height` CSS pixels. Returns false
        /// when the definition is malformed; see `orrery_last_error`.
        #[wasm_bindgen]
        pub fn orrery_mount(width: f32, height: f32, device_pixel_ratio: f32) -> bool {
            $crate::init_host_logging();
            orrery_unmount();

            let definition = <$definition>::new();
            let surface = $crate::SurfaceContainer::new(width, height, device_pixel_ratio);
            match $crate::mount(&definition, surface) {
                Ok(handle) => {
                    HANDLE.with(|cell| *cell.borrow_mut() = Some(handle));
                    MOUNT_ERROR.with(|cell| *cell.borrow_mut() = None);
                    log::info!("{}: mounted", $name);
                    true
                }
                Err(e) => {
                    log::error!("{}: mount failed: {}", $name, e);
                    MOUNT_ERROR.with(|cell| *cell.borrow_mut() = Some(e.to_string()));
                    false
                }
            }
        }

        /// One tick at the `requestAnimationFrame` timestamp. False once stopped.
        #[wasm_bindgen]
        pub fn orrery_frame(now_ms: f64) -> bool {
            with_handle(|h| h.frame(now_ms)).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn orrery_unmount() {
            // Take the handle out first so its Drop never runs under the borrow.
            let handle = HANDLE.with(|cell| cell.borrow_mut().take());
            if let Some(mut handle) = handle {
                $crate::unmount(&mut handle);
                log::info!("{}: unmounted", $name);
            }
        }

        #[wasm_bindgen]
        pub fn orrery_last_error() -> Option<String> {
            with_handle(|h| h.last_error().map(str::to_string))
                .flatten()
                .or_else(|| MOUNT_ERROR.with(|cell| cell.borrow().clone()))
        }

        // ---- Input ----

        #[wasm_bindgen]
        pub fn orrery_drag(dx: f32, dy: f32) {
            push($crate::orrery_engine::InputEvent::Drag { dx, dy });
        }

        #[wasm_bindgen]
        pub fn orrery_zoom(delta: f32) {
            push($crate::orrery_engine::InputEvent::Zoom { delta });
        }

        #[wasm_bindgen]
        pub fn orrery_pan(dx: f32, dy: f32) {
            push($crate::orrery_engine::InputEvent::Pan { dx, dy });
        }

        #[wasm_bindgen]
        pub fn orrery_resize(width: f32, height: f32, device_pixel_ratio: f32) {
            push($crate::orrery_engine::InputEvent::Resize { width, height, device_pixel_ratio });
        }

        #[wasm_bindgen]
        pub fn orrery_toggle_pause() {
            push($crate::orrery_engine::InputEvent::TogglePause);
        }

        #[wasm_bindgen]
        pub fn orrery_set_time_scale(scale: f32) {
            push($crate::orrery_engine::InputEvent::SetTimeScale { scale });
        }

        #[wasm_bindgen]
        pub fn orrery_reset_view() {
            push($crate::orrery_engine::InputEvent::ResetView);
        }

        // ---- Textures and context ----

        #[wasm_bindgen]
        pub fn orrery_texture_manifest() -> String {
            with_handle(|h| h.manifest_json()).flatten().unwrap_or_default()
        }

        /// Asset ids the host should load, sorted.
        #[wasm_bindgen]
        pub fn orrery_texture_ids() -> $crate::js_sys::Array {
            let ids = $crate::js_sys::Array::new();
            with_handle(|h| {
                if let Some(fl) = h.frame_loop() {
                    for id in fl.manifest().textures.keys() {
                        ids.push(&id.as_str().into());
                    }
                }
            });
            ids
        }

        #[wasm_bindgen]
        pub fn orrery_texture_loaded(asset: &str, slot: u32) {
            with_handle(|h| h.texture_loaded(asset, slot));
        }

        #[wasm_bindgen]
        pub fn orrery_texture_failed(asset: &str, reason: &str) {
            with_handle(|h| h.texture_failed(asset, reason));
        }

        #[wasm_bindgen]
        pub fn orrery_context_lost() {
            with_handle(|h| h.context_lost());
        }

        #[wasm_bindgen]
        pub fn orrery_labels() -> String {
            with_handle(|h| $crate::labels_json(h)).unwrap_or_else(|| "[]".to_string())
        }

        // ---- Frame buffer accessors ----

        #[wasm_bindgen]
        pub fn orrery_buffer_ptr() -> *const f32 {
            with_handle(|h| h.backend().map(|b| b.buffer_ptr()))
                .flatten()
                .unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn orrery_buffer_total_floats() -> u32 {
            with_handle(|h| h.backend().map(|b| b.layout().buffer_total_floats as u32))
                .flatten()
                .unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn orrery_camera_offset() -> u32 {
            with_handle(|h| h.backend().map(|b| b.layout().camera_offset as u32))
                .flatten()
                .unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn orrery_instance_data_offset() -> u32 {
            with_handle(|h| h.backend().map(|b| b.layout().instance_data_offset as u32))
                .flatten()
                .unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn orrery_guide_data_offset() -> u32 {
            with_handle(|h| h.backend().map(|b| b.layout().guide_data_offset as u32))
                .flatten()
                .unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn orrery_instance_count() -> u32 {
            with_handle(|h| h.backend().map(|b| b.instance_count() as u32))
                .flatten()
                .unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn orrery_guide_vertex_count() -> u32 {
            with_handle(|h| h.backend().map(|b| b.guide_vertex_count() as u32))
                .flatten()
                .unwrap_or(0)
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn orrery_max_instances() -> u32 {
            with_handle(|h| h.backend().map(|b| b.layout().max_instances as u32))
                .flatten()
                .unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn orrery_max_guide_vertices() -> u32 {
            with_handle(|h| h.backend().map(|b| b.layout().max_guide_vertices as u32))
                .flatten()
                .unwrap_or(0)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_engine::{CelestialBody, CentralBody, SystemDefinition};

    struct Lone;

    impl SystemDefinition for Lone {
        fn central(&self) -> CentralBody {
            CentralBody::new("Sun", "sun", 10.0, 0.004)
        }

        fn bodies(&self) -> Vec<CelestialBody> {
            vec![CelestialBody::new("Mars", "mars").with_orbit(50.0, 0.005)]
        }
    }

    #[test]
    fn labels_follow_registry_order() {
        let mut handle = mount(&Lone, SurfaceContainer::new(640.0, 480.0, 1.0)).unwrap();
        assert_eq!(labels_json(&handle), r#"["Mars"]"#);
        unmount(&mut handle);
        assert_eq!(labels_json(&handle), "[]");
    }
}
