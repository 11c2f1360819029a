/// Input event types the orrery understands.
/// Pointer deltas are in CSS pixels; the camera turns them into world motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Rotate the camera around its target.
    Drag { dx: f32, dy: f32 },
    /// Wheel/pinch. Positive zooms out.
    Zoom { delta: f32 },
    /// Move the camera target in the view plane.
    Pan { dx: f32, dy: f32 },
    /// The host surface changed size.
    Resize {
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
    },
    /// Freeze or unfreeze simulated time. The camera stays live.
    TogglePause,
    /// Simulated seconds per clock second.
    SetTimeScale { scale: f32 },
    /// Restore the configured camera view.
    ResetView,
}

/// A queue of input events.
/// The host writes events between ticks; the frame loop drains them at the
/// start of the next tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop pending events without applying them.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
