use crate::api::types::{AssetId, TextureSlot};

/// Surface appearance of a scene object.
///
/// Every object starts with its fallback color; `texture` is filled in once
/// the host reports the asset loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub asset: AssetId,
    pub color: [f32; 3],
    /// HDR glow multiplier (default: 0.0, values > 1 push into EDR range).
    pub emissive: f32,
    pub alpha: f32,
    pub texture: Option<TextureSlot>,
}

impl Material {
    /// Untextured material showing `color`.
    pub fn fallback(asset: AssetId, color: [f32; 3]) -> Self {
        Self {
            asset,
            color,
            emissive: 0.0,
            alpha: 1.0,
            texture: None,
        }
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn textured(mut self, slot: TextureSlot) -> Self {
        self.texture = Some(slot);
        self
    }

    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }
}
