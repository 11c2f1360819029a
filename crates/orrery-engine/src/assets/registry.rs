use std::collections::HashMap;

use crate::api::error::AssetLoadError;
use crate::api::types::{AssetId, TextureSlot};
use crate::assets::manifest::AssetManifest;

/// Load state of one texture as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureStatus {
    Pending,
    Loaded(TextureSlot),
    Failed(String),
}

/// Tracks which textures the host has delivered.
/// Built from an AssetManifest; unknown ids reported by the host are ignored.
pub struct TextureRegistry {
    textures: HashMap<AssetId, TextureStatus>,
}

impl TextureRegistry {
    /// Build a registry with every manifest entry pending.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let textures = manifest
            .textures
            .keys()
            .map(|id| (id.clone(), TextureStatus::Pending))
            .collect();
        Self { textures }
    }

    /// Record a successful upload. Returns false for ids not in the manifest.
    pub fn mark_loaded(&mut self, id: &AssetId, slot: TextureSlot) -> bool {
        match self.textures.get_mut(id) {
            Some(status) => {
                *status = TextureStatus::Loaded(slot);
                true
            }
            None => false,
        }
    }

    /// Record a failure and hand back the error for logging.
    pub fn mark_failed(&mut self, id: &AssetId, reason: impl Into<String>) -> AssetLoadError {
        let reason = reason.into();
        if let Some(status) = self.textures.get_mut(id) {
            *status = TextureStatus::Failed(reason.clone());
        }
        AssetLoadError {
            asset: id.clone(),
            reason,
        }
    }

    pub fn status(&self, id: &AssetId) -> Option<&TextureStatus> {
        self.textures.get(id)
    }

    pub fn slot(&self, id: &AssetId) -> Option<TextureSlot> {
        match self.textures.get(id) {
            Some(TextureStatus::Loaded(slot)) => Some(*slot),
            _ => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.textures
            .values()
            .filter(|s| matches!(s, TextureStatus::Pending))
            .count()
    }
}
