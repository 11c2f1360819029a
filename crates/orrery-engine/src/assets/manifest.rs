use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::config::OrreryConfig;
use crate::api::types::AssetId;
use crate::bodies::BodyRegistry;

/// Texture manifest handed to the host loader: asset id → file.
/// Serialized to JSON for the host; can also be loaded from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Base path prepended by the host (e.g. "assets/textures/").
    #[serde(default)]
    pub base_path: String,
    pub textures: BTreeMap<AssetId, TextureDescriptor>,
}

/// Describes a single texture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureDescriptor {
    /// Relative path to the image (e.g., "earth.jpg").
    pub path: String,
    /// Equirectangular sky textures are drawn on the inside of a sphere.
    #[serde(default)]
    pub background: bool,
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Default manifest: one `<id>.<extension>` file per asset.
    pub fn for_assets<'a>(
        ids: impl IntoIterator<Item = &'a AssetId>,
        base_path: impl Into<String>,
        extension: &str,
    ) -> Self {
        let textures = ids
            .into_iter()
            .map(|id| {
                let desc = TextureDescriptor {
                    path: format!("{id}.{extension}"),
                    background: false,
                };
                (id.clone(), desc)
            })
            .collect();
        Self {
            base_path: base_path.into(),
            textures,
        }
    }

    /// Every texture a mounted system asks for: body and ring textures plus
    /// the configured sky, as `.jpg` files under `textures/`.
    pub fn for_system(registry: &BodyRegistry, config: &OrreryConfig) -> Self {
        let sky = AssetId::new(config.background_asset.clone());
        let sky_path = format!("{sky}.jpg");
        Self::for_assets(&registry.asset_ids(), "textures/", "jpg").with_background(sky, sky_path)
    }

    /// Add (or replace) the sky texture.
    pub fn with_background(mut self, id: AssetId, path: impl Into<String>) -> Self {
        self.textures.insert(
            id,
            TextureDescriptor {
                path: path.into(),
                background: true,
            },
        );
        self
    }

    pub fn get(&self, id: &AssetId) -> Option<&TextureDescriptor> {
        self.textures.get(id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest() {
        let json = r#"{
            "base_path": "textures/",
            "textures": {
                "earth": { "path": "earth.jpg" },
                "stars-background": { "path": "stars.jpg", "background": true }
            }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(manifest.get(&AssetId::from("stars-background")).unwrap().background);
        assert!(!manifest.get(&AssetId::from("earth")).unwrap().background);
    }

    #[test]
    fn default_paths_follow_asset_ids() {
        let ids = [AssetId::from("sun"), AssetId::from("ring")];
        let manifest = AssetManifest::for_assets(&ids, "textures/", "png")
            .with_background(AssetId::from("stars-background"), "stars.jpg");
        assert_eq!(manifest.get(&ids[0]).unwrap().path, "sun.png");
        assert_eq!(manifest.len(), 3);

        let back = AssetManifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn system_manifest_covers_bodies_ring_and_sky() {
        let manifest = AssetManifest::for_system(&crate::testing::solar_registry(), &OrreryConfig::default());
        // sun + 8 planets + ring + sky
        assert_eq!(manifest.len(), 11);
        assert!(manifest.get(&AssetId::from("ring")).is_some());
        assert!(manifest.get(&AssetId::from("stars-background")).unwrap().background);
    }
}
