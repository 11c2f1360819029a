//! Error taxonomy for the orrery.
//!
//! Only the frame loop decides whether an error is fatal. Lower layers
//! report and move on: asset failures keep the fallback material, transform
//! failures skip one body for one tick.

use crate::api::types::{AssetId, SceneGraphHandle};

/// Malformed static configuration. Fatal at startup, nothing renders.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A body has an empty name.
    #[error("body #{index} has an empty name")]
    EmptyName { index: usize },

    /// Two bodies share a name (names key labels and ring lookup).
    #[error("duplicate body name `{0}`")]
    DuplicateName(String),

    /// A radius that must be strictly positive is not.
    #[error("`{body}`: {field} must be a finite value > 0 (got {value})")]
    NonPositiveRadius {
        body: String,
        field: &'static str,
        value: f64,
    },

    /// A rate is NaN or infinite.
    #[error("`{body}`: {field} must be finite (got {value})")]
    NonFiniteRate {
        body: String,
        field: &'static str,
        value: f64,
    },

    /// Ring inner radius is not below its outer radius.
    #[error("`{body}`: ring inner radius {inner} must be below outer radius {outer}")]
    InvalidRing { body: String, inner: f64, outer: f64 },

    /// An engine setting is out of range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    /// JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[source] serde_json::Error),
}

/// A texture failed to load. Recovered locally by keeping the fallback material.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("texture `{asset}` failed to load: {reason}")]
pub struct AssetLoadError {
    pub asset: AssetId,
    pub reason: String,
}

/// A single body's transform could not be written this tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformUpdateError {
    /// The backend does not know this handle.
    #[error("unknown scene graph handle {0}")]
    UnknownHandle(SceneGraphHandle),

    /// Position or angle contained NaN/inf.
    #[error("non-finite transform for {0}")]
    NonFinite(SceneGraphHandle),

    /// The composer has already released its objects.
    #[error("scene released; write to {0} rejected")]
    Released(SceneGraphHandle),
}

/// Render backend failure. Fatal: stops the loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The drawing context was lost (e.g. `webglcontextlost`).
    #[error("render context lost")]
    ContextLost,

    /// More objects or vertices than the frame protocol can carry.
    #[error("{what} capacity exceeded ({requested} > {capacity})")]
    CapacityExceeded {
        what: &'static str,
        requested: usize,
        capacity: usize,
    },

    /// The surface has been released and can no longer be drawn to.
    #[error("render surface released")]
    SurfaceReleased,

    /// Device-level failure reported by the host.
    #[error("render device error: {0}")]
    Device(String),
}

/// Umbrella error returned across the public API.
#[derive(Debug, thiserror::Error)]
pub enum OrreryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Asset(#[from] AssetLoadError),

    #[error(transparent)]
    Transform(#[from] TransformUpdateError),

    /// The loop was stopped; it cannot be ticked again.
    #[error("frame loop is stopped")]
    LoopStopped,
}

impl OrreryError {
    /// Whether this error ends the mount.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            OrreryError::Config(_) | OrreryError::Backend(_) | OrreryError::LoopStopped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_names_body_and_field() {
        let err = ConfigError::NonPositiveRadius {
            body: "Mars".into(),
            field: "orbit_radius",
            value: -1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("Mars"));
        assert!(msg.contains("orbit_radius"));
    }

    #[test]
    fn fatality_follows_taxonomy() {
        assert!(OrreryError::from(BackendError::ContextLost).is_fatal());
        assert!(OrreryError::from(ConfigError::DuplicateName("Earth".into())).is_fatal());
        assert!(!OrreryError::from(TransformUpdateError::NonFinite(SceneGraphHandle(1))).is_fatal());
        let asset = AssetLoadError {
            asset: AssetId::from("ring"),
            reason: "404".into(),
        };
        assert!(!OrreryError::from(asset).is_fatal());
    }
}
