// File: crates/overlay-core/src/config.rs
// Summary: Engine configuration loaded from JSON, with defaults for every field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, Result};
use crate::label::LabelConfig;
use crate::lod::DEFAULT_PX_PER_BUCKET;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Prefix of every storage key.
    pub namespace: String,
    pub magnet_tolerance_px: f64,
    pub hit_threshold_px: f64,
    /// Maximum undo depth; unbounded when absent.
    pub history_limit: Option<usize>,
    pub px_per_bucket: f64,
    pub grid_step_px: f64,
    pub labels: LabelConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            namespace: "overlay".to_string(),
            magnet_tolerance_px: 8.0,
            hit_threshold_px: 6.0,
            history_limit: None,
            px_per_bucket: DEFAULT_PX_PER_BUCKET,
            grid_step_px: 10.0,
            labels: LabelConfig::default(),
        }
    }
}

impl OverlayConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() { return Ok(Self::default()); }
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(OverlayError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let bad = |reason: &str| Err(OverlayError::Config { reason: reason.to_string() });
        if self.namespace.is_empty() { return bad("namespace must not be empty"); }
        if self.namespace.contains(['/', '\\']) { return bad("namespace must not contain path separators"); }
        if !(self.magnet_tolerance_px >= 0.0) { return bad("magnet_tolerance_px must be >= 0"); }
        if !(self.hit_threshold_px >= 0.0) { return bad("hit_threshold_px must be >= 0"); }
        if !(self.px_per_bucket > 0.0) { return bad("px_per_bucket must be > 0"); }
        if !(self.grid_step_px > 0.0) { return bad("grid_step_px must be > 0"); }
        Ok(())
    }
}
