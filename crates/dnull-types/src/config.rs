// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{FusionError, FusionResult};

/// Settings for converting a bottom-half solution to a double null.
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Substring the current geometry tag must contain (default: "dnbot").
    #[serde(default = "default_source_geometry")]
    pub source_geometry: String,
    /// Geometry tag written before regeneration (default: "dnull").
    #[serde(default = "default_target_geometry")]
    pub target_geometry: String,
    #[serde(default)]
    pub regeneration: RegenerationConfig,
    /// Multiplier applied to both core powers when the fixed-core-power
    /// model is active. Two core boundaries replace one (default: 2.0).
    #[serde(default = "default_core_power_factor")]
    pub core_power_factor: f64,
}

/// The one-shot relaxation step used to rebuild the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerationConfig {
    /// Convergence tolerance while regenerating (default: 1e10).
    #[serde(default = "default_relaxed_tolerance")]
    pub relaxed_tolerance: f64,
    /// Time step of the single quasi-static step (default: 1e-6).
    #[serde(default = "default_time_step")]
    pub time_step: f64,
    /// Tolerance restored afterwards (default: 1e-8).
    /// `null` restores whatever the solver held before relaxation.
    #[serde(default = "default_strict_tolerance")]
    pub strict_tolerance: Option<f64>,
}

fn default_source_geometry() -> String {
    "dnbot".to_string()
}
fn default_target_geometry() -> String {
    "dnull".to_string()
}
fn default_core_power_factor() -> f64 {
    2.0
}
fn default_relaxed_tolerance() -> f64 {
    1e10
}
fn default_time_step() -> f64 {
    1e-6
}
fn default_strict_tolerance() -> Option<f64> {
    Some(1e-8)
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        RegenerationConfig {
            relaxed_tolerance: default_relaxed_tolerance(),
            time_step: default_time_step(),
            strict_tolerance: default_strict_tolerance(),
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            source_geometry: default_source_geometry(),
            target_geometry: default_target_geometry(),
            regeneration: RegenerationConfig::default(),
            core_power_factor: default_core_power_factor(),
        }
    }
}

fn require_positive(name: &str, value: f64) -> FusionResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FusionError::ConfigError(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

impl ConversionConfig {
    /// Load from JSON file.
    pub fn from_file(path: &str) -> FusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.source_geometry.trim().is_empty() || self.target_geometry.trim().is_empty() {
            return Err(FusionError::ConfigError(
                "geometry tags must not be empty".into(),
            ));
        }
        if self.target_geometry.contains(self.source_geometry.as_str()) {
            return Err(FusionError::ConfigError(format!(
                "target geometry '{}' still matches source tag '{}'",
                self.target_geometry, self.source_geometry
            )));
        }
        require_positive("core_power_factor", self.core_power_factor)?;
        require_positive("regeneration.relaxed_tolerance", self.regeneration.relaxed_tolerance)?;
        require_positive("regeneration.time_step", self.regeneration.time_step)?;
        if let Some(strict) = self.regeneration.strict_tolerance {
            require_positive("regeneration.strict_tolerance", strict)?;
            if strict > self.regeneration.relaxed_tolerance {
                return Err(FusionError::ConfigError(format!(
                    "strict tolerance {strict} is looser than relaxed tolerance {}",
                    self.regeneration.relaxed_tolerance
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// CARGO_MANIFEST_DIR points to crates/dnull-types/ at compile time,
    /// so we go up 2 levels to reach the workspace root.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
    }

    fn config_path(relative: &str) -> String {
        project_root().join(relative).to_string_lossy().to_string()
    }

    #[test]
    fn test_load_default_config_file() {
        let cfg = ConversionConfig::from_file(&config_path("configs/dnull_default.json")).unwrap();
        assert_eq!(cfg, ConversionConfig::default());
    }

    #[test]
    fn test_load_restore_prior_config_file() {
        let cfg =
            ConversionConfig::from_file(&config_path("configs/dnull_restore_prior.json")).unwrap();
        assert_eq!(cfg.regeneration.strict_tolerance, None);
        assert!((cfg.regeneration.time_step - 1e-5).abs() < 1e-18);
        assert_eq!(cfg.source_geometry, "dnbot");
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let cfg: ConversionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ConversionConfig::default());
        assert!((cfg.regeneration.relaxed_tolerance - 1e10).abs() < 1.0);
        assert_eq!(cfg.regeneration.strict_tolerance, Some(1e-8));
        assert_eq!(cfg.core_power_factor, 2.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ConversionConfig::from_file(&config_path("configs/does_not_exist.json"))
            .unwrap_err();
        assert!(matches!(err, FusionError::Io(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = ConversionConfig::default();
        cfg.regeneration.time_step = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = ConversionConfig::default();
        cfg.core_power_factor = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = ConversionConfig::default();
        cfg.regeneration.strict_tolerance = Some(1e12);
        assert!(cfg.validate().is_err());

        let mut cfg = ConversionConfig::default();
        cfg.target_geometry = "dnbot_copy".into();
        assert!(cfg.validate().is_err());

        let mut cfg = ConversionConfig::default();
        cfg.source_geometry = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = ConversionConfig::default();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: ConversionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, cfg2);
    }
}
