use crate::curve::ResponseCurve;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Grid sizing: how the terrain maps onto a square `dimension × dimension` grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Added to world coordinates before mapping, so terrains need not start at the origin.
    pub terrain_origin_offset: f32,
    /// World-space edge length of the mapped terrain.
    pub terrain_resolution: f32,
    pub dimension: u32,
    pub default_stamp_radius: u32,
}

impl GridConfig {
    pub const MAX_DIMENSION: u32 = 4096;
    pub const MAX_STAMP_RADIUS: u32 = 64;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension == 0 || self.dimension > Self::MAX_DIMENSION {
            return Err(ConfigError::InvalidDimension {
                max: Self::MAX_DIMENSION,
                actual: self.dimension,
            });
        }
        if !self.terrain_resolution.is_finite() || self.terrain_resolution <= 0.0 {
            return Err(ConfigError::InvalidResolution(self.terrain_resolution));
        }
        if !self.terrain_origin_offset.is_finite() {
            return Err(ConfigError::InvalidOffset(self.terrain_origin_offset));
        }
        if self.default_stamp_radius > Self::MAX_STAMP_RADIUS {
            return Err(ConfigError::RadiusTooLarge {
                max: Self::MAX_STAMP_RADIUS,
                actual: self.default_stamp_radius,
            });
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            terrain_origin_offset: 0.0,
            terrain_resolution: 100.0,
            dimension: 100,
            default_stamp_radius: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Smoothstep easing between neighbouring control points.
    Smooth,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// `(input, output)` pairs, both in [0, 1].
    pub control_points: Vec<(f32, f32)>,
    pub interpolation: Interpolation,
}

impl CurveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ResponseCurve::from_config(self)?;
        Ok(())
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            control_points: vec![(0.0, 0.0), (1.0, 1.0)],
            interpolation: Interpolation::Linear,
        }
    }
}

/// Everything a host needs to stand up a tactical layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    pub grid: GridConfig,
    pub curve: CurveConfig,
    /// Ticks between full reconciliation passes; 0 disables them.
    pub reconcile_interval: u32,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            curve: CurveConfig::default(),
            reconcile_interval: 600,
        }
    }
}

impl InfluenceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.curve.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CurveError;

    #[test]
    fn defaults_are_valid() {
        assert!(InfluenceConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let cfg = GridConfig {
            dimension: 0,
            ..GridConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDimension { actual: 0, .. })
        ));
    }

    #[test]
    fn non_positive_resolution_is_rejected() {
        for resolution in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let cfg = GridConfig {
                terrain_resolution: resolution,
                ..GridConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidResolution(_))
            ));
        }
    }

    #[test]
    fn oversized_radius_is_rejected() {
        let cfg = GridConfig {
            default_stamp_radius: GridConfig::MAX_STAMP_RADIUS + 1,
            ..GridConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::RadiusTooLarge { .. })
        ));
    }

    #[test]
    fn json_partial_document_fills_defaults() {
        let cfg = InfluenceConfig::from_json_str(
            r#"{
                "grid": { "dimension": 64, "terrain_resolution": 512.0 },
                "curve": { "control_points": [[0.0, 0.0], [0.5, 0.2], [1.0, 1.0]],
                           "interpolation": "smooth" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.grid.dimension, 64);
        assert_eq!(cfg.grid.default_stamp_radius, 3);
        assert_eq!(cfg.curve.control_points.len(), 3);
        assert_eq!(cfg.curve.interpolation, Interpolation::Smooth);
        assert_eq!(cfg.reconcile_interval, 600);
    }

    #[test]
    fn json_with_empty_curve_fails_at_load() {
        let err = InfluenceConfig::from_json_str(r#"{ "curve": { "control_points": [] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Curve(CurveError::Empty)));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = InfluenceConfig::from_json_str("{ grid: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = InfluenceConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(InfluenceConfig::from_json_str(&json).unwrap(), cfg);
    }
}
