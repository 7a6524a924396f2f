//! Engine configuration.

use crate::connectivity::OVERLAP_THRESHOLD;
use crate::error::{EngineError, EngineResult};
use kurbo::Rect;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable tint color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Tint {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn red() -> Self {
        Self::new(255, 0, 0, 255)
    }
}

impl From<Color> for Tint {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Tint> for Color {
    fn from(tint: Tint) -> Self {
        Color::from_rgba8(tint.r, tint.g, tint.b, tint.a)
    }
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Joints closer than this (scene units) are connected.
    pub overlap_threshold: f64,
    /// Trash region in scene coordinates.
    pub deletion_zone: Rect,
    /// Alpha applied to the component while it is dragged.
    pub drag_alpha: f64,
    /// Tint applied to components that would be deleted on release.
    pub deletion_tint: Tint,
    /// Grab radius for joints when hit testing.
    pub joint_hit_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: OVERLAP_THRESHOLD,
            deletion_zone: Rect::new(0.0, 0.0, 120.0, 120.0),
            drag_alpha: 0.5,
            deletion_tint: Tint::red(),
            joint_hit_tolerance: 12.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges. Non-finite values are rejected everywhere.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.overlap_threshold.is_finite() || self.overlap_threshold <= 0.0 {
            return Err(EngineError::Config(format!(
                "overlap_threshold must be positive, got {}",
                self.overlap_threshold
            )));
        }
        Self::validate_zone(self.deletion_zone)?;
        if !(0.0..=1.0).contains(&self.drag_alpha) {
            return Err(EngineError::Config(format!(
                "drag_alpha must be within 0..=1, got {}",
                self.drag_alpha
            )));
        }
        if !self.joint_hit_tolerance.is_finite() || self.joint_hit_tolerance < 0.0 {
            return Err(EngineError::Config(format!(
                "joint_hit_tolerance must not be negative, got {}",
                self.joint_hit_tolerance
            )));
        }
        Ok(())
    }

    /// Check a trash region, whether configured or reported by the scene.
    pub fn validate_zone(zone: Rect) -> EngineResult<()> {
        if !zone.is_finite() {
            return Err(EngineError::Config(format!(
                "deletion_zone must be finite: {:?}",
                zone
            )));
        }
        if zone.x0 > zone.x1 || zone.y0 > zone.y1 {
            return Err(EngineError::Config(format!(
                "deletion_zone is inverted: {:?}",
                zone
            )));
        }
        Ok(())
    }
}
