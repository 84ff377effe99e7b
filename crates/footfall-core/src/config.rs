#[cfg(feature = "bevy")]
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::LayerMask;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_ray_offset() -> f32 {
    0.5
}
const fn default_sphere_radius() -> f32 {
    0.07
}
const fn default_ray_distance() -> f32 {
    1.0
}
const fn default_ankle_offset() -> f32 {
    0.1
}
const fn default_smooth_rate() -> f32 {
    0.5
}
const fn default_true() -> bool {
    true
}
const fn default_body_height_sensitivity() -> f32 {
    1.0
}
const fn default_foot_length() -> f32 {
    0.2
}
const fn default_min_ground_normal_y() -> f32 {
    0.05
}

/// Upper bound of [`FootPlacementConfig::body_height_sensitivity`].
pub const MAX_BODY_HEIGHT_SENSITIVITY: f32 = 1.5;

// ---------------------------------------------------------------------------
// AnkleCompensation
// ---------------------------------------------------------------------------

/// How the ankle height above the ground contact is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnkleCompensation {
    /// `Dynamic` when orientation control is off, `Fixed` otherwise.
    #[default]
    Auto,
    /// Always use `ankle_offset`.
    Fixed,
    /// Blend `ankle_offset` and `foot_length` by the foot's pitch relative
    /// to the ground plane.
    Dynamic,
}

// ---------------------------------------------------------------------------
// FootPlacementConfig
// ---------------------------------------------------------------------------

/// Per-character foot placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct FootPlacementConfig {
    /// Height above the foot where the ground probe starts (default: 0.5).
    #[serde(default = "default_ray_offset")]
    pub ray_offset: f32,

    /// Radius of the probe sphere (default: 0.07).
    #[serde(default = "default_sphere_radius")]
    pub sphere_radius: f32,

    /// Maximum travel of the probe (default: 1.0).
    #[serde(default = "default_ray_distance")]
    pub ray_distance: f32,

    /// Layers the probe may hit (default: all).
    #[serde(default)]
    pub ground_layers: LayerMask,

    /// Distance between the ankle joint and the sole (default: 0.1).
    #[serde(default = "default_ankle_offset")]
    pub ankle_offset: f32,

    /// Fraction of the remaining distance the smoothed target covers each
    /// tick, in `[0, 1]` (default: 0.5).
    #[serde(default = "default_smooth_rate")]
    pub smooth_rate: f32,

    /// Leave the foot alone while the animation lifts it above the ground
    /// target (default: true).
    #[serde(default = "default_true")]
    pub foot_lifting: bool,

    /// Gain applied to the height difference between both feet, in
    /// `[0, 1.5]` (default: 1).
    #[serde(default = "default_body_height_sensitivity")]
    pub body_height_sensitivity: f32,

    /// Align the foot with the ground. When off the foot keeps its animated
    /// world rotation (default: true).
    #[serde(default = "default_true")]
    pub control_rotation: bool,

    /// Heel-to-toe length used by dynamic ankle compensation (default: 0.2).
    #[serde(default = "default_foot_length")]
    pub foot_length: f32,

    #[serde(default)]
    pub ankle_compensation: AnkleCompensation,

    /// Ground hits whose normal has a smaller Y component count as no
    /// ground (default: 0.05).
    #[serde(default = "default_min_ground_normal_y")]
    pub min_ground_normal_y: f32,
}

impl Default for FootPlacementConfig {
    fn default() -> Self {
        Self {
            ray_offset: default_ray_offset(),
            sphere_radius: default_sphere_radius(),
            ray_distance: default_ray_distance(),
            ground_layers: LayerMask::ALL,
            ankle_offset: default_ankle_offset(),
            smooth_rate: default_smooth_rate(),
            foot_lifting: true,
            body_height_sensitivity: default_body_height_sensitivity(),
            control_rotation: true,
            foot_length: default_foot_length(),
            ankle_compensation: AnkleCompensation::Auto,
            min_ground_normal_y: default_min_ground_normal_y(),
        }
    }
}

impl FootPlacementConfig {
    /// Validate configuration. Returns Err on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("ray_offset", self.ray_offset)?;
        non_negative("sphere_radius", self.sphere_radius)?;
        non_negative("ankle_offset", self.ankle_offset)?;
        non_negative("foot_length", self.foot_length)?;
        if !(self.ray_distance.is_finite() && self.ray_distance > 0.0) {
            return Err(ConfigError::invalid(
                "ray_distance",
                format!("must be > 0, got {}", self.ray_distance),
            ));
        }
        in_range("smooth_rate", self.smooth_rate, 0.0, 1.0)?;
        in_range(
            "body_height_sensitivity",
            self.body_height_sensitivity,
            0.0,
            MAX_BODY_HEIGHT_SENSITIVITY,
        )?;
        if !(self.min_ground_normal_y > 0.0 && self.min_ground_normal_y <= 1.0) {
            return Err(ConfigError::invalid(
                "min_ground_normal_y",
                format!("must be in (0, 1], got {}", self.min_ground_normal_y),
            ));
        }
        Ok(())
    }

    /// Whether the ankle height follows the foot's pitch this frame.
    pub const fn uses_dynamic_ankle(&self) -> bool {
        match self.ankle_compensation {
            AnkleCompensation::Auto => !self.control_rotation,
            AnkleCompensation::Fixed => false,
            AnkleCompensation::Dynamic => true,
        }
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be non-negative, got {value}"),
        ))
    }
}

fn in_range(field: &str, value: f32, low: f32, high: f32) -> Result<(), ConfigError> {
    if (low..=high).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be in [{low}, {high}], got {value}"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
