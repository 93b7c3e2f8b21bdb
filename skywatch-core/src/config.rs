//! Tunables for the two views and the obstacle lifecycle.
//!
//! Every value has a default matching the stock console, and the whole tree
//! can be loaded from JSON with any subset of fields present.

use crate::coordinates::{PixelPoint, Rect};
use crate::error::{Result, SkywatchError};
use crate::geometry::clamp_zoom;
use crate::obstacle::DEFAULT_OBSTACLE_TIMEOUT_MS;
use crate::vehicle::Team;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub detection_radius: f64, // world units
    pub display_margin: f64,   // pixels kept clear around the radar disc
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            detection_radius: 300.0,
            display_margin: 8.0,
        }
    }
}

impl RadarConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.detection_radius.is_finite() && self.detection_radius > 0.0) {
            return Err(SkywatchError::invalid_config(format!(
                "detection radius must be positive, got {}",
                self.detection_radius
            )));
        }
        if !(self.display_margin.is_finite() && self.display_margin >= 0.0) {
            return Err(SkywatchError::invalid_config("radar margin must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub map_bounds: Rect,
    pub zoom: f64,
    pub center_offset: PixelPoint,
    pub margin: f64,
    pub vehicle_base_size: f64,
    pub minimum_vehicle_radius: f64,
    pub minimum_obstacle_radius: f64,
    /// Cosmetic shrink applied to the physical obstacle radius before the
    /// vehicle radius is added, so icons sit on the obstacle's rim.
    pub obstacle_radius_calibration: f64,
    pub minimum_click_tolerance: f64,
    pub click_padding: f64,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            map_bounds: Rect::new(0.0, 0.0, 1280.0, 800.0),
            zoom: 1.0,
            center_offset: PixelPoint::new(0.0, 0.0),
            margin: 10.0,
            vehicle_base_size: 4.0,
            minimum_vehicle_radius: 4.0,
            minimum_obstacle_radius: 4.0,
            obstacle_radius_calibration: 0.7,
            minimum_click_tolerance: 8.0,
            click_padding: 5.0,
        }
    }
}

impl MinimapConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.map_bounds.has_positive_area() {
            return Err(SkywatchError::invalid_config(format!(
                "map bounds must have positive size, got {}x{}",
                self.map_bounds.width, self.map_bounds.height
            )));
        }
        let lengths = [
            ("margin", self.margin),
            ("vehicle base size", self.vehicle_base_size),
            ("minimum vehicle radius", self.minimum_vehicle_radius),
            ("minimum obstacle radius", self.minimum_obstacle_radius),
            ("obstacle radius calibration", self.obstacle_radius_calibration),
            ("minimum click tolerance", self.minimum_click_tolerance),
            ("click padding", self.click_padding),
        ];
        for (name, value) in lengths {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SkywatchError::invalid_config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub radar: RadarConfig,
    pub minimap: MinimapConfig,
    pub obstacle_timeout_ms: u64,
    /// Team rendered with the friendly color.
    pub own_team: Team,
    /// Vehicle selected at start-up and after a game reset.
    pub default_selection: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radar: RadarConfig::default(),
            minimap: MinimapConfig::default(),
            obstacle_timeout_ms: DEFAULT_OBSTACLE_TIMEOUT_MS,
            own_team: Team::TeamA,
            default_selection: Some("B1".to_string()),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: EngineConfig = serde_json::from_str(json)?;
        config.minimap.zoom = clamp_zoom(config.minimap.zoom);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.radar.validate()?;
        self.minimap.validate()
    }
}
