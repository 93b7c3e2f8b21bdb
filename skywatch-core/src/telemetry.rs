//! Adapter between the per-tick game snapshot and engine upserts.
//!
//! The feed sends full records every tick. Heading and speed are derived here
//! from the reported velocity; a vehicle slower than [`STATIONARY_SPEED`] keeps
//! its previous heading so the arrow does not jitter while hovering.

use crate::coordinates::WorldPoint;
use crate::error::Result;
use crate::obstacle::ObstacleKind;
use crate::vehicle::{MAX_HEALTH, Team, VehicleState};
use serde::{Deserialize, Serialize};

pub const STATIONARY_SPEED: f64 = 0.1;
pub const ALIVE_STATUS: &str = "alive";
pub const FINISH_STAGE: &str = "finish";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleReport {
    pub uid: String,
    pub hp: i32,
    pub status: String,
    pub team: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl VehicleReport {
    pub fn online(&self) -> bool {
        self.status == ALIVE_STATUS
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Builds the engine record, or `None` when the team tag is unknown.
    pub fn to_state(&self, previous_heading: Option<f64>) -> Option<VehicleState> {
        let team = Team::from_tag(&self.team)?;
        let health = u8::try_from(self.hp.clamp(0, i32::from(MAX_HEALTH))).unwrap_or(0);
        let heading = derive_heading(self.vx, self.vy, previous_heading);
        Some(
            VehicleState::new(
                self.uid.clone(),
                WorldPoint::new(self.x, self.y),
                team,
                health,
                self.online(),
                heading,
            )
            .with_speed(self.speed()),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleReport {
    pub id: String,
    #[serde(rename = "type")]
    pub tag: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl ObstacleReport {
    pub fn kind(&self) -> Option<ObstacleKind> {
        ObstacleKind::from_tag(&self.tag)
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub stage: Option<String>,
    pub drones: Vec<VehicleReport>,
    pub obstacles: Vec<ObstacleReport>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_finished(&self) -> bool {
        self.stage.as_deref() == Some(FINISH_STAGE)
    }
}

/// Outcome of applying one snapshot, for logging by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub vehicles_applied: usize,
    pub vehicles_dropped: usize,
    pub obstacles_applied: usize,
    pub obstacles_dropped: usize,
    pub reset: bool,
}

/// Compass heading of a screen-space velocity (y down), in [0, 360).
///
/// Holds `previous` (or north for a new vehicle) while the speed is at or
/// below [`STATIONARY_SPEED`].
pub fn derive_heading(vx: f64, vy: f64, previous: Option<f64>) -> f64 {
    if vx.hypot(vy) <= STATIONARY_SPEED {
        return previous.unwrap_or(0.0);
    }
    normalize_degrees(vx.atan2(-vy).to_degrees())
}

pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn heading_follows_compass_convention() {
        assert_relative_eq!(derive_heading(0.0, -10.0, None), 0.0);
        assert_relative_eq!(derive_heading(10.0, 0.0, None), 90.0);
        assert_relative_eq!(derive_heading(0.0, 10.0, None), 180.0);
        assert_relative_eq!(derive_heading(-10.0, 0.0, None), 270.0);
        assert_relative_eq!(derive_heading(5.0, -5.0, None), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn stationary_vehicle_holds_heading() {
        assert_eq!(derive_heading(0.0, 0.0, None), 0.0);
        assert_eq!(derive_heading(0.0, 0.0, Some(90.0)), 90.0);
        assert_eq!(derive_heading(0.07, 0.07, Some(135.0)), 135.0);
        assert_relative_eq!(derive_heading(0.2, 0.0, Some(135.0)), 90.0);
    }

    #[test]
    fn normalizes_into_half_open_range() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }

    #[test]
    fn parses_full_snapshot() {
        let json = r#"{
            "stage": "running",
            "drones": [
                { "uid": "B1", "hp": 100, "status": "alive", "team": "B",
                  "x": 100, "y": 100, "vx": 10, "vy": 0 },
                { "uid": "R1", "hp": 0, "status": "dead", "team": "R",
                  "x": 300.5, "y": 20, "vx": 0, "vy": 0 }
            ],
            "obstacles": [
                { "id": "m1", "type": "mountain", "x": 10, "y": 20, "r": 30 },
                { "id": "v1", "type": "volcano", "x": 0, "y": 0, "r": 1 }
            ]
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.stage.as_deref(), Some("running"));
        assert_eq!(snapshot.drones.len(), 2);
        assert_eq!(snapshot.obstacles[0].kind(), Some(ObstacleKind::Terrain));
        assert_eq!(snapshot.obstacles[1].kind(), None);

        let blue = snapshot.drones[0].to_state(None).unwrap();
        assert!(blue.online);
        assert_eq!(blue.team, Team::TeamA);
        assert_relative_eq!(blue.heading, 90.0);
        assert_relative_eq!(blue.speed, 10.0);

        let red = snapshot.drones[1].to_state(Some(45.0)).unwrap();
        assert!(!red.online);
        assert!(red.is_destroyed());
        assert_eq!(red.heading, 45.0);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let snapshot = Snapshot::from_json("{}").unwrap();
        assert!(snapshot.drones.is_empty());
        assert!(snapshot.obstacles.is_empty());
        assert!(!snapshot.is_finished());
    }

    #[test]
    fn unknown_team_is_dropped_and_health_clamped() {
        let mut report = VehicleReport {
            uid: "G1".to_string(),
            team: "G".to_string(),
            hp: 150,
            ..VehicleReport::default()
        };
        assert!(report.to_state(None).is_none());

        report.team = "B".to_string();
        assert_eq!(report.to_state(None).unwrap().health, 100);
        report.hp = -5;
        assert_eq!(report.to_state(None).unwrap().health, 0);
    }
}
