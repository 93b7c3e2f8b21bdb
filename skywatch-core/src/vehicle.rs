use crate::coordinates::WorldPoint;
use serde::{Deserialize, Serialize};

pub const MAX_HEALTH: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    TeamA,
    TeamB,
}

impl Team {
    /// Maps the feed's team tag ("B" for blue, "R" for red).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "B" => Some(Team::TeamA),
            "R" => Some(Team::TeamB),
            _ => None,
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::TeamA => Team::TeamB,
            Team::TeamB => Team::TeamA,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub id: String,
    pub position: WorldPoint, // world units, same plane as obstacles
    pub team: Team,
    pub health: u8,
    pub online: bool,
    pub heading: f64, // degrees, 0 = north, clockwise
    pub speed: f64,   // derived from velocity by the telemetry adapter
}

impl VehicleState {
    pub fn new(
        id: impl Into<String>,
        position: WorldPoint,
        team: Team,
        health: u8,
        online: bool,
        heading: f64,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            team,
            health: health.min(MAX_HEALTH),
            online,
            heading,
            speed: 0.0,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.heading.is_finite() && self.speed.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_capped() {
        let vehicle = VehicleState::new("B1", WorldPoint::default(), Team::TeamA, 250, true, 0.0);
        assert_eq!(vehicle.health, MAX_HEALTH);
    }

    #[test]
    fn zero_health_means_destroyed_even_when_online() {
        let vehicle = VehicleState::new("R1", WorldPoint::default(), Team::TeamB, 0, true, 0.0);
        assert!(vehicle.is_destroyed());
    }

    #[test]
    fn team_tags() {
        assert_eq!(Team::from_tag("B"), Some(Team::TeamA));
        assert_eq!(Team::from_tag("R"), Some(Team::TeamB));
        assert_eq!(Team::from_tag("G"), None);
        assert_eq!(Team::TeamA.opponent(), Team::TeamB);
    }
}
