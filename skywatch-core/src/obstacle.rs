use crate::coordinates::WorldPoint;
use serde::{Deserialize, Serialize};

/// Default inactivity window after which transient obstacles are swept.
pub const DEFAULT_OBSTACLE_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Terrain,
    Sensor,
    WeatherCell,
}

impl ObstacleKind {
    /// Maps the feed's type tag; unknown tags are not representable and yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "mountain" => Some(ObstacleKind::Terrain),
            "radar" => Some(ObstacleKind::Sensor),
            "cloud" => Some(ObstacleKind::WeatherCell),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ObstacleKind::Terrain => "terrain",
            ObstacleKind::Sensor => "sensor",
            ObstacleKind::WeatherCell => "weather cell",
        }
    }
}

/// Persistent obstacles never expire on their own; transient ones are swept after a timeout.
pub fn is_persistent(kind: ObstacleKind) -> bool {
    match kind {
        ObstacleKind::Terrain | ObstacleKind::Sensor => true,
        ObstacleKind::WeatherCell => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    PersistentOnly,
    TransientOnly,
}

impl ClearScope {
    pub fn matches(self, kind: ObstacleKind) -> bool {
        match self {
            ClearScope::PersistentOnly => is_persistent(kind),
            ClearScope::TransientOnly => !is_persistent(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleState {
    pub id: String,
    pub kind: ObstacleKind,
    pub center: WorldPoint,
    pub radius: f64,
    pub last_seen_ms: u64,
}

impl ObstacleState {
    pub fn is_persistent(&self) -> bool {
        is_persistent(self.kind)
    }

    pub fn is_expired(&self, now_ms: u64, timeout_ms: u64) -> bool {
        !self.is_persistent() && now_ms.saturating_sub(self.last_seen_ms) > timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(last_seen_ms: u64) -> ObstacleState {
        ObstacleState {
            id: "cloud-1".to_string(),
            kind: ObstacleKind::WeatherCell,
            center: WorldPoint::new(500.0, 500.0),
            radius: 50.0,
            last_seen_ms,
        }
    }

    #[test]
    fn persistence_follows_kind() {
        assert!(is_persistent(ObstacleKind::Terrain));
        assert!(is_persistent(ObstacleKind::Sensor));
        assert!(!is_persistent(ObstacleKind::WeatherCell));
    }

    #[test]
    fn clear_scopes_partition_kinds() {
        for kind in [
            ObstacleKind::Terrain,
            ObstacleKind::Sensor,
            ObstacleKind::WeatherCell,
        ] {
            assert_ne!(
                ClearScope::PersistentOnly.matches(kind),
                ClearScope::TransientOnly.matches(kind)
            );
        }
    }

    #[test]
    fn maps_feed_tags() {
        assert_eq!(ObstacleKind::from_tag("mountain"), Some(ObstacleKind::Terrain));
        assert_eq!(ObstacleKind::from_tag("radar"), Some(ObstacleKind::Sensor));
        assert_eq!(ObstacleKind::from_tag("cloud"), Some(ObstacleKind::WeatherCell));
        assert_eq!(ObstacleKind::from_tag("volcano"), None);
        assert_eq!(ObstacleKind::from_tag("Cloud"), None);
    }

    #[test]
    fn expiry_is_strictly_after_timeout() {
        let obstacle = cloud(0);
        assert!(!obstacle.is_expired(1000, 1000));
        assert!(obstacle.is_expired(1001, 1000));
    }

    #[test]
    fn persistent_obstacles_never_expire() {
        let mut obstacle = cloud(0);
        obstacle.kind = ObstacleKind::Terrain;
        assert!(!obstacle.is_expired(u64::MAX, 0));
    }

    #[test]
    fn clock_going_backwards_does_not_expire() {
        let obstacle = cloud(5000);
        assert!(!obstacle.is_expired(10, 1000));
    }
}
