use crate::coordinates::WorldPoint;
use crate::error::{Result, SkywatchError};
use crate::obstacle::{ClearScope, ObstacleKind, ObstacleState};
use crate::vehicle::VehicleState;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::Instant;

/// Millisecond clock consulted whenever an obstacle is refreshed or swept.
pub type ClockFn = Box<dyn Fn() -> u64 + Send + Sync + 'static>;

/// Latest known state of every tracked vehicle and obstacle.
///
/// Entries iterate in ascending id order, so two stores fed the same upserts
/// produce the same draw order.
pub struct EntityStore {
    vehicles: BTreeMap<String, VehicleState>,
    obstacles: BTreeMap<String, ObstacleState>,
    clock: ClockFn,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::new_with_clock(Self::default_clock())
    }

    pub fn new_with_clock(clock: ClockFn) -> Self {
        Self {
            vehicles: BTreeMap::new(),
            obstacles: BTreeMap::new(),
            clock,
        }
    }

    pub fn now_ms(&self) -> u64 {
        (self.clock)()
    }

    pub fn upsert_vehicle(&mut self, vehicle: VehicleState) -> Result<()> {
        if !vehicle.is_finite() {
            warn!("rejecting vehicle {} with non-finite state", vehicle.id);
            return Err(SkywatchError::invalid_config(format!(
                "vehicle '{}' has a non-finite position or heading",
                vehicle.id
            )));
        }
        self.vehicles.insert(vehicle.id.clone(), vehicle);
        Ok(())
    }

    pub fn upsert_obstacle(
        &mut self,
        id: &str,
        kind: ObstacleKind,
        center: WorldPoint,
        radius: f64,
    ) -> Result<()> {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            warn!("rejecting obstacle {id}: center {center:?} radius {radius}");
            return Err(SkywatchError::invalid_config(format!(
                "obstacle '{id}' needs a finite center and a non-negative radius"
            )));
        }

        let now = self.now_ms();
        if let Some(existing) = self.obstacles.get_mut(id) {
            if existing.kind != kind {
                warn!(
                    "obstacle {id} re-added as {} but was created as {}; keeping {}",
                    kind.label(),
                    existing.kind.label(),
                    existing.kind.label()
                );
            }
            existing.center = center;
            existing.radius = radius;
            existing.last_seen_ms = now;
            return Ok(());
        }

        debug!(
            "added obstacle {id} ({}) at ({}, {}) radius {radius}",
            kind.label(),
            center.x,
            center.y
        );
        self.obstacles.insert(
            id.to_string(),
            ObstacleState {
                id: id.to_string(),
                kind,
                center,
                radius,
                last_seen_ms: now,
            },
        );
        Ok(())
    }

    pub fn vehicle(&self, id: &str) -> Result<&VehicleState> {
        self.vehicles
            .get(id)
            .ok_or_else(|| SkywatchError::vehicle_not_found(id))
    }

    pub fn obstacle(&self, id: &str) -> Result<&ObstacleState> {
        self.obstacles
            .get(id)
            .ok_or_else(|| SkywatchError::obstacle_not_found(id))
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleState> {
        self.vehicles.values()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &ObstacleState> {
        self.obstacles.values()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Returns the vehicle with the smallest distance reported by `distance`.
    /// Vehicles for which `distance` returns `None` are not candidates; ties keep
    /// the first vehicle in iteration order.
    pub fn nearest_vehicle<F>(&self, mut distance: F) -> Option<&VehicleState>
    where
        F: FnMut(&VehicleState) -> Option<f64>,
    {
        let mut closest: Option<(&VehicleState, f64)> = None;

        for vehicle in self.vehicles.values() {
            let Some(d) = distance(vehicle) else {
                continue;
            };
            let replace = closest
                .as_ref()
                .map_or(true, |(_, best_distance)| d < *best_distance);
            if replace {
                closest = Some((vehicle, d));
            }
        }

        closest.map(|(vehicle, _)| vehicle)
    }

    pub fn clear_vehicles(&mut self) -> usize {
        let removed = self.vehicles.len();
        self.vehicles.clear();
        info!("cleared {removed} vehicles");
        removed
    }

    pub fn clear_obstacles(&mut self) -> usize {
        let removed = self.obstacles.len();
        self.obstacles.clear();
        info!("cleared {removed} obstacles");
        removed
    }

    pub fn clear_obstacles_in(&mut self, scope: ClearScope) -> usize {
        let before = self.obstacles.len();
        self.obstacles
            .retain(|_, obstacle| !scope.matches(obstacle.kind));
        let removed = before - self.obstacles.len();
        info!("cleared {removed} obstacles ({scope:?})");
        removed
    }

    pub fn clear_all(&mut self) -> usize {
        self.clear_vehicles() + self.clear_obstacles()
    }

    /// Drops transient obstacles not refreshed within `timeout_ms`.
    pub fn sweep_expired_obstacles(&mut self, timeout_ms: u64) -> usize {
        let now = self.now_ms();
        let before = self.obstacles.len();
        self.obstacles
            .retain(|_, obstacle| !obstacle.is_expired(now, timeout_ms));
        let removed = before - self.obstacles.len();
        if removed > 0 {
            debug!("swept {removed} expired obstacles at {now} ms");
        }
        removed
    }

    fn default_clock() -> ClockFn {
        let start = Instant::now();
        Box::new(move || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX))
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("vehicles", &self.vehicles)
            .field("obstacles", &self.obstacles)
            .finish_non_exhaustive()
    }
}
