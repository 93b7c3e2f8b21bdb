use crate::config::EngineConfig;
use crate::coordinates::{PixelPoint, WorldPoint};
use crate::error::Result;
use crate::obstacle::{ClearScope, ObstacleKind};
use crate::store::{ClockFn, EntityStore};
use crate::telemetry::{FINISH_STAGE, Snapshot, SnapshotReport};
use crate::vehicle::VehicleState;
use crate::view::{
    ContactStatus, MinimapView, ObstacleMarker, RadarView, Selection, VehicleMarker,
};
use log::{info, warn};

/// Range reported when no opposing vehicle is alive.
pub const NO_TARGET_DISTANCE: f64 = 1000.0;

/// One console session: the entity store plus the two views that read it.
///
/// Telemetry goes in through the `upsert_*`, `clear_*`, `sweep_*` and
/// [`apply_snapshot`](Self::apply_snapshot) calls; render ticks and input
/// read through the `radar_*`, `minimap_*` and [`hit_test`](Self::hit_test)
/// queries.
#[derive(Debug)]
pub struct TacticalEngine {
    config: EngineConfig,
    store: EntityStore,
    radar: RadarView,
    minimap: MinimapView,
    selected: Option<String>,
    stage: Option<String>,
}

impl TacticalEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_store(config, EntityStore::new())
    }

    pub fn new_with_clock(config: EngineConfig, clock: ClockFn) -> Result<Self> {
        Self::with_store(config, EntityStore::new_with_clock(clock))
    }

    fn with_store(config: EngineConfig, store: EntityStore) -> Result<Self> {
        config.validate()?;
        let radar = RadarView::new(config.radar.clone())?;
        let minimap = MinimapView::new(config.minimap.clone())?;
        let selected = config.default_selection.clone();
        Ok(Self {
            config,
            store,
            radar,
            minimap,
            selected,
            stage: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn radar(&self) -> &RadarView {
        &self.radar
    }

    /// Layout access; the reference point is driven by selection and
    /// [`set_reference_point`](Self::set_reference_point).
    pub fn radar_mut(&mut self) -> &mut RadarView {
        &mut self.radar
    }

    pub fn minimap(&self) -> &MinimapView {
        &self.minimap
    }

    pub fn minimap_mut(&mut self) -> &mut MinimapView {
        &mut self.minimap
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selection(&self) -> Selection<'_> {
        Selection::new(self.selected.as_deref(), self.config.own_team)
    }

    /// Marks `id` as the operator's vehicle. The radar recenters on it as soon
    /// as its position is known.
    pub fn set_selected(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        if let Ok(vehicle) = self.store.vehicle(id) {
            let position = vehicle.position;
            if let Err(err) = self.radar.set_reference_point(position, &self.store) {
                warn!("cannot recenter radar on {id}: {err}");
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_reference_point(&mut self, reference: WorldPoint) -> Result<()> {
        self.radar.set_reference_point(reference, &self.store)
    }

    pub fn upsert_vehicle(&mut self, vehicle: VehicleState) -> Result<()> {
        let id = vehicle.id.clone();
        self.store.upsert_vehicle(vehicle)?;
        let stored = self.store.vehicle(&id)?;

        if self.selected.as_deref() == Some(id.as_str()) {
            self.radar.set_reference_point(stored.position, &self.store)
        } else {
            self.radar.refresh_vehicle(stored);
            Ok(())
        }
    }

    pub fn upsert_obstacle(
        &mut self,
        id: &str,
        kind: ObstacleKind,
        center: WorldPoint,
        radius: f64,
    ) -> Result<()> {
        self.store.upsert_obstacle(id, kind, center, radius)
    }

    pub fn clear_vehicles(&mut self) -> usize {
        self.radar.forget_vehicles();
        self.store.clear_vehicles()
    }

    pub fn clear_obstacles(&mut self) -> usize {
        self.store.clear_obstacles()
    }

    pub fn clear_obstacles_in(&mut self, scope: ClearScope) -> usize {
        self.store.clear_obstacles_in(scope)
    }

    pub fn clear_all(&mut self) -> usize {
        self.radar.forget_vehicles();
        self.store.clear_all()
    }

    pub fn sweep_expired_obstacles(&mut self, timeout_ms: u64) -> usize {
        self.store.sweep_expired_obstacles(timeout_ms)
    }

    /// Sweep using the configured inactivity timeout.
    pub fn sweep(&mut self) -> usize {
        self.sweep_expired_obstacles(self.config.obstacle_timeout_ms)
    }

    pub fn radar_vehicles(&self) -> Result<Vec<VehicleMarker<'_>>> {
        self.radar.visible_vehicles(&self.store, self.selection())
    }

    pub fn radar_obstacles(&self) -> Result<Vec<ObstacleMarker<'_>>> {
        self.radar.visible_obstacles(&self.store)
    }

    pub fn minimap_vehicles(&self) -> Result<Vec<VehicleMarker<'_>>> {
        self.minimap.visible_vehicles(&self.store, self.selection())
    }

    pub fn minimap_obstacles(&self) -> Result<Vec<ObstacleMarker<'_>>> {
        self.minimap.visible_obstacles(&self.store)
    }

    /// Resolves a minimap click to a vehicle id.
    pub fn hit_test(&self, pixel: PixelPoint) -> Result<Option<String>> {
        self.minimap.hit_test(&self.store, pixel)
    }

    pub fn contact(&self, id: &str) -> Result<ContactStatus> {
        self.radar.contact(&self.store, id)
    }

    /// Distance from `id` to the closest non-destroyed opponent, or
    /// [`NO_TARGET_DISTANCE`] when there is none closer.
    pub fn distance_to_nearest_enemy(&self, id: &str) -> Result<f64> {
        let vehicle = self.store.vehicle(id)?;
        let opponent = vehicle.team.opponent();
        let nearest = self
            .store
            .vehicles()
            .filter(|other| other.team == opponent && !other.is_destroyed())
            .map(|other| other.position.distance(vehicle.position))
            .fold(NO_TARGET_DISTANCE, f64::min);
        Ok(nearest)
    }

    /// Applies a full feed snapshot.
    ///
    /// Entering the finish stage wipes every entity and restores the default
    /// selection before the snapshot's own records are applied.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> SnapshotReport {
        let mut report = SnapshotReport::default();

        if let Some(stage) = &snapshot.stage {
            let was_finished = self.stage.as_deref() == Some(FINISH_STAGE);
            if snapshot.is_finished() && !was_finished {
                let removed = self.clear_all();
                self.selected = self.config.default_selection.clone();
                info!("game finished, reset console ({removed} entities removed)");
                report.reset = true;
            }
            self.stage = Some(stage.clone());
        }

        for record in &snapshot.drones {
            let previous = self.store.vehicle(&record.uid).ok().map(|v| v.heading);
            let Some(vehicle) = record.to_state(previous) else {
                warn!("dropping vehicle {} with unknown team '{}'", record.uid, record.team);
                report.vehicles_dropped += 1;
                continue;
            };
            match self.upsert_vehicle(vehicle) {
                Ok(()) => report.vehicles_applied += 1,
                Err(err) => {
                    warn!("dropping vehicle {}: {err}", record.uid);
                    report.vehicles_dropped += 1;
                }
            }
        }

        for record in &snapshot.obstacles {
            let Some(kind) = record.kind() else {
                warn!("dropping obstacle {} with unknown type '{}'", record.id, record.tag);
                report.obstacles_dropped += 1;
                continue;
            };
            match self.upsert_obstacle(&record.id, kind, record.center(), record.r) {
                Ok(()) => report.obstacles_applied += 1,
                Err(err) => {
                    warn!("dropping obstacle {}: {err}", record.id);
                    report.obstacles_dropped += 1;
                }
            }
        }

        report
    }
}
