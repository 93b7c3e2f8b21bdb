use super::{ObstacleMarker, Selection, VehicleMarker, ViewState};
use crate::config::RadarConfig;
use crate::coordinates::{Rect, WorldPoint};
use crate::error::{Result, SkywatchError};
use crate::geometry::RadarProjection;
use crate::store::EntityStore;
use crate::vehicle::VehicleState;
use crate::visibility::within_detection_radius;
use std::collections::HashMap;

/// Pixel radius of the vehicle glyph on the radar; it does not scale with range.
pub const RADAR_VEHICLE_ICON_RADIUS: f64 = 6.0;

/// How the radar currently sees one vehicle.
///
/// `destroyed` and `out_of_range` are independent: an enemy beyond the
/// detection radius is unknown, not dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStatus {
    pub destroyed: bool,
    pub out_of_range: bool,
}

#[derive(Debug, Clone)]
pub struct RadarView {
    config: RadarConfig,
    reference: Option<WorldPoint>,
    viewport: Option<Rect>,
    in_range: HashMap<String, bool>,
}

impl RadarView {
    pub fn new(config: RadarConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reference: None,
            viewport: None,
            in_range: HashMap::new(),
        })
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn state(&self) -> ViewState {
        if self.reference.is_some() {
            ViewState::Configured
        } else {
            ViewState::Unconfigured
        }
    }

    pub fn reference_point(&self) -> Option<WorldPoint> {
        self.reference
    }

    /// Moves the radar center and recomputes every cached range flag.
    pub fn set_reference_point(&mut self, reference: WorldPoint, store: &EntityStore) -> Result<()> {
        if !reference.is_finite() {
            return Err(SkywatchError::invalid_config("radar reference point must be finite"));
        }
        self.reference = Some(reference);
        self.in_range.clear();
        for vehicle in store.vehicles() {
            self.refresh_vehicle(vehicle);
        }
        Ok(())
    }

    /// Records the widget rectangle; the disc is inscribed in it minus the margin.
    ///
    /// An unusable rectangle is still recorded so the view stops rendering
    /// until a valid one arrives.
    pub fn set_viewport(&mut self, viewport: Rect) -> Result<()> {
        self.viewport = Some(viewport);
        let radius = self.max_display_radius(&viewport);
        if !viewport.has_positive_area() || radius <= 0.0 {
            return Err(SkywatchError::invalid_config(format!(
                "radar viewport {}x{} leaves no room for the display",
                viewport.width, viewport.height
            )));
        }
        Ok(())
    }

    /// Caches whether `vehicle` is within detection range of the current reference.
    pub fn refresh_vehicle(&mut self, vehicle: &VehicleState) {
        let Some(reference) = self.reference else {
            return;
        };
        let visible =
            within_detection_radius(vehicle.position, reference, self.config.detection_radius);
        self.in_range.insert(vehicle.id.clone(), visible);
    }

    pub fn forget_vehicles(&mut self) {
        self.in_range.clear();
    }

    pub fn is_in_range(&self, id: &str) -> bool {
        self.in_range.get(id).copied().unwrap_or(false)
    }

    pub fn projection(&self) -> Result<RadarProjection> {
        let reference = self.reference.ok_or(SkywatchError::Unconfigured("radar"))?;
        let viewport = self.viewport.ok_or(SkywatchError::Unconfigured("radar"))?;
        RadarProjection::new(
            reference,
            viewport.center(),
            self.max_display_radius(&viewport),
            self.config.detection_radius,
        )
    }

    pub fn visible_vehicles<'s>(
        &self,
        store: &'s EntityStore,
        selection: Selection<'_>,
    ) -> Result<Vec<VehicleMarker<'s>>> {
        let projection = self.projection()?;
        Ok(store
            .vehicles()
            .filter(|vehicle| self.is_in_range(&vehicle.id))
            .map(|vehicle| VehicleMarker {
                vehicle,
                position: projection.world_to_view(vehicle.position),
                display_radius: RADAR_VEHICLE_ICON_RADIUS,
                category: selection.categorize(vehicle),
            })
            .collect())
    }

    pub fn visible_obstacles<'s>(&self, store: &'s EntityStore) -> Result<Vec<ObstacleMarker<'s>>> {
        let projection = self.projection()?;
        let reference = projection.reference();
        Ok(store
            .obstacles()
            .filter(|obstacle| {
                within_detection_radius(obstacle.center, reference, self.config.detection_radius)
            })
            .map(|obstacle| ObstacleMarker {
                obstacle,
                position: projection.world_to_view(obstacle.center),
                display_radius: projection.scale_length(obstacle.radius),
            })
            .collect())
    }

    pub fn contact(&self, store: &EntityStore, id: &str) -> Result<ContactStatus> {
        let vehicle = store.vehicle(id)?;
        Ok(ContactStatus {
            destroyed: vehicle.is_destroyed(),
            out_of_range: !self.is_in_range(id),
        })
    }

    fn max_display_radius(&self, viewport: &Rect) -> f64 {
        viewport.width.min(viewport.height) / 2.0 - self.config.display_margin
    }
}
