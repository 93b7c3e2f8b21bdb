use super::{ObstacleMarker, Selection, VehicleMarker, ViewState};
use crate::config::MinimapConfig;
use crate::coordinates::{PixelPoint, Rect, WorldPoint};
use crate::error::{Result, SkywatchError};
use crate::geometry::{MinimapProjection, clamp_zoom};
use crate::obstacle::ObstacleState;
use crate::store::EntityStore;
use crate::visibility::within_viewport;

/// Smallest radius used when padding an obstacle by the vehicle glyph.
const MIN_VEHICLE_PADDING_RADIUS: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct MinimapView {
    config: MinimapConfig,
    widget: Option<Rect>,
}

impl MinimapView {
    pub fn new(mut config: MinimapConfig) -> Result<Self> {
        config.validate()?;
        config.zoom = clamp_zoom(config.zoom);
        Ok(Self {
            config,
            widget: None,
        })
    }

    pub fn config(&self) -> &MinimapConfig {
        &self.config
    }

    /// Configured once the widget rectangle is known; the bounds always have a value.
    pub fn state(&self) -> ViewState {
        if self.widget.is_some() {
            ViewState::Configured
        } else {
            ViewState::Unconfigured
        }
    }

    /// Replaces the world rectangle shown by the map.
    ///
    /// Zero or negative sizes are reported and leave the view faulted until
    /// valid bounds are set.
    pub fn set_map_bounds(&mut self, bounds: Rect) -> Result<()> {
        self.config.map_bounds = bounds;
        if !bounds.has_positive_area() {
            return Err(SkywatchError::invalid_config(format!(
                "map bounds must have positive size, got {}x{}",
                bounds.width, bounds.height
            )));
        }
        Ok(())
    }

    /// Records the widget rectangle; the usable viewport is inset by the margin.
    pub fn set_viewport(&mut self, widget: Rect) -> Result<()> {
        self.widget = Some(widget);
        let usable = widget.inset(self.config.margin);
        if !usable.has_positive_area() {
            return Err(SkywatchError::invalid_config(format!(
                "minimap widget {}x{} leaves no usable area",
                widget.width, widget.height
            )));
        }
        Ok(())
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.config.zoom = clamp_zoom(zoom);
    }

    pub fn zoom(&self) -> f64 {
        self.config.zoom
    }

    pub fn set_center_offset(&mut self, offset: PixelPoint) {
        self.config.center_offset = offset;
    }

    pub fn center_offset(&self) -> PixelPoint {
        self.config.center_offset
    }

    pub fn projection(&self) -> Result<MinimapProjection> {
        let widget = self.widget.ok_or(SkywatchError::Unconfigured("minimap"))?;
        MinimapProjection::new(
            self.config.map_bounds,
            widget.inset(self.config.margin),
            self.config.zoom,
            self.config.center_offset,
        )
    }

    pub fn vehicle_display_radius(&self) -> f64 {
        (self.config.vehicle_base_size * self.config.zoom).max(self.config.minimum_vehicle_radius)
    }

    /// Physical radius scaled into pixels, then padded by the vehicle glyph so a
    /// vehicle touching the obstacle is drawn against its rim.
    pub fn obstacle_display_radius(
        &self,
        obstacle: &ObstacleState,
        projection: &MinimapProjection,
    ) -> f64 {
        let (scale_x, _) = projection.scale();
        let scaled = obstacle.radius
            * scale_x
            * projection.zoom()
            * self.config.obstacle_radius_calibration;
        let padding =
            (self.config.vehicle_base_size * projection.zoom() / 2.0).max(MIN_VEHICLE_PADDING_RADIUS);
        (scaled + padding).max(self.config.minimum_obstacle_radius)
    }

    pub fn click_tolerance(&self) -> f64 {
        (self.config.vehicle_base_size * self.config.zoom + self.config.click_padding)
            .max(self.config.minimum_click_tolerance)
    }

    pub fn visible_vehicles<'s>(
        &self,
        store: &'s EntityStore,
        selection: Selection<'_>,
    ) -> Result<Vec<VehicleMarker<'s>>> {
        let projection = self.projection()?;
        let viewport = projection.viewport();
        let display_radius = self.vehicle_display_radius();

        Ok(store
            .vehicles()
            .filter_map(|vehicle| {
                let position = projection.world_to_view(vehicle.position);
                within_viewport(position, &viewport).then(|| VehicleMarker {
                    vehicle,
                    position,
                    display_radius,
                    category: selection.categorize(vehicle),
                })
            })
            .collect())
    }

    pub fn visible_obstacles<'s>(&self, store: &'s EntityStore) -> Result<Vec<ObstacleMarker<'s>>> {
        let projection = self.projection()?;
        let viewport = projection.viewport();

        Ok(store
            .obstacles()
            .filter_map(|obstacle| {
                let position = projection.world_to_view(obstacle.center);
                within_viewport(position, &viewport).then(|| ObstacleMarker {
                    obstacle,
                    position,
                    display_radius: self.obstacle_display_radius(obstacle, &projection),
                })
            })
            .collect())
    }

    /// Nearest on-screen vehicle within the click tolerance of `pixel`.
    pub fn hit_test(&self, store: &EntityStore, pixel: PixelPoint) -> Result<Option<String>> {
        let projection = self.projection()?;
        let viewport = projection.viewport();
        let tolerance = self.click_tolerance();

        let hit = store.nearest_vehicle(|vehicle| {
            let position = projection.world_to_view(vehicle.position);
            if !within_viewport(position, &viewport) {
                return None;
            }
            let distance = position.distance(pixel);
            (distance <= tolerance).then_some(distance)
        });

        Ok(hit.map(|vehicle| vehicle.id.clone()))
    }

    /// World position under a pixel, e.g. a click on empty map.
    pub fn world_at(&self, pixel: PixelPoint) -> Result<WorldPoint> {
        Ok(self.projection()?.view_to_world(pixel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::ObstacleKind;
    use crate::vehicle::{Team, VehicleState};
    use approx::assert_relative_eq;

    fn minimap() -> MinimapView {
        let mut view = MinimapView::new(MinimapConfig::default()).unwrap();
        // 120x120 widget with a 10 px margin: 100x100 usable, centered at (60, 60).
        view.set_viewport(Rect::new(0.0, 0.0, 120.0, 120.0)).unwrap();
        view
    }

    fn vehicle(id: &str, x: f64, y: f64) -> VehicleState {
        VehicleState::new(id, WorldPoint::new(x, y), Team::TeamA, 100, true, 0.0)
    }

    fn selection() -> Selection<'static> {
        Selection::new(None, Team::TeamA)
    }

    #[test]
    fn unconfigured_without_viewport() {
        let store = EntityStore::new();
        let view = MinimapView::new(MinimapConfig::default()).unwrap();
        assert_eq!(view.state(), ViewState::Unconfigured);
        assert_eq!(
            view.hit_test(&store, PixelPoint::new(0.0, 0.0)).unwrap_err(),
            SkywatchError::Unconfigured("minimap")
        );
        assert_eq!(minimap().state(), ViewState::Configured);
    }

    #[test]
    fn map_center_lands_on_viewport_center_for_every_zoom() {
        let mut store = EntityStore::new();
        store.upsert_vehicle(vehicle("B1", 640.0, 400.0)).unwrap();
        let mut view = minimap();

        for zoom in [0.3, 0.75, 1.0, 1.6, 2.0] {
            view.set_zoom(zoom);
            let markers = view.visible_vehicles(&store, selection()).unwrap();
            assert_eq!(markers.len(), 1);
            assert_relative_eq!(markers[0].position.x, 60.0, epsilon = 1e-9);
            assert_relative_eq!(markers[0].position.y, 60.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn zoom_is_clamped_on_assignment() {
        let mut view = minimap();
        view.set_zoom(10.0);
        assert_eq!(view.zoom(), 2.0);
        view.set_zoom(0.01);
        assert_eq!(view.zoom(), 0.3);
    }

    #[test]
    fn zooming_in_pushes_corners_out_of_view() {
        let mut store = EntityStore::new();
        store.upsert_vehicle(vehicle("B1", 10.0, 10.0)).unwrap();
        store.upsert_vehicle(vehicle("B2", 640.0, 400.0)).unwrap();
        let mut view = minimap();

        assert_eq!(view.visible_vehicles(&store, selection()).unwrap().len(), 2);
        view.set_zoom(2.0);
        let markers = view.visible_vehicles(&store, selection()).unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].vehicle.id, "B2");
    }

    #[test]
    fn panning_changes_visibility() {
        let mut store = EntityStore::new();
        store.upsert_vehicle(vehicle("B1", 640.0, 400.0)).unwrap();
        let mut view = minimap();
        view.set_center_offset(PixelPoint::new(80.0, 0.0));
        assert!(view.visible_vehicles(&store, selection()).unwrap().is_empty());
    }

    #[test]
    fn zero_bounds_fault_until_reconfigured() {
        let store = EntityStore::new();
        let mut view = minimap();
        assert!(view.set_map_bounds(Rect::new(0.0, 0.0, 1280.0, 0.0)).is_err());
        assert!(matches!(
            view.visible_obstacles(&store),
            Err(SkywatchError::InvalidConfig(_))
        ));

        view.set_map_bounds(Rect::new(0.0, 0.0, 640.0, 400.0)).unwrap();
        assert!(view.visible_obstacles(&store).is_ok());
    }

    #[test]
    fn zero_area_widget_is_rejected() {
        let mut view = minimap();
        assert!(view.set_viewport(Rect::new(0.0, 0.0, 20.0, 40.0)).is_err());
        assert!(matches!(
            view.projection(),
            Err(SkywatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn obstacle_radius_is_padded_by_vehicle_radius() {
        let mut store = EntityStore::new();
        store
            .upsert_obstacle("m1", ObstacleKind::Terrain, WorldPoint::new(640.0, 400.0), 128.0)
            .unwrap();
        store
            .upsert_obstacle("tiny", ObstacleKind::Sensor, WorldPoint::new(320.0, 200.0), 0.0)
            .unwrap();
        let view = minimap();

        let markers = view.visible_obstacles(&store).unwrap();
        let radius_of = |id: &str| {
            markers
                .iter()
                .find(|marker| marker.obstacle.id == id)
                .map(|marker| marker.display_radius)
                .unwrap()
        };
        // 128 world units * (100 / 1280) * 0.7 = 7.0, plus max(2, 4 * 1 / 2) = 2.
        assert_relative_eq!(radius_of("m1"), 9.0, epsilon = 1e-9);
        // Falls back to the minimum radius.
        assert_relative_eq!(radius_of("tiny"), 4.0);
    }

    #[test]
    fn hit_test_picks_nearest_within_tolerance() {
        let mut store = EntityStore::new();
        // (640, 400) -> (60, 60); (704, 400) -> (65, 60); (1280 - 1, 400) -> ~(110, 60).
        store.upsert_vehicle(vehicle("B1", 640.0, 400.0)).unwrap();
        store.upsert_vehicle(vehicle("B2", 704.0, 400.0)).unwrap();
        store.upsert_vehicle(vehicle("B3", 1279.0, 400.0)).unwrap();
        let view = minimap();

        assert_eq!(view.click_tolerance(), 9.0);
        assert_eq!(
            view.hit_test(&store, PixelPoint::new(64.0, 60.0)).unwrap(),
            Some("B2".to_string())
        );
        assert_eq!(
            view.hit_test(&store, PixelPoint::new(61.0, 61.0)).unwrap(),
            Some("B1".to_string())
        );
        assert_eq!(view.hit_test(&store, PixelPoint::new(90.0, 90.0)).unwrap(), None);
    }

    #[test]
    fn click_tolerance_never_drops_below_minimum() {
        let mut view = minimap();
        view.set_zoom(0.3);
        assert_eq!(view.click_tolerance(), 8.0);
        view.set_zoom(2.0);
        assert_eq!(view.click_tolerance(), 13.0);
    }

    #[test]
    fn world_at_inverts_projection() {
        let mut view = minimap();
        view.set_zoom(1.5);
        let world = view.world_at(PixelPoint::new(60.0, 60.0)).unwrap();
        assert_relative_eq!(world.x, 640.0, epsilon = 1e-9);
        assert_relative_eq!(world.y, 400.0, epsilon = 1e-9);
    }
}
