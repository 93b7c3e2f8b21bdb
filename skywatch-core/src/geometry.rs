//! World ↔ view transforms for the two display kinds.
//!
//! The radar uses a pure radial magnification around a reference point and is
//! display-only. The minimap projects the map bounds onto a viewport per axis,
//! then zooms about the viewport center and finally applies a pixel pan. Its
//! inverse undoes those steps in exactly the reverse order.

use crate::coordinates::{PixelPoint, Rect, WorldPoint};
use crate::error::{Result, SkywatchError};

pub const MIN_ZOOM: f64 = 0.3;
pub const MAX_ZOOM: f64 = 2.0;

/// Zoom is clamped where it is assigned, so projections can trust the stored value.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarProjection {
    reference: WorldPoint,
    view_center: PixelPoint,
    scale: f64,
}

impl RadarProjection {
    pub fn new(
        reference: WorldPoint,
        view_center: PixelPoint,
        max_display_radius: f64,
        detection_radius: f64,
    ) -> Result<Self> {
        if !(detection_radius.is_finite() && detection_radius > 0.0) {
            return Err(SkywatchError::invalid_config(format!(
                "detection radius must be positive, got {detection_radius}"
            )));
        }
        if !(max_display_radius.is_finite() && max_display_radius > 0.0) {
            return Err(SkywatchError::invalid_config(format!(
                "radar display radius must be positive, got {max_display_radius}"
            )));
        }

        Ok(Self {
            reference,
            view_center,
            scale: max_display_radius / detection_radius,
        })
    }

    pub fn reference(&self) -> WorldPoint {
        self.reference
    }

    /// Pixels per world unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn world_to_view(&self, world: WorldPoint) -> PixelPoint {
        let relative = world - self.reference;
        PixelPoint::new(
            self.view_center.x + relative.x * self.scale,
            self.view_center.y + relative.y * self.scale,
        )
    }

    pub fn scale_length(&self, world_length: f64) -> f64 {
        world_length * self.scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    bounds: Rect,
    viewport: Rect,
    zoom: f64,
    pan: PixelPoint,
    scale_x: f64,
    scale_y: f64,
}

impl MinimapProjection {
    pub fn new(bounds: Rect, viewport: Rect, zoom: f64, pan: PixelPoint) -> Result<Self> {
        if !bounds.has_positive_area() {
            return Err(SkywatchError::invalid_config(format!(
                "map bounds must have positive size, got {}x{}",
                bounds.width, bounds.height
            )));
        }
        if !viewport.has_positive_area() {
            return Err(SkywatchError::invalid_config(format!(
                "minimap viewport must have positive size, got {}x{}",
                viewport.width, viewport.height
            )));
        }
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(SkywatchError::invalid_config(format!(
                "zoom must be positive, got {zoom}"
            )));
        }
        if !(pan.x.is_finite() && pan.y.is_finite()) {
            return Err(SkywatchError::invalid_config("center offset must be finite"));
        }

        Ok(Self {
            bounds,
            viewport,
            zoom,
            pan,
            scale_x: viewport.width / bounds.width,
            scale_y: viewport.height / bounds.height,
        })
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    pub fn world_to_view(&self, world: WorldPoint) -> PixelPoint {
        let center = self.viewport.center();

        let initial_x = self.viewport.x + (world.x - self.bounds.x) * self.scale_x;
        let initial_y = self.viewport.y + (world.y - self.bounds.y) * self.scale_y;

        let offset_x = (initial_x - center.x) * self.zoom;
        let offset_y = (initial_y - center.y) * self.zoom;

        PixelPoint::new(
            center.x + offset_x + self.pan.x,
            center.y + offset_y + self.pan.y,
        )
    }

    pub fn view_to_world(&self, view: PixelPoint) -> WorldPoint {
        let center = self.viewport.center();

        // Zoom has to come off before un-projecting; the order matters.
        let offset_x = (view.x - self.pan.x - center.x) / self.zoom;
        let offset_y = (view.y - self.pan.y - center.y) / self.zoom;

        let initial_x = center.x + offset_x;
        let initial_y = center.y + offset_y;

        WorldPoint::new(
            (initial_x - self.viewport.x) / self.scale_x + self.bounds.x,
            (initial_y - self.viewport.y) / self.scale_y + self.bounds.y,
        )
    }

    /// World point that lands on the viewport center when there is no pan.
    pub fn bounds_center(&self) -> WorldPoint {
        WorldPoint::new(
            self.bounds.x + self.bounds.width / 2.0,
            self.bounds.y + self.bounds.height / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn default_bounds() -> Rect {
        Rect::new(0.0, 0.0, 1280.0, 800.0)
    }

    fn small_viewport() -> Rect {
        Rect::new(0.0, 0.0, 120.0, 120.0).inset(10.0)
    }

    #[test]
    fn radar_magnifies_around_reference_without_rotation() {
        let projection = RadarProjection::new(
            WorldPoint::new(100.0, 100.0),
            PixelPoint::new(150.0, 150.0),
            150.0,
            300.0,
        )
        .unwrap();

        assert_eq!(projection.scale(), 0.5);
        assert_eq!(
            projection.world_to_view(WorldPoint::new(100.0, 100.0)),
            PixelPoint::new(150.0, 150.0)
        );
        // "up" in world space stays "up" on screen.
        assert_eq!(
            projection.world_to_view(WorldPoint::new(100.0, 0.0)),
            PixelPoint::new(150.0, 100.0)
        );
        assert_eq!(projection.scale_length(50.0), 25.0);
    }

    #[test]
    fn radar_rejects_degenerate_radii() {
        let center = PixelPoint::new(0.0, 0.0);
        assert!(matches!(
            RadarProjection::new(WorldPoint::default(), center, 100.0, 0.0),
            Err(SkywatchError::InvalidConfig(_))
        ));
        assert!(matches!(
            RadarProjection::new(WorldPoint::default(), center, 0.0, 300.0),
            Err(SkywatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn minimap_rejects_zero_bounds_and_viewport() {
        let zero_bounds = Rect::new(0.0, 0.0, 0.0, 800.0);
        assert!(matches!(
            MinimapProjection::new(zero_bounds, small_viewport(), 1.0, PixelPoint::default()),
            Err(SkywatchError::InvalidConfig(_))
        ));

        let zero_viewport = Rect::new(0.0, 0.0, 20.0, 20.0).inset(10.0);
        assert!(matches!(
            MinimapProjection::new(default_bounds(), zero_viewport, 1.0, PixelPoint::default()),
            Err(SkywatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn map_center_projects_to_viewport_center_at_any_zoom() {
        for zoom in [MIN_ZOOM, 0.5, 1.0, 1.5, MAX_ZOOM] {
            let projection =
                MinimapProjection::new(default_bounds(), small_viewport(), zoom, PixelPoint::default())
                    .unwrap();
            let projected = projection.world_to_view(WorldPoint::new(640.0, 400.0));
            assert_relative_eq!(projected.x, 60.0, epsilon = 1e-9);
            assert_relative_eq!(projected.y, 60.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn projection_scales_axes_independently() {
        let projection =
            MinimapProjection::new(default_bounds(), small_viewport(), 1.0, PixelPoint::default())
                .unwrap();
        let (scale_x, scale_y) = projection.scale();
        assert_relative_eq!(scale_x, 100.0 / 1280.0);
        assert_relative_eq!(scale_y, 100.0 / 800.0);

        let corner = projection.world_to_view(WorldPoint::new(0.0, 0.0));
        assert_relative_eq!(corner.x, 10.0);
        assert_relative_eq!(corner.y, 10.0);
    }

    #[test]
    fn pan_shifts_after_zoom() {
        let pan = PixelPoint::new(7.0, -3.0);
        let projection = MinimapProjection::new(default_bounds(), small_viewport(), 2.0, pan).unwrap();
        let projected = projection.world_to_view(projection.bounds_center());
        assert_relative_eq!(projected.x, 67.0, epsilon = 1e-9);
        assert_relative_eq!(projected.y, 57.0, epsilon = 1e-9);
    }

    #[test]
    fn bounds_origin_is_respected() {
        let bounds = Rect::new(-100.0, 50.0, 200.0, 100.0);
        let viewport = Rect::new(0.0, 0.0, 200.0, 100.0);
        let projection = MinimapProjection::new(bounds, viewport, 1.0, PixelPoint::default()).unwrap();
        assert_eq!(
            projection.world_to_view(WorldPoint::new(-100.0, 50.0)),
            PixelPoint::new(0.0, 0.0)
        );
    }

    #[test]
    fn clamp_zoom_limits_range() {
        assert_eq!(clamp_zoom(0.1), MIN_ZOOM);
        assert_eq!(clamp_zoom(5.0), MAX_ZOOM);
        assert_eq!(clamp_zoom(1.25), 1.25);
        assert_eq!(clamp_zoom(f64::NAN), 1.0);
    }

    proptest! {
        #[test]
        fn inverse_undoes_forward(
            x in 0.0f64..1280.0,
            y in 0.0f64..800.0,
            zoom in MIN_ZOOM..=MAX_ZOOM,
            pan_x in -50.0f64..50.0,
            pan_y in -50.0f64..50.0,
        ) {
            let projection = MinimapProjection::new(
                default_bounds(),
                small_viewport(),
                zoom,
                PixelPoint::new(pan_x, pan_y),
            )
            .unwrap();
            let back = projection.view_to_world(projection.world_to_view(WorldPoint::new(x, y)));
            prop_assert!((back.x - x).abs() < 1e-6);
            prop_assert!((back.y - y).abs() < 1e-6);
        }

        #[test]
        fn viewport_center_is_stable_under_zoom(a in MIN_ZOOM..=MAX_ZOOM, b in MIN_ZOOM..=MAX_ZOOM) {
            let at = |zoom| {
                MinimapProjection::new(default_bounds(), small_viewport(), zoom, PixelPoint::default())
                    .unwrap()
            };
            let first = at(a);
            let second = at(b);
            let world = first.bounds_center();
            let p = first.world_to_view(world);
            let q = second.world_to_view(world);
            prop_assert!((p.x - q.x).abs() < 1e-9);
            prop_assert!((p.y - q.y).abs() < 1e-9);
        }
    }
}
