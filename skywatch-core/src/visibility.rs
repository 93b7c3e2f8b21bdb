//! Per-view eligibility rules.
//!
//! The radar rule is a plain distance threshold in world units. The minimap
//! rule is evaluated on the projected pixel position, so it depends on zoom
//! and pan.

use crate::coordinates::{PixelPoint, Rect, WorldPoint};

pub fn within_detection_radius(
    position: WorldPoint,
    reference: WorldPoint,
    detection_radius: f64,
) -> bool {
    position.distance(reference) <= detection_radius
}

pub fn within_viewport(projected: PixelPoint, viewport: &Rect) -> bool {
    viewport.contains(projected.x, projected.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundary_is_inclusive() {
        let reference = WorldPoint::new(100.0, 100.0);
        assert!(within_detection_radius(WorldPoint::new(400.0, 100.0), reference, 300.0));
        assert!(!within_detection_radius(WorldPoint::new(400.1, 100.0), reference, 300.0));
    }

    #[test]
    fn viewport_rule_uses_pixels() {
        let viewport = Rect::new(10.0, 10.0, 100.0, 100.0);
        assert!(within_viewport(PixelPoint::new(10.0, 10.0), &viewport));
        assert!(!within_viewport(PixelPoint::new(110.0, 50.0), &viewport));
        assert!(!within_viewport(PixelPoint::new(5.0, 50.0), &viewport));
    }

    proptest! {
        #[test]
        fn closer_points_stay_visible(
            ax in -1000.0f64..1000.0, ay in -1000.0f64..1000.0,
            bx in -1000.0f64..1000.0, by in -1000.0f64..1000.0,
            rx in -500.0f64..500.0, ry in -500.0f64..500.0,
        ) {
            let reference = WorldPoint::new(rx, ry);
            let a = WorldPoint::new(ax, ay);
            let b = WorldPoint::new(bx, by);
            if a.distance(reference) < b.distance(reference)
                && within_detection_radius(b, reference, 300.0)
            {
                prop_assert!(within_detection_radius(a, reference, 300.0));
            }
        }
    }
}
