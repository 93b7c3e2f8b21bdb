use macroquad::prelude::*;
use skywatch_core::{ColorCategory, ObstacleKind, ObstacleMarker, VehicleMarker};

pub const MINIMAP_BACKGROUND: Color = Color::new(30.0 / 255.0, 34.0 / 255.0, 42.0 / 255.0, 1.0);
pub const MINIMAP_GRID: Color = Color::new(60.0 / 255.0, 64.0 / 255.0, 72.0 / 255.0, 1.0);
pub const MINIMAP_BORDER: Color = Color::new(70.0 / 255.0, 130.0 / 255.0, 180.0 / 255.0, 1.0);
pub const RADAR_BACKGROUND: Color = Color::new(0.0, 20.0 / 255.0, 0.0, 1.0);
pub const RADAR_GRID: Color = Color::new(0.0, 1.0, 0.0, 100.0 / 255.0);
pub const RADAR_SWEEP: Color = Color::new(0.0, 1.0, 0.0, 150.0 / 255.0);

#[derive(Debug, Clone)]
pub struct VehicleDrawConfig {
    pub stroke_ratio: f32,         // outline width as a fraction of radius
    pub heading_length_ratio: f32, // heading tick length as a fraction of radius
    pub heading_thickness: f32,
    pub label_size: f32,
    pub stroke_color: Color,
}

impl Default for VehicleDrawConfig {
    fn default() -> Self {
        Self {
            stroke_ratio: 0.3,
            heading_length_ratio: 1.8,
            heading_thickness: 2.0,
            label_size: 14.0,
            stroke_color: BLACK,
        }
    }
}

pub fn category_color(category: ColorCategory) -> Color {
    match category {
        ColorCategory::Destroyed => WHITE,
        ColorCategory::Selected => Color::from_rgba(255, 165, 102, 255),
        ColorCategory::Offline => Color::from_rgba(128, 128, 128, 255),
        ColorCategory::OwnTeam => Color::from_rgba(0, 191, 255, 255),
        ColorCategory::EnemyTeam => Color::from_rgba(255, 0, 0, 255),
    }
}

pub fn obstacle_color(kind: ObstacleKind) -> Color {
    match kind {
        ObstacleKind::Terrain => Color::from_rgba(39, 255, 96, 255),
        ObstacleKind::Sensor => Color::from_rgba(255, 89, 252, 255),
        ObstacleKind::WeatherCell => Color::from_rgba(255, 255, 15, 255),
    }
}

/// Unit vector for a compass heading in screen space (0 = up, clockwise).
pub fn heading_direction(heading_degrees: f64) -> Vec2 {
    let radians = heading_degrees.to_radians() as f32;
    vec2(radians.sin(), -radians.cos())
}

pub fn draw_vehicle_marker(marker: &VehicleMarker<'_>, config: &VehicleDrawConfig) {
    let center = vec2(marker.position.x as f32, marker.position.y as f32);
    let radius = marker.display_radius as f32;
    let stroke = (radius * config.stroke_ratio).max(1.0);
    let color = category_color(marker.category);

    draw_circle(center.x, center.y, radius + stroke * 0.5, config.stroke_color);
    draw_circle(center.x, center.y, radius, color);

    // Destroyed wrecks keep their last heading but do not point anywhere.
    if marker.category != ColorCategory::Destroyed {
        let tip = center + heading_direction(marker.vehicle.heading) * radius * config.heading_length_ratio;
        draw_line(center.x, center.y, tip.x, tip.y, config.heading_thickness, color);
    }

    draw_text(
        &marker.vehicle.id,
        center.x + radius + 2.0,
        center.y - radius,
        config.label_size,
        color,
    );
}

pub fn draw_obstacle_marker(marker: &ObstacleMarker<'_>) {
    let mut color = obstacle_color(marker.obstacle.kind);
    if marker.obstacle.kind == ObstacleKind::WeatherCell {
        color.a = 0.6;
    }
    draw_circle(
        marker.position.x as f32,
        marker.position.y as f32,
        marker.display_radius as f32,
        color,
    );
}
