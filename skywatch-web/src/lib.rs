use log::{LevelFilter, debug, info, warn};
#[cfg(target_arch = "wasm32")]
use macroquad::miniquad;
use macroquad::prelude::*;
use skywatch_core::{
    ClearScope, ControlCommand, EngineConfig, PixelPoint, Rect, TacticalEngine,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::feed::SimulatedFeed;
use crate::marker::{
    MINIMAP_BACKGROUND, MINIMAP_BORDER, MINIMAP_GRID, RADAR_BACKGROUND, RADAR_GRID, RADAR_SWEEP,
    VehicleDrawConfig, draw_obstacle_marker, draw_vehicle_marker,
};

pub mod feed;
pub mod logging;
pub mod marker;

const FEED_STEP_SECONDS: f64 = 0.1;
const SWEEP_STEP_DEGREES: f64 = 6.0;
const SWEEP_STEP_SECONDS: f64 = 0.1;
const PANEL_GAP: f32 = 16.0;
const HUD_HEIGHT: f32 = 72.0;
const ZOOM_STEP: f64 = 1.1;
const RADAR_RINGS: usize = 4;
const FEED_SEED: u64 = 42;

static PENDING_CLEAR_CLOUDS: AtomicBool = AtomicBool::new(false);

#[derive(Default)]
struct SelectedVehicleUi {
    present: bool,
    name: String,
    health: i32,
    nearest_enemy: f32,
}

fn selected_vehicle_ui() -> MutexGuard<'static, SelectedVehicleUi> {
    static SELECTED_VEHICLE_UI: OnceLock<Mutex<SelectedVehicleUi>> = OnceLock::new();
    SELECTED_VEHICLE_UI
        .get_or_init(|| Mutex::new(SelectedVehicleUi::default()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[unsafe(no_mangle)]
pub extern "C" fn selected_vehicle_present() -> i32 {
    if selected_vehicle_ui().present { 1 } else { 0 }
}

#[unsafe(no_mangle)]
pub extern "C" fn selected_vehicle_name_ptr() -> *const u8 {
    let ui = selected_vehicle_ui();
    if ui.present {
        ui.name.as_ptr()
    } else {
        std::ptr::null()
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn selected_vehicle_name_len() -> usize {
    let ui = selected_vehicle_ui();
    if ui.present { ui.name.len() } else { 0 }
}

#[unsafe(no_mangle)]
pub extern "C" fn selected_vehicle_health() -> i32 {
    let ui = selected_vehicle_ui();
    if ui.present { ui.health } else { 0 }
}

#[unsafe(no_mangle)]
pub extern "C" fn selected_vehicle_nearest_enemy() -> f32 {
    let ui = selected_vehicle_ui();
    if ui.present { ui.nearest_enemy } else { 0.0 }
}

#[unsafe(no_mangle)]
pub extern "C" fn clear_weather_cells() {
    info!("ui action: clear weather cells");
    PENDING_CLEAR_CLOUDS.store(true, Ordering::SeqCst);
}

/// Screen regions for the two panels, recomputed when the window resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    radar: Rect,
    minimap: Rect,
}

impl Layout {
    fn for_screen(width: f32, height: f32) -> Self {
        let usable_height = (height - HUD_HEIGHT - PANEL_GAP).max(0.0) as f64;
        let half_width = ((width - PANEL_GAP * 3.0) / 2.0).max(0.0) as f64;
        let gap = PANEL_GAP as f64;
        let side = half_width.min(usable_height);
        Self {
            radar: Rect::new(gap, gap, side, side),
            minimap: Rect::new(gap * 2.0 + half_width, gap, half_width, usable_height),
        }
    }
}

fn to_vec2(point: PixelPoint) -> Vec2 {
    vec2(point.x as f32, point.y as f32)
}

pub struct ConsoleState {
    engine: TacticalEngine,
    feed: SimulatedFeed,
    vehicle_draw: VehicleDrawConfig,
    layout: Option<Layout>,
    feed_accumulator: f64,
    sweep_angle: f64,
    last_sweep_time: f64,
    last_drag_pos: Option<Vec2>,
    last_command: Option<ControlCommand>,
    fps: f32,
    fps_frame_count: u32,
    fps_last_update_time: f64,
}

impl ConsoleState {
    pub fn new(config: EngineConfig) -> skywatch_core::Result<Self> {
        let bounds = config.minimap.map_bounds;
        let engine = TacticalEngine::new_with_clock(
            config,
            Box::new(|| (get_time() * 1000.0).max(0.0) as u64),
        )?;
        let now = get_time();
        Ok(Self {
            engine,
            feed: SimulatedFeed::new(FEED_SEED, bounds),
            vehicle_draw: VehicleDrawConfig::default(),
            layout: None,
            feed_accumulator: 0.0,
            sweep_angle: 0.0,
            last_sweep_time: now,
            last_drag_pos: None,
            last_command: None,
            fps: 0.0,
            fps_frame_count: 0,
            fps_last_update_time: now,
        })
    }

    fn update_layout(&mut self) {
        let next = Layout::for_screen(screen_width(), screen_height());
        if self.layout == Some(next) {
            return;
        }
        if let Err(err) = self.engine.radar_mut().set_viewport(next.radar) {
            warn!("radar layout rejected: {err}");
        }
        if let Err(err) = self.engine.minimap_mut().set_viewport(next.minimap) {
            warn!("minimap layout rejected: {err}");
        }
        debug!("layout {:?}", next);
        self.layout = Some(next);
    }

    fn pump_feed(&mut self) {
        self.feed_accumulator += get_frame_time() as f64;
        while self.feed_accumulator >= FEED_STEP_SECONDS {
            self.feed_accumulator -= FEED_STEP_SECONDS;
            let snapshot = self.feed.tick(FEED_STEP_SECONDS);
            let report = self.engine.apply_snapshot(&snapshot);
            if report.vehicles_dropped > 0 || report.obstacles_dropped > 0 {
                debug!("snapshot applied with drops: {:?}", report);
            }
        }
        let expired = self.engine.sweep();
        if expired > 0 {
            debug!("{expired} stale obstacles expired");
        }
    }

    fn advance_sweep(&mut self) {
        let now = get_time();
        while now - self.last_sweep_time >= SWEEP_STEP_SECONDS {
            self.sweep_angle = (self.sweep_angle + SWEEP_STEP_DEGREES) % 360.0;
            self.last_sweep_time += SWEEP_STEP_SECONDS;
        }
    }

    fn update_fps_if_due(&mut self) {
        let now = get_time();
        self.fps_frame_count += 1;
        let elapsed = now - self.fps_last_update_time;
        if elapsed >= 1.0 {
            self.fps = self.fps_frame_count as f32 / elapsed as f32;
            self.fps_frame_count = 0;
            self.fps_last_update_time = now;
        }
    }

    fn apply_pending_ui_actions(&mut self) {
        if PENDING_CLEAR_CLOUDS.swap(false, Ordering::SeqCst) || is_key_pressed(KeyCode::C) {
            let removed = self.engine.clear_obstacles_in(ClearScope::TransientOnly);
            info!("cleared {removed} weather cells");
        }
    }

    fn pointer_over_minimap(&self, pointer: Vec2) -> bool {
        self.layout
            .is_some_and(|layout| layout.minimap.contains(pointer.x as f64, pointer.y as f64))
    }

    fn handle_mouse_wheel_zoom(&mut self) {
        let (_wheel_x, wheel_y) = mouse_wheel();
        let (mouse_x, mouse_y) = mouse_position();
        if wheel_y == 0.0 || !self.pointer_over_minimap(vec2(mouse_x, mouse_y)) {
            return;
        }
        let minimap = self.engine.minimap_mut();
        let factor = if wheel_y > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        minimap.set_zoom(minimap.zoom() * factor);
    }

    fn handle_right_mouse_drag(&mut self) {
        let (mouse_x, mouse_y) = mouse_position();
        let current = vec2(mouse_x, mouse_y);

        if is_mouse_button_down(MouseButton::Right) && self.pointer_over_minimap(current) {
            if let Some(last) = self.last_drag_pos {
                let delta = current - last;
                let minimap = self.engine.minimap_mut();
                let offset = minimap.center_offset();
                minimap.set_center_offset(PixelPoint::new(
                    offset.x + delta.x as f64,
                    offset.y + delta.y as f64,
                ));
            }
            self.last_drag_pos = Some(current);
        } else {
            self.last_drag_pos = None;
        }
    }

    fn handle_left_click(&mut self) {
        if !is_mouse_button_pressed(MouseButton::Left) {
            return;
        }
        let (mouse_x, mouse_y) = mouse_position();
        let pixel = PixelPoint::new(mouse_x as f64, mouse_y as f64);
        match self.engine.hit_test(pixel) {
            Ok(Some(id)) => {
                info!("selected {id}");
                self.engine.set_selected(&id);
            }
            Ok(None) => {}
            Err(err) => debug!("click ignored: {err}"),
        }
    }

    /// Arrow keys steer the selected vehicle like the on-screen joystick.
    fn handle_steering(&mut self) {
        let Some(uid) = self.engine.selected().map(str::to_string) else {
            return;
        };
        let mut direction = Vec2::ZERO;
        if is_key_down(KeyCode::Up) {
            direction.y -= 1.0;
        }
        if is_key_down(KeyCode::Down) {
            direction.y += 1.0;
        }
        if is_key_down(KeyCode::Left) {
            direction.x -= 1.0;
        }
        if is_key_down(KeyCode::Right) {
            direction.x += 1.0;
        }

        let angle = (direction != Vec2::ZERO)
            .then(|| (direction.x as f64).atan2(-(direction.y as f64)).to_degrees());
        // A released stick sends one stop command, then stays quiet.
        if angle.is_none() && self.last_command.is_none() {
            return;
        }
        let command = ControlCommand::from_joystick(uid, angle, 1.0);
        if self.last_command.as_ref() == Some(&command) {
            return;
        }
        match command.to_json() {
            Ok(body) => debug!("/ctrl {body}"),
            Err(err) => warn!("cannot encode control command: {err}"),
        }
        self.feed.steer(&command);
        self.last_command = angle.map(|_| command);
    }

    fn sync_selected_ui(&self) {
        let mut ui = selected_vehicle_ui();
        let selected = self
            .engine
            .selected()
            .and_then(|id| self.engine.store().vehicle(id).ok());
        match selected {
            Some(vehicle) => {
                ui.present = true;
                ui.name.clear();
                ui.name.push_str(&vehicle.id);
                ui.health = i32::from(vehicle.health);
                ui.nearest_enemy = self
                    .engine
                    .distance_to_nearest_enemy(&vehicle.id)
                    .unwrap_or(skywatch_core::NO_TARGET_DISTANCE) as f32;
            }
            None => {
                ui.present = false;
                ui.name.clear();
                ui.health = 0;
                ui.nearest_enemy = 0.0;
            }
        }
    }

    fn render(&self) {
        clear_background(BLACK);
        if let Some(layout) = self.layout {
            self.render_radar(layout.radar);
            self.render_minimap(layout.minimap);
        }
        self.render_hud();
    }

    fn render_radar(&self, widget: Rect) {
        let Ok(projection) = self.engine.radar().projection() else {
            draw_text("radar: no reference", widget.x as f32, widget.y as f32 + 20.0, 20.0, GRAY);
            return;
        };
        let center = to_vec2(widget.center());
        let radius = projection.scale_length(self.engine.radar().config().detection_radius) as f32;

        draw_circle(center.x, center.y, radius, RADAR_BACKGROUND);
        for ring in 1..=RADAR_RINGS {
            let ring_radius = radius * ring as f32 / RADAR_RINGS as f32;
            draw_circle_lines(center.x, center.y, ring_radius, 1.0, RADAR_GRID);
        }
        draw_line(center.x - radius, center.y, center.x + radius, center.y, 1.0, RADAR_GRID);
        draw_line(center.x, center.y - radius, center.x, center.y + radius, 1.0, RADAR_GRID);

        let sweep = marker::heading_direction(self.sweep_angle) * radius;
        draw_line(center.x, center.y, center.x + sweep.x, center.y + sweep.y, 2.0, RADAR_SWEEP);

        match self.engine.radar_obstacles() {
            Ok(markers) => markers.iter().for_each(draw_obstacle_marker),
            Err(err) => debug!("radar obstacles unavailable: {err}"),
        }
        match self.engine.radar_vehicles() {
            Ok(markers) => {
                for marker in &markers {
                    draw_vehicle_marker(marker, &self.vehicle_draw);
                }
            }
            Err(err) => debug!("radar vehicles unavailable: {err}"),
        }
    }

    fn render_minimap(&self, widget: Rect) {
        let (x, y, w, h) = (
            widget.x as f32,
            widget.y as f32,
            widget.width as f32,
            widget.height as f32,
        );
        draw_rectangle(x, y, w, h, MINIMAP_BACKGROUND);
        let cell = 40.0;
        let mut grid_x = x + cell;
        while grid_x < x + w {
            draw_line(grid_x, y, grid_x, y + h, 1.0, MINIMAP_GRID);
            grid_x += cell;
        }
        let mut grid_y = y + cell;
        while grid_y < y + h {
            draw_line(x, grid_y, x + w, grid_y, 1.0, MINIMAP_GRID);
            grid_y += cell;
        }
        draw_rectangle_lines(x, y, w, h, 2.0, MINIMAP_BORDER);

        match self.engine.minimap_obstacles() {
            Ok(markers) => markers.iter().for_each(draw_obstacle_marker),
            Err(err) => debug!("minimap obstacles unavailable: {err}"),
        }
        match self.engine.minimap_vehicles() {
            Ok(markers) => {
                for marker in &markers {
                    draw_vehicle_marker(marker, &self.vehicle_draw);
                }
            }
            Err(err) => debug!("minimap vehicles unavailable: {err}"),
        }
    }

    fn render_hud(&self) {
        let top = screen_height() - HUD_HEIGHT + 24.0;
        let ui = selected_vehicle_ui();
        let selection = if ui.present {
            format!(
                "selected: {}  hp: {}  nearest enemy: {:.0}",
                ui.name, ui.health, ui.nearest_enemy
            )
        } else {
            "selected: none".to_string()
        };
        drop(ui);
        draw_text(&selection, PANEL_GAP, top, 22.0, WHITE);
        draw_text(
            &format!(
                "stage: {}  vehicles: {}  obstacles: {}  zoom: {:.2}  fps: {:.0}",
                self.engine.stage().unwrap_or("-"),
                self.engine.store().vehicle_count(),
                self.engine.store().obstacle_count(),
                self.engine.minimap().zoom(),
                self.fps
            ),
            PANEL_GAP,
            top + 26.0,
            18.0,
            GRAY,
        );
    }
}

pub async fn run() {
    install_panic_hook();
    logging::init(LevelFilter::Info);

    let mut console = match ConsoleState::new(EngineConfig::default()) {
        Ok(console) => console,
        Err(err) => {
            log::error!("cannot start console: {err}");
            return;
        }
    };
    info!("console started");

    loop {
        console.update_layout();
        console.pump_feed();
        console.advance_sweep();
        console.apply_pending_ui_actions();
        console.handle_mouse_wheel_zoom();
        console.handle_right_mouse_drag();
        console.handle_left_click();
        console.handle_steering();
        console.sync_selected_ui();
        console.update_fps_if_due();

        console.render();

        next_frame().await;
    }
}

#[cfg(target_arch = "wasm32")]
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let msg = info.to_string();
        if let Some(location) = info.location() {
            miniquad::error!("panic at {}:{}: {}", location.file(), location.line(), msg);
        } else {
            miniquad::error!("panic: {}", msg);
        }
    }));
}

#[cfg(not(target_arch = "wasm32"))]
fn install_panic_hook() {}
