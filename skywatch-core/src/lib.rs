pub mod config;
pub mod control;
pub mod coordinates;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod obstacle;
pub mod store;
pub mod telemetry;
pub mod vehicle;
pub mod view;
pub mod visibility;

pub use config::{EngineConfig, MinimapConfig, RadarConfig};
pub use control::{ControlCommand, MAX_COMMAND_COMPONENT};
pub use coordinates::{PixelPoint, Rect, WorldPoint};
pub use engine::{NO_TARGET_DISTANCE, TacticalEngine};
pub use error::{EntityKind, Result, SkywatchError};
pub use geometry::{MAX_ZOOM, MIN_ZOOM, MinimapProjection, RadarProjection, clamp_zoom};
pub use obstacle::{ClearScope, DEFAULT_OBSTACLE_TIMEOUT_MS, ObstacleKind, ObstacleState};
pub use store::{ClockFn, EntityStore};
pub use telemetry::{ObstacleReport, Snapshot, SnapshotReport, VehicleReport, derive_heading};
pub use vehicle::{MAX_HEALTH, Team, VehicleState};
pub use view::{
    ColorCategory, ContactStatus, MinimapView, ObstacleMarker, RadarView, Selection,
    VehicleMarker, ViewState,
};
