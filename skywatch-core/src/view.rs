//! Render-tick query surface shared by the radar and minimap views.
//!
//! Views never own entity data. Each query borrows the [`EntityStore`] and
//! returns markers that point back into it, in store iteration order.
//!
//! [`EntityStore`]: crate::store::EntityStore

pub mod minimap;
pub mod radar;

use crate::coordinates::PixelPoint;
use crate::obstacle::ObstacleState;
use crate::vehicle::{Team, VehicleState};

pub use minimap::MinimapView;
pub use radar::{ContactStatus, RadarView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unconfigured,
    Configured,
}

/// Color bucket handed to the drawing layer alongside each projected vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCategory {
    Destroyed,
    Selected,
    Offline,
    OwnTeam,
    EnemyTeam,
}

/// Operator selection and allegiance used to categorize vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub selected: Option<&'a str>,
    pub own_team: Team,
}

impl<'a> Selection<'a> {
    pub fn new(selected: Option<&'a str>, own_team: Team) -> Self {
        Self { selected, own_team }
    }

    /// Destroyed beats Selected beats Offline beats team color.
    pub fn categorize(&self, vehicle: &VehicleState) -> ColorCategory {
        if vehicle.is_destroyed() {
            ColorCategory::Destroyed
        } else if self.selected == Some(vehicle.id.as_str()) {
            ColorCategory::Selected
        } else if !vehicle.online {
            ColorCategory::Offline
        } else if vehicle.team == self.own_team {
            ColorCategory::OwnTeam
        } else {
            ColorCategory::EnemyTeam
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMarker<'a> {
    pub vehicle: &'a VehicleState,
    pub position: PixelPoint,
    pub display_radius: f64,
    pub category: ColorCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleMarker<'a> {
    pub obstacle: &'a ObstacleState,
    pub position: PixelPoint,
    pub display_radius: f64,
}
