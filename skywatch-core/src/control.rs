use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Largest velocity component the server accepts in a control datagram.
pub const MAX_COMMAND_COMPONENT: f64 = 50.0;

/// Body of a `/ctrl` datagram steering one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub uid: String,
    pub vx: f64,
    pub vy: f64,
}

impl ControlCommand {
    pub fn stop(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Converts a stick reading into a velocity command.
    ///
    /// `angle_degrees` is a compass angle (0 = up, clockwise) or `None` when the
    /// stick is centered. The direction is stretched so its larger component
    /// reaches [`MAX_COMMAND_COMPONENT`] at full deflection.
    pub fn from_joystick(uid: impl Into<String>, angle_degrees: Option<f64>, deflection: f64) -> Self {
        let Some(angle) = angle_degrees.filter(|angle| angle.is_finite()) else {
            return Self::stop(uid);
        };
        let deflection = if deflection.is_finite() {
            deflection.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let radians = angle.to_radians();
        let raw_vx = radians.sin();
        let raw_vy = -radians.cos();
        let scale = MAX_COMMAND_COMPONENT / raw_vx.abs().max(raw_vy.abs());

        Self {
            uid: uid.into(),
            vx: raw_vx * scale * deflection,
            vy: raw_vy * scale * deflection,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn centered_stick_stops() {
        let command = ControlCommand::from_joystick("B1", None, 1.0);
        assert_eq!(command, ControlCommand::stop("B1"));
    }

    #[test]
    fn cardinal_directions_hit_the_component_limit() {
        let up = ControlCommand::from_joystick("B1", Some(0.0), 1.0);
        assert_relative_eq!(up.vx, 0.0, epsilon = 1e-9);
        assert_relative_eq!(up.vy, -50.0);

        let east = ControlCommand::from_joystick("B1", Some(90.0), 0.5);
        assert_relative_eq!(east.vx, 25.0);
        assert_relative_eq!(east.vy, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn diagonals_saturate_both_components() {
        let command = ControlCommand::from_joystick("B2", Some(135.0), 1.0);
        assert_relative_eq!(command.vx, 50.0, epsilon = 1e-9);
        assert_relative_eq!(command.vy, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn deflection_is_clamped() {
        let command = ControlCommand::from_joystick("B1", Some(270.0), 3.0);
        assert_relative_eq!(command.vx, -50.0);
    }

    #[test]
    fn serializes_datagram_body() {
        let json = ControlCommand::stop("B3").to_json().unwrap();
        assert_eq!(json, r#"{"uid":"B3","vx":0.0,"vy":0.0}"#);
    }
}
