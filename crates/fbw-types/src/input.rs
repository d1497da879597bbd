//! Input mirrors populated by event dispatch.
//!
//! Discrete fields are edge-triggered: dispatch sets or accumulates them and
//! only an explicit reset by the consumer returns them to baseline.  Axis and
//! lever fields are levels and keep their last value.

use serde::{Deserialize, Serialize};

/// Index of each primary flight-control axis in [`SimInput::inputs`].
pub const AXIS_ELEVATOR: usize = 0;
pub const AXIS_AILERON: usize = 1;
pub const AXIS_RUDDER: usize = 2;

/// Number of engines the throttle mirrors carry.
pub const THROTTLE_AXIS_COUNT: usize = 2;

/// Pilot flight-control axes in −1..1 (elevator, aileron, rudder).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimInput {
    pub inputs: [f64; 3],
}

/// Edge-triggered autopilot pushbuttons.  `1.0` means the button was pressed
/// at least once since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimInputAutopilot {
    pub ap_engage: f64,
    pub ap_1_push: f64,
    pub ap_2_push: f64,
    pub ap_disconnect: f64,
    pub hdg_push: f64,
    pub hdg_pull: f64,
    pub alt_push: f64,
    pub alt_pull: f64,
    pub vs_push: f64,
    pub vs_pull: f64,
    pub loc_push: f64,
    pub appr_push: f64,
}

impl SimInputAutopilot {
    /// `true` when every field is at baseline.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Throttle mirror.
///
/// `throttles` and `reverse` are levels refreshed from the throttle-axis
/// mappings; `increments` and `athr_push` are edge-triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimInputThrottles {
    /// Current lever value per engine as reported by its mapping.
    pub throttles: [f64; THROTTLE_AXIS_COUNT],
    /// Reverse thrust requested per engine (`1.0` / `0.0`).
    pub reverse: [f64; THROTTLE_AXIS_COUNT],
    /// Net increment steps per engine since the last reset.
    pub increments: [f64; THROTTLE_AXIS_COUNT],
    /// `AUTO_THROTTLE_ARM` pressed since the last reset.
    pub athr_push: f64,
}

impl SimInputThrottles {
    /// Zero the edge-triggered fields, leaving levels intact.
    pub fn clear_edges(&mut self) {
        self.increments = [0.0; THROTTLE_AXIS_COUNT];
        self.athr_push = 0.0;
    }
}
