//! Throttle-axis mapping collaborator.
//!
//! Curve shaping and persistence of throttle detents belong to another
//! subsystem.  The bridge only forwards throttle events to the addressed
//! mapping and reads back each mapping's lever value after a drain.
//!
//! [`DirectThrottleAxis`] is a linear mapping with no detents and no
//! persistence, used by the reference cycle driver and in tests.

use std::cell::RefCell;
use std::rc::Rc;

use fbw_types::BridgeError;
use tracing::debug;

/// One engine's throttle axis as seen by the bridge.
pub trait ThrottleAxisMapping {
    /// Raw `THROTTLE*_SET` value (0..16384).
    fn on_event_throttle_set(&mut self, value: i64);

    /// Raw `THROTTLE*_AXIS_SET_EX1` value (−16384..16384).
    fn on_event_throttle_axis_set_ex1(&mut self, value: i64);

    fn on_event_throttle_full(&mut self);
    fn on_event_throttle_cut(&mut self);
    fn on_event_throttle_increase(&mut self);
    fn on_event_throttle_decrease(&mut self);
    fn on_event_throttle_increase_small(&mut self);
    fn on_event_throttle_decrease_small(&mut self);

    /// Detent preset, `percent` in 10..=90.
    fn on_event_throttle_set_percent(&mut self, percent: u8);

    fn on_event_reverse_toggle(&mut self);
    fn on_event_reverse_hold(&mut self, held: bool);

    /// # Errors
    ///
    /// [`BridgeError::ThrottleMapping`] when the stored configuration cannot
    /// be read.
    fn load_from_file(&mut self) -> Result<(), BridgeError>;

    /// # Errors
    ///
    /// [`BridgeError::ThrottleMapping`] when the local variables hold no
    /// usable configuration.
    fn load_from_local_variables(&mut self) -> Result<(), BridgeError>;

    /// # Errors
    ///
    /// [`BridgeError::ThrottleMapping`] when the configuration cannot be
    /// written.
    fn save_to_file(&mut self) -> Result<(), BridgeError>;

    /// Current lever value.
    fn value(&self) -> f64;

    /// Whether reverse thrust is currently requested.
    fn is_reverse(&self) -> bool;
}

/// A mapping shared between the bridge and its owner.
pub type SharedThrottleAxis = Rc<RefCell<dyn ThrottleAxisMapping>>;

/// Wrap a mapping for handing to `connect`.
pub fn shared<T: ThrottleAxisMapping + 'static>(mapping: T) -> SharedThrottleAxis {
    Rc::new(RefCell::new(mapping))
}

// ─────────────────────────────────────────────────────────────────────────────
// DirectThrottleAxis
// ─────────────────────────────────────────────────────────────────────────────

const AXIS_RANGE: f64 = 16384.0;
const STEP: f64 = 0.05;
const SMALL_STEP: f64 = STEP / 4.0;

/// Linear lever in 0..1 with no detents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectThrottleAxis {
    lever: f64,
    reverse: bool,
}

impl DirectThrottleAxis {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, lever: f64) {
        self.lever = lever.clamp(0.0, 1.0);
    }
}

impl ThrottleAxisMapping for DirectThrottleAxis {
    fn on_event_throttle_set(&mut self, value: i64) {
        self.set(value as f64 / AXIS_RANGE);
    }

    fn on_event_throttle_axis_set_ex1(&mut self, value: i64) {
        self.set((value as f64 + AXIS_RANGE) / (2.0 * AXIS_RANGE));
    }

    fn on_event_throttle_full(&mut self) {
        self.set(1.0);
    }

    fn on_event_throttle_cut(&mut self) {
        self.set(0.0);
    }

    fn on_event_throttle_increase(&mut self) {
        self.set(self.lever + STEP);
    }

    fn on_event_throttle_decrease(&mut self) {
        self.set(self.lever - STEP);
    }

    fn on_event_throttle_increase_small(&mut self) {
        self.set(self.lever + SMALL_STEP);
    }

    fn on_event_throttle_decrease_small(&mut self) {
        self.set(self.lever - SMALL_STEP);
    }

    fn on_event_throttle_set_percent(&mut self, percent: u8) {
        self.set(f64::from(percent) / 100.0);
    }

    fn on_event_reverse_toggle(&mut self) {
        self.reverse = !self.reverse;
    }

    fn on_event_reverse_hold(&mut self, held: bool) {
        self.reverse = held;
    }

    fn load_from_file(&mut self) -> Result<(), BridgeError> {
        debug!("direct throttle axis has no stored configuration");
        Ok(())
    }

    fn load_from_local_variables(&mut self) -> Result<(), BridgeError> {
        debug!("direct throttle axis has no stored configuration");
        Ok(())
    }

    fn save_to_file(&mut self) -> Result<(), BridgeError> {
        debug!("direct throttle axis has no stored configuration");
        Ok(())
    }

    fn value(&self) -> f64 {
        self.lever
    }

    fn is_reverse(&self) -> bool {
        self.reverse
    }
}
