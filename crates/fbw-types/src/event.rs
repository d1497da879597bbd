//! The closed set of semantic commands the bridge understands.
//!
//! Every [`Event`] is bound to exactly one host trigger name.  Its numeric
//! [`EventId`] is its position in [`Event::ALL`], so IDs are dense and
//! reproducible across sessions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::EventId;

macro_rules! semantic_events {
    ($( $variant:ident => $sim_name:literal ),* $(,)?) => {
        /// Semantic command identifier.
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Event {
            $( $variant, )*
        }

        impl Event {
            /// Every event, in ID order.
            pub const ALL: &'static [Event] = &[ $( Event::$variant, )* ];

            /// Host trigger name this event is mapped to.
            pub fn sim_event_name(self) -> &'static str {
                match self {
                    $( Event::$variant => $sim_name, )*
                }
            }
        }
    };
}

semantic_events! {
    AxisElevatorSet => "AXIS_ELEVATOR_SET",
    AxisAileronsSet => "AXIS_AILERONS_SET",
    AxisRudderSet => "AXIS_RUDDER_SET",
    RudderSet => "RUDDER_SET",
    RudderLeft => "RUDDER_LEFT",
    RudderAxisPlus => "RUDDER_AXIS_PLUS",
    RudderCenter => "RUDDER_CENTER",
    RudderRight => "RUDDER_RIGHT",
    RudderAxisMinus => "RUDDER_AXIS_MINUS",
    AileronSet => "AILERON_SET",
    AileronsLeft => "AILERONS_LEFT",
    AileronsRight => "AILERONS_RIGHT",
    CenterAilerRudder => "CENTER_AILER_RUDDER",
    ElevatorSet => "ELEVATOR_SET",
    ElevDown => "ELEV_DOWN",
    ElevUp => "ELEV_UP",
    ApMaster => "AP_MASTER",
    AutopilotOff => "AUTOPILOT_OFF",
    FcuAp1Push => "A32NX.FCU_AP_1_PUSH",
    FcuAp2Push => "A32NX.FCU_AP_2_PUSH",
    FcuHdgPush => "A32NX.FCU_HDG_PUSH",
    FcuHdgPull => "A32NX.FCU_HDG_PULL",
    FcuAltPush => "A32NX.FCU_ALT_PUSH",
    FcuAltPull => "A32NX.FCU_ALT_PULL",
    FcuVsPush => "A32NX.FCU_VS_PUSH",
    FcuVsPull => "A32NX.FCU_VS_PULL",
    FcuLocPush => "A32NX.FCU_LOC_PUSH",
    FcuApprPush => "A32NX.FCU_APPR_PUSH",
    AutoThrottleArm => "AUTO_THROTTLE_ARM",
    ThrottleMappingLoadFromFile => "A32NX.THROTTLE_MAPPING_LOAD_FROM_FILE",
    ThrottleMappingLoadFromLocalVariables => "A32NX.THROTTLE_MAPPING_LOAD_FROM_LOCAL_VARIABLES",
    ThrottleMappingSaveToFile => "A32NX.THROTTLE_MAPPING_SAVE_TO_FILE",
    ThrottleSet => "THROTTLE_SET",
    Throttle1Set => "THROTTLE1_SET",
    Throttle2Set => "THROTTLE2_SET",
    ThrottleAxisSetEx1 => "THROTTLE_AXIS_SET_EX1",
    Throttle1AxisSetEx1 => "THROTTLE1_AXIS_SET_EX1",
    Throttle2AxisSetEx1 => "THROTTLE2_AXIS_SET_EX1",
    ThrottleFull => "THROTTLE_FULL",
    ThrottleCut => "THROTTLE_CUT",
    ThrottleIncr => "THROTTLE_INCR",
    ThrottleDecr => "THROTTLE_DECR",
    ThrottleIncrSmall => "THROTTLE_INCR_SMALL",
    ThrottleDecrSmall => "THROTTLE_DECR_SMALL",
    Throttle10 => "THROTTLE_10",
    Throttle20 => "THROTTLE_20",
    Throttle30 => "THROTTLE_30",
    Throttle40 => "THROTTLE_40",
    Throttle50 => "THROTTLE_50",
    Throttle60 => "THROTTLE_60",
    Throttle70 => "THROTTLE_70",
    Throttle80 => "THROTTLE_80",
    Throttle90 => "THROTTLE_90",
    Throttle1Full => "THROTTLE1_FULL",
    Throttle1Cut => "THROTTLE1_CUT",
    Throttle1Incr => "THROTTLE1_INCR",
    Throttle1Decr => "THROTTLE1_DECR",
    Throttle1IncrSmall => "THROTTLE1_INCR_SMALL",
    Throttle1DecrSmall => "THROTTLE1_DECR_SMALL",
    Throttle2Full => "THROTTLE2_FULL",
    Throttle2Cut => "THROTTLE2_CUT",
    Throttle2Incr => "THROTTLE2_INCR",
    Throttle2Decr => "THROTTLE2_DECR",
    Throttle2IncrSmall => "THROTTLE2_INCR_SMALL",
    Throttle2DecrSmall => "THROTTLE2_DECR_SMALL",
    ThrottleReverseThrustToggle => "THROTTLE_REVERSE_THRUST_TOGGLE",
    ThrottleReverseThrustHold => "THROTTLE_REVERSE_THRUST_HOLD",
}

impl Event {
    pub fn id(self) -> EventId {
        EventId(self as u32)
    }

    /// Resolve an ID received from the host back to its event.
    pub fn from_id(id: EventId) -> Option<Event> {
        Self::ALL.get(id.0 as usize).copied()
    }

    /// `true` for events defined by the aircraft rather than the host's
    /// built-in set.
    pub fn is_custom(self) -> bool {
        self.sim_event_name().contains('.')
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sim_event_name())
    }
}
