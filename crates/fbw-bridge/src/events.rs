//! Event registry and dispatcher.
//!
//! [`bindings_for`] decides which semantic events a session subscribes to,
//! [`add_input_data_definition`] declares one of them to the host, and
//! [`apply_event`] folds a received notification into the input mirrors.
//!
//! | Event family | Mirror effect |
//! |---|---|
//! | axis `*_SET` | `SimInput.inputs[axis] = v / 16384` (aileron, rudder inverted) |
//! | axis nudges | ±0.02, clamped to ±1 |
//! | `AP_MASTER`, `AUTOPILOT_OFF`, FCU push/pull | matching `SimInputAutopilot` flag set to 1 |
//! | `AUTO_THROTTLE_ARM` | `athr_push` set to 1 |
//! | throttle `INCR`/`DECR` | `increments[i]` ±1, `_SMALL` ±0.25 |
//! | other throttle events | forwarded to the addressed mapping(s) only |

use std::collections::BTreeSet;

use fbw_simconnect::{SimConnect, priority};
use fbw_types::{
    BridgeError, Event, EventId, FeatureFlags, GroupId, SimInput, SimInputAutopilot,
    SimInputThrottles,
    input::{AXIS_AILERON, AXIS_ELEVATOR, AXIS_RUDDER, THROTTLE_AXIS_COUNT},
};
use tracing::{debug, trace, warn};

use crate::throttle::{SharedThrottleAxis, ThrottleAxisMapping};

const AXIS_RANGE: f64 = 16384.0;
const NUDGE: f64 = 0.02;
const INCREMENT: f64 = 1.0;
const INCREMENT_SMALL: f64 = 0.25;

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Notification group an event is subscribed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputGroup {
    FlightControls,
    Autopilot,
    Throttles,
}

impl InputGroup {
    pub fn id(self) -> GroupId {
        GroupId(self as u32)
    }
}

/// One event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBinding {
    pub event: Event,
    pub group: InputGroup,
    /// Suppress the host's own handling.
    pub masked: bool,
}

const FLIGHT_CONTROL_EVENTS: &[Event] = &[
    Event::AxisElevatorSet,
    Event::AxisAileronsSet,
    Event::AxisRudderSet,
    Event::RudderSet,
    Event::RudderLeft,
    Event::RudderAxisPlus,
    Event::RudderCenter,
    Event::RudderRight,
    Event::RudderAxisMinus,
    Event::AileronSet,
    Event::AileronsLeft,
    Event::AileronsRight,
    Event::CenterAilerRudder,
    Event::ElevatorSet,
    Event::ElevDown,
    Event::ElevUp,
];

const FCU_EVENTS: &[Event] = &[
    Event::FcuAp1Push,
    Event::FcuAp2Push,
    Event::FcuHdgPush,
    Event::FcuHdgPull,
    Event::FcuAltPush,
    Event::FcuAltPull,
    Event::FcuVsPush,
    Event::FcuVsPull,
    Event::FcuLocPush,
    Event::FcuApprPush,
];

const MAPPING_EVENTS: &[Event] = &[
    Event::ThrottleMappingLoadFromFile,
    Event::ThrottleMappingLoadFromLocalVariables,
    Event::ThrottleMappingSaveToFile,
];

/// Which mappings a throttle event addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    All,
    Engine(usize),
}

impl Target {
    /// Lowest number of mappings a session must carry for the event to be
    /// registered.
    fn required_axes(self) -> usize {
        match self {
            Target::All => 1,
            Target::Engine(index) => index + 1,
        }
    }

    fn indices(self, axis_count: usize) -> std::ops::Range<usize> {
        let count = axis_count.min(THROTTLE_AXIS_COUNT);
        match self {
            Target::All => 0..count,
            Target::Engine(index) if index < count => index..index + 1,
            Target::Engine(_) => 0..0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ThrottleAction {
    Set,
    AxisSetEx1,
    Full,
    Cut,
    Step(f64),
    Percent(u8),
    ReverseToggle,
    ReverseHold,
}

fn throttle_action(event: Event) -> Option<(Target, ThrottleAction)> {
    use Event::*;
    use ThrottleAction::*;
    let all = Target::All;
    let one = Target::Engine(0);
    let two = Target::Engine(1);
    Some(match event {
        ThrottleSet => (all, Set),
        Throttle1Set => (one, Set),
        Throttle2Set => (two, Set),
        ThrottleAxisSetEx1 => (all, AxisSetEx1),
        Throttle1AxisSetEx1 => (one, AxisSetEx1),
        Throttle2AxisSetEx1 => (two, AxisSetEx1),
        ThrottleFull => (all, Full),
        ThrottleCut => (all, Cut),
        ThrottleIncr => (all, Step(INCREMENT)),
        ThrottleDecr => (all, Step(-INCREMENT)),
        ThrottleIncrSmall => (all, Step(INCREMENT_SMALL)),
        ThrottleDecrSmall => (all, Step(-INCREMENT_SMALL)),
        Throttle10 => (all, Percent(10)),
        Throttle20 => (all, Percent(20)),
        Throttle30 => (all, Percent(30)),
        Throttle40 => (all, Percent(40)),
        Throttle50 => (all, Percent(50)),
        Throttle60 => (all, Percent(60)),
        Throttle70 => (all, Percent(70)),
        Throttle80 => (all, Percent(80)),
        Throttle90 => (all, Percent(90)),
        Throttle1Full => (one, Full),
        Throttle1Cut => (one, Cut),
        Throttle1Incr => (one, Step(INCREMENT)),
        Throttle1Decr => (one, Step(-INCREMENT)),
        Throttle1IncrSmall => (one, Step(INCREMENT_SMALL)),
        Throttle1DecrSmall => (one, Step(-INCREMENT_SMALL)),
        Throttle2Full => (two, Full),
        Throttle2Cut => (two, Cut),
        Throttle2Incr => (two, Step(INCREMENT)),
        Throttle2Decr => (two, Step(-INCREMENT)),
        Throttle2IncrSmall => (two, Step(INCREMENT_SMALL)),
        Throttle2DecrSmall => (two, Step(-INCREMENT_SMALL)),
        ThrottleReverseThrustToggle => (all, ReverseToggle),
        ThrottleReverseThrustHold => (all, ReverseHold),
        _ => return None,
    })
}

/// Every event a session with `flags` and `axis_count` throttle mappings
/// subscribes to, in registration order.
pub fn bindings_for(flags: FeatureFlags, axis_count: usize) -> Vec<EventBinding> {
    let mut bindings = Vec::new();
    let mut bind = |event, group, masked| {
        bindings.push(EventBinding {
            event,
            group,
            masked,
        })
    };

    if flags.fly_by_wire {
        for &event in FLIGHT_CONTROL_EVENTS {
            bind(event, InputGroup::FlightControls, true);
        }
    }

    if flags.autopilot_state_machine {
        bind(Event::ApMaster, InputGroup::Autopilot, true);
        bind(Event::AutopilotOff, InputGroup::Autopilot, true);
        for &event in FCU_EVENTS {
            bind(event, InputGroup::Autopilot, false);
        }
    }

    bind(Event::AutoThrottleArm, InputGroup::Throttles, true);

    if axis_count > 0 {
        for &event in MAPPING_EVENTS {
            bind(event, InputGroup::Throttles, false);
        }
    }
    for &event in Event::ALL {
        if let Some((target, _)) = throttle_action(event)
            && target.required_axes() <= axis_count
        {
            bind(event, InputGroup::Throttles, true);
        }
    }

    bindings
}

/// Map `event_id` to the host trigger `name` and subscribe it through `group`.
///
/// # Errors
///
/// [`BridgeError::Registration`] when the host rejects the trigger name or the
/// subscription.
pub fn add_input_data_definition<S: SimConnect + ?Sized>(
    host: &mut S,
    group: GroupId,
    event_id: EventId,
    name: &str,
    mask: bool,
) -> Result<(), BridgeError> {
    host.map_client_event_to_sim_event(event_id, name)
        .and_then(|()| host.add_client_event_to_notification_group(group, event_id, mask))
        .map_err(|e| {
            warn!(event = name, %group, error = %e, "event registration rejected");
            BridgeError::registration(format!("event {name}"), e)
        })?;
    debug!(event = name, id = %event_id, %group, mask, "event registered");
    Ok(())
}

/// Register every binding for the session and raise the priority of each
/// group used.  Returns the set of subscribed events.
///
/// # Errors
///
/// [`BridgeError::Registration`] on the first rejected event or priority.
pub fn prepare_sim_input_definitions<S: SimConnect + ?Sized>(
    host: &mut S,
    flags: FeatureFlags,
    axis_count: usize,
) -> Result<BTreeSet<Event>, BridgeError> {
    let bindings = bindings_for(flags, axis_count);
    let mut groups = BTreeSet::new();
    for binding in &bindings {
        add_input_data_definition(
            host,
            binding.group.id(),
            binding.event.id(),
            binding.event.sim_event_name(),
            binding.masked,
        )?;
        groups.insert(binding.group);
    }
    for group in groups {
        host.set_notification_group_priority(group.id(), priority::HIGHEST_MASKABLE)
            .map_err(|e| BridgeError::registration(format!("priority of {}", group.id()), e))?;
    }
    Ok(bindings.into_iter().map(|b| b.event).collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Mutable view of the input mirrors an event may touch.
pub struct InputMirrors<'a> {
    pub sim_input: &'a mut SimInput,
    pub autopilot: &'a mut SimInputAutopilot,
    pub throttles: &'a mut SimInputThrottles,
}

fn set_axis(inputs: &mut [f64; 3], axis: usize, raw: u32, inverted: bool) {
    let value = f64::from(raw as i32) / AXIS_RANGE;
    inputs[axis] = if inverted { -value } else { value };
}

fn nudge_axis(inputs: &mut [f64; 3], axis: usize, delta: f64) {
    inputs[axis] = (inputs[axis] + delta).clamp(-1.0, 1.0);
}

/// Apply one event notification carrying `data`.
pub fn apply_event(
    event: Event,
    data: u32,
    mirrors: InputMirrors<'_>,
    throttle_axes: &[SharedThrottleAxis],
) {
    let inputs = &mut mirrors.sim_input.inputs;
    let ap = mirrors.autopilot;
    match event {
        Event::AxisElevatorSet | Event::ElevatorSet => set_axis(inputs, AXIS_ELEVATOR, data, false),
        Event::AxisAileronsSet | Event::AileronSet => set_axis(inputs, AXIS_AILERON, data, true),
        Event::AxisRudderSet | Event::RudderSet => set_axis(inputs, AXIS_RUDDER, data, true),
        Event::RudderLeft | Event::RudderAxisMinus => nudge_axis(inputs, AXIS_RUDDER, NUDGE),
        Event::RudderRight | Event::RudderAxisPlus => nudge_axis(inputs, AXIS_RUDDER, -NUDGE),
        Event::RudderCenter => inputs[AXIS_RUDDER] = 0.0,
        Event::AileronsLeft => nudge_axis(inputs, AXIS_AILERON, NUDGE),
        Event::AileronsRight => nudge_axis(inputs, AXIS_AILERON, -NUDGE),
        Event::CenterAilerRudder => {
            inputs[AXIS_AILERON] = 0.0;
            inputs[AXIS_RUDDER] = 0.0;
        }
        Event::ElevDown => nudge_axis(inputs, AXIS_ELEVATOR, NUDGE),
        Event::ElevUp => nudge_axis(inputs, AXIS_ELEVATOR, -NUDGE),

        Event::ApMaster => ap.ap_engage = 1.0,
        Event::AutopilotOff => ap.ap_disconnect = 1.0,
        Event::FcuAp1Push => ap.ap_1_push = 1.0,
        Event::FcuAp2Push => ap.ap_2_push = 1.0,
        Event::FcuHdgPush => ap.hdg_push = 1.0,
        Event::FcuHdgPull => ap.hdg_pull = 1.0,
        Event::FcuAltPush => ap.alt_push = 1.0,
        Event::FcuAltPull => ap.alt_pull = 1.0,
        Event::FcuVsPush => ap.vs_push = 1.0,
        Event::FcuVsPull => ap.vs_pull = 1.0,
        Event::FcuLocPush => ap.loc_push = 1.0,
        Event::FcuApprPush => ap.appr_push = 1.0,

        Event::AutoThrottleArm => mirrors.throttles.athr_push = 1.0,

        Event::ThrottleMappingLoadFromFile => {
            for_each_mapping(throttle_axes, event, |m| m.load_from_file())
        }
        Event::ThrottleMappingLoadFromLocalVariables => {
            for_each_mapping(throttle_axes, event, |m| m.load_from_local_variables())
        }
        Event::ThrottleMappingSaveToFile => {
            for_each_mapping(throttle_axes, event, |m| m.save_to_file())
        }

        _ => match throttle_action(event) {
            Some((target, action)) => {
                apply_throttle(target, action, data, mirrors.throttles, throttle_axes)
            }
            None => trace!(%event, "event has no mirror"),
        },
    }
}

fn apply_throttle(
    target: Target,
    action: ThrottleAction,
    data: u32,
    throttles: &mut SimInputThrottles,
    throttle_axes: &[SharedThrottleAxis],
) {
    let raw = i64::from(data as i32);
    for index in target.indices(throttle_axes.len()) {
        let mut mapping = throttle_axes[index].borrow_mut();
        match action {
            ThrottleAction::Set => mapping.on_event_throttle_set(raw),
            ThrottleAction::AxisSetEx1 => mapping.on_event_throttle_axis_set_ex1(raw),
            ThrottleAction::Full => mapping.on_event_throttle_full(),
            ThrottleAction::Cut => mapping.on_event_throttle_cut(),
            ThrottleAction::Step(step) => {
                throttles.increments[index] += step;
                match step {
                    s if s == INCREMENT => mapping.on_event_throttle_increase(),
                    s if s == -INCREMENT => mapping.on_event_throttle_decrease(),
                    s if s > 0.0 => mapping.on_event_throttle_increase_small(),
                    _ => mapping.on_event_throttle_decrease_small(),
                }
            }
            ThrottleAction::Percent(percent) => mapping.on_event_throttle_set_percent(percent),
            ThrottleAction::ReverseToggle => mapping.on_event_reverse_toggle(),
            ThrottleAction::ReverseHold => mapping.on_event_reverse_hold(data != 0),
        }
    }
}

fn for_each_mapping(
    throttle_axes: &[SharedThrottleAxis],
    event: Event,
    mut op: impl FnMut(&mut dyn ThrottleAxisMapping) -> Result<(), BridgeError>,
) {
    for (index, mapping) in throttle_axes.iter().enumerate() {
        if let Err(e) = op(&mut *mapping.borrow_mut()) {
            warn!(%event, axis = index, error = %e, "throttle mapping operation failed");
        }
    }
}
