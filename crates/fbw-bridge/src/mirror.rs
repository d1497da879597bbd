//! Mirrored state and the classify-and-merge step.
//!
//! [`MirroredState`] is the bridge's local copy of everything read from the
//! host.  [`MirroredState::merge`] folds exactly one inbound message into it
//! and needs no live host, so dispatch is tested by feeding it synthetic
//! [`Recv`] values.

use std::collections::BTreeSet;

use fbw_simconnect::{Recv, exception_string};
use fbw_types::{
    ClientDataAutopilotLaws, ClientDataAutopilotStateMachine, ClientDataAutothrust,
    ClientDataPayload, Event, FeatureFlags, Record, SimData, SimInput, SimInputAutopilot,
    SimInputThrottles, input::THROTTLE_AXIS_COUNT,
};
use serde::Serialize;
use tracing::{trace, warn};

use crate::client_data::Channel;
use crate::definitions::SIM_DATA;
use crate::events::{InputMirrors, apply_event};
use crate::throttle::SharedThrottleAxis;

/// Last-known host and cross-module state.  Consumers receive copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MirroredState {
    pub sim_data: SimData,
    pub sim_input: SimInput,
    pub sim_input_autopilot: SimInputAutopilot,
    pub sim_input_throttles: SimInputThrottles,
    pub client_data_autopilot_state_machine: ClientDataAutopilotStateMachine,
    pub client_data_autopilot_laws: ClientDataAutopilotLaws,
    pub client_data_autothrust: ClientDataAutothrust,
}

/// What the session registered, as far as dispatch cares.
#[derive(Clone, Copy)]
pub struct DispatchContext<'a> {
    pub flags: FeatureFlags,
    pub events: &'a BTreeSet<Event>,
    pub throttle_axes: &'a [SharedThrottleAxis],
}

/// Result of merging one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// A mirror changed (or was rewritten with equal values).
    Applied,
    /// Nothing to do for this message.
    Ignored,
    /// The message was addressed to a mirror but its payload did not fit.
    Rejected,
    /// The host is shutting down.
    Quit,
}

impl MirroredState {
    /// Fold one inbound message into the mirrors.
    pub fn merge(&mut self, message: &Recv, ctx: DispatchContext<'_>) -> Merge {
        trace!(kind = message.kind(), "dispatch");
        match message {
            Recv::Quit => Merge::Quit,
            Recv::Exception {
                exception,
                send_id,
                index,
            } => {
                warn!(
                    exception = exception_string(*exception),
                    send_id, index, "host exception"
                );
                Merge::Ignored
            }
            Recv::Event { event, data, .. } => match Event::from_id(*event) {
                Some(event) if ctx.events.contains(&event) => {
                    apply_event(
                        event,
                        *data,
                        InputMirrors {
                            sim_input: &mut self.sim_input,
                            autopilot: &mut self.sim_input_autopilot,
                            throttles: &mut self.sim_input_throttles,
                        },
                        ctx.throttle_axes,
                    );
                    Merge::Applied
                }
                _ => {
                    trace!(id = %event, "event not subscribed in this session");
                    Merge::Ignored
                }
            },
            Recv::SimObjectData {
                define,
                flags,
                data,
                ..
            } if *define == SIM_DATA => {
                let merged = if flags.tagged {
                    self.sim_data.merge_tagged(data).map(|_| ())
                } else {
                    self.sim_data.merge_untagged(data)
                };
                match merged {
                    Ok(()) => Merge::Applied,
                    Err(e) => {
                        warn!(error = %e, tagged = flags.tagged, "simulation data block rejected");
                        Merge::Rejected
                    }
                }
            }
            Recv::ClientData { define, data, .. } => match Channel::from_definition(*define) {
                Some(channel) if channel.is_read(ctx.flags) => self.merge_client_data(channel, data),
                _ => {
                    trace!(define = %define, "client data not read in this session");
                    Merge::Ignored
                }
            },
            Recv::SimObjectData { define, .. } => {
                trace!(define = %define, "simulation data for unread definition");
                Merge::Ignored
            }
            Recv::Null | Recv::Open { .. } | Recv::Unknown { .. } => Merge::Ignored,
        }
    }

    fn merge_client_data(&mut self, channel: Channel, data: &[u8]) -> Merge {
        let decoded = match channel {
            Channel::AutopilotStateMachine => ClientDataAutopilotStateMachine::from_bytes(data)
                .map(|p| self.client_data_autopilot_state_machine = p),
            Channel::AutopilotLaws => ClientDataAutopilotLaws::from_bytes(data)
                .map(|p| self.client_data_autopilot_laws = p),
            Channel::Autothrust => {
                ClientDataAutothrust::from_bytes(data).map(|p| self.client_data_autothrust = p)
            }
            Channel::LocalVariables | Channel::LocalVariablesAutothrust => return Merge::Ignored,
        };
        match decoded {
            Ok(()) => Merge::Applied,
            Err(e) => {
                warn!(channel = channel.name(), error = %e, "client data block rejected");
                Merge::Rejected
            }
        }
    }

    /// Copy each mapping's lever and reverse state into the throttle mirror.
    pub fn refresh_throttle_levels(&mut self, throttle_axes: &[SharedThrottleAxis]) {
        for (index, mapping) in throttle_axes.iter().take(THROTTLE_AXIS_COUNT).enumerate() {
            let mapping = mapping.borrow();
            self.sim_input_throttles.throttles[index] = mapping.value();
            self.sim_input_throttles.reverse[index] = if mapping.is_reverse() { 1.0 } else { 0.0 };
        }
    }
}
