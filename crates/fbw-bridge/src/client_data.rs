//! Client-data channel manager.
//!
//! Five fixed-layout areas carry state between cooperating modules that share
//! no memory.  Every area is mapped, created and defined on every connect; the
//! feature flags only decide which inbound areas this bridge subscribes to.
//!
//! | Channel | Direction | Read when |
//! |---|---|---|
//! | `AutopilotStateMachine` | inbound | `autopilot_state_machine` |
//! | `AutopilotLaws` | inbound | `autopilot_laws` |
//! | `Autothrust` | inbound | always |
//! | `LocalVariables` | outbound | never |
//! | `LocalVariablesAutothrust` | outbound | never |

use fbw_simconnect::{ClientDataPeriod, SimConnect};
use fbw_types::{
    BridgeError, ClientDataAutopilotLaws, ClientDataAutopilotStateMachine, ClientDataAutothrust,
    ClientDataDefinitionId, ClientDataId, ClientDataLocalVariables,
    ClientDataLocalVariablesAutothrust, ClientDataPayload, FeatureFlags, RequestId,
};
use tracing::{debug, warn};

/// Offset of client-data request IDs, keeping them clear of the
/// simulation-object request.
const REQUEST_BASE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    AutopilotStateMachine,
    AutopilotLaws,
    Autothrust,
    LocalVariables,
    LocalVariablesAutothrust,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Produced by another module, read here.
    Inbound,
    /// Produced here, read by another module.
    Outbound,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::AutopilotStateMachine,
        Channel::AutopilotLaws,
        Channel::Autothrust,
        Channel::LocalVariables,
        Channel::LocalVariablesAutothrust,
    ];

    pub fn id(self) -> ClientDataId {
        ClientDataId(self as u32)
    }

    pub fn definition(self) -> ClientDataDefinitionId {
        ClientDataDefinitionId(self as u32)
    }

    pub fn request(self) -> RequestId {
        RequestId(REQUEST_BASE + self as u32)
    }

    /// Resolve the channel a client-data message was defined under.
    pub fn from_definition(define: ClientDataDefinitionId) -> Option<Channel> {
        Self::ALL.get(define.0 as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::AutopilotStateMachine => ClientDataAutopilotStateMachine::CHANNEL_NAME,
            Channel::AutopilotLaws => ClientDataAutopilotLaws::CHANNEL_NAME,
            Channel::Autothrust => ClientDataAutothrust::CHANNEL_NAME,
            Channel::LocalVariables => ClientDataLocalVariables::CHANNEL_NAME,
            Channel::LocalVariablesAutothrust => ClientDataLocalVariablesAutothrust::CHANNEL_NAME,
        }
    }

    /// Payload size in bytes.
    pub fn size(self) -> usize {
        match self {
            Channel::AutopilotStateMachine => ClientDataAutopilotStateMachine::SIZE,
            Channel::AutopilotLaws => ClientDataAutopilotLaws::SIZE,
            Channel::Autothrust => ClientDataAutothrust::SIZE,
            Channel::LocalVariables => ClientDataLocalVariables::SIZE,
            Channel::LocalVariablesAutothrust => ClientDataLocalVariablesAutothrust::SIZE,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Channel::AutopilotStateMachine | Channel::AutopilotLaws | Channel::Autothrust => {
                Direction::Inbound
            }
            Channel::LocalVariables | Channel::LocalVariablesAutothrust => Direction::Outbound,
        }
    }

    /// Whether a session with `flags` reads this channel.
    pub fn is_read(self, flags: FeatureFlags) -> bool {
        match self {
            Channel::AutopilotStateMachine => flags.autopilot_state_machine,
            Channel::AutopilotLaws => flags.autopilot_laws,
            Channel::Autothrust => true,
            Channel::LocalVariables | Channel::LocalVariablesAutothrust => false,
        }
    }

    /// Channels a session with `flags` subscribes to.
    pub fn read_channels(flags: FeatureFlags) -> Vec<Channel> {
        Self::ALL.into_iter().filter(|c| c.is_read(flags)).collect()
    }
}

/// Map, create and define every channel, then subscribe to the inbound
/// channels `flags` enables.  Returns the subscribed channels.
///
/// # Errors
///
/// [`BridgeError::Registration`] on the first host rejection.
pub fn prepare_client_data_definitions<S: SimConnect + ?Sized>(
    host: &mut S,
    flags: FeatureFlags,
) -> Result<Vec<Channel>, BridgeError> {
    for channel in Channel::ALL {
        let rejected = |e| {
            warn!(channel = channel.name(), error = %e, "client data registration rejected");
            BridgeError::registration(format!("client data {}", channel.name()), e)
        };
        host.map_client_data_name_to_id(channel.name(), channel.id())
            .map_err(rejected)?;
        host.create_client_data(channel.id(), channel.size(), false)
            .map_err(rejected)?;
        host.add_to_client_data_definition(channel.definition(), 0, channel.size())
            .map_err(rejected)?;
        if channel.is_read(flags) {
            host.request_client_data(
                channel.id(),
                channel.request(),
                channel.definition(),
                ClientDataPeriod::OnSet,
            )
            .map_err(rejected)?;
        }
        debug!(
            channel = channel.name(),
            id = %channel.id(),
            size = channel.size(),
            subscribed = channel.is_read(flags),
            "client data channel registered"
        );
    }
    Ok(Channel::read_channels(flags))
}

/// Write `payload` to `channel` whole.
///
/// # Errors
///
/// [`BridgeError::Transport`] when the host rejects the write.
pub fn set_client_data<S: SimConnect + ?Sized, P: ClientDataPayload>(
    host: &mut S,
    channel: Channel,
    payload: &P,
) -> Result<(), BridgeError> {
    host.set_client_data(channel.id(), channel.definition(), &payload.to_bytes())
        .map_err(|e| {
            warn!(channel = channel.name(), error = %e, "client data write failed");
            BridgeError::transport("set_client_data", e)
        })
}
