//! `fbw-types` – shared vocabulary of the fly-by-wire host bridge.
//!
//! # Modules
//!
//! - [`ids`] – independent numeric namespaces (definition, event, client-data,
//!   request and notification-group IDs) as distinct newtypes.
//! - [`record`] – [`DataType`], [`FieldSpec`] and the [`Record`] trait that
//!   turns a Rust struct into a fixed-layout host record.
//! - [`sim`] – the inbound [`SimData`] record and the outbound `SimOutput*`
//!   command records.
//! - [`input`] – the edge-triggered `SimInput*` mirrors populated by event
//!   dispatch.
//! - [`client`] – fixed-layout cross-module client-data payloads.
//! - [`event`] – the closed [`Event`] enumeration of semantic commands.

pub mod client;
pub mod event;
pub mod ids;
pub mod input;
pub mod record;
pub mod sim;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{
    ClientDataAutopilotLaws, ClientDataAutopilotStateMachine, ClientDataAutothrust,
    ClientDataLocalVariables, ClientDataLocalVariablesAutothrust, ClientDataPayload,
};
pub use event::Event;
pub use ids::{ClientDataDefinitionId, ClientDataId, DefinitionId, EventId, GroupId, RequestId};
pub use input::{SimInput, SimInputAutopilot, SimInputThrottles};
pub use record::{DataType, Datum, FieldSpec, LatLonAlt, Record, Xyz};
pub use sim::{SimData, SimOutput, SimOutputEtaTrim, SimOutputThrottles, SimOutputZetaTrim};

/// Feature switches supplied to `connect`.  They decide which optional
/// definitions, events and inbound channels are registered for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// The autopilot state machine runs in this module; its FCU events are
    /// subscribed and its client-data channel is read.
    pub autopilot_state_machine: bool,
    /// The autopilot laws run in this module; their channel is read.
    pub autopilot_laws: bool,
    /// Fly-by-wire is active; flight-control axis events are masked and
    /// routed into the [`SimInput`] mirror.
    pub fly_by_wire: bool,
}

impl FeatureFlags {
    /// Every feature enabled.
    pub const ALL: Self = Self {
        autopilot_state_machine: true,
        autopilot_laws: true,
        fly_by_wire: true,
    };

    /// Every feature disabled.
    pub const NONE: Self = Self {
        autopilot_state_machine: false,
        autopilot_laws: false,
        fly_by_wire: false,
    };
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// Error type shared by every bridge crate.
///
/// Unrecognised inbound messages are not errors and never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// A definition, event or channel could not be declared.  Fatal to
    /// `connect`.
    #[error("Registration of {what} failed: {details}")]
    Registration { what: String, details: String },

    /// A read or write call failed at the host boundary.  The session stays
    /// open; the cycle's data should be treated as stale.
    #[error("Transport failure in {call}: {details}")]
    Transport { call: &'static str, details: String },

    #[error("No host session is open")]
    NotConnected,

    /// The host announced it is shutting down.  The session has been released.
    #[error("Host closed the session")]
    HostQuit,

    /// The operation addresses something not registered in this session.
    #[error("{what} is not registered in this session")]
    Unregistered { what: String },

    /// A binary payload does not match the registered layout.
    #[error("Layout mismatch for {record}: expected {expected} bytes, got {actual}")]
    Layout {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Throttle axis mapping error: {0}")]
    ThrottleMapping(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn registration(what: impl Into<String>, details: impl ToString) -> Self {
        Self::Registration {
            what: what.into(),
            details: details.to_string(),
        }
    }

    pub fn transport(call: &'static str, details: impl ToString) -> Self {
        Self::Transport {
            call,
            details: details.to_string(),
        }
    }
}
