//! Inbound messages from the host.
//!
//! The host multiplexes everything on one stream; [`Recv`] is that stream's
//! closed message vocabulary plus an [`Recv::Unknown`] catch-all for message
//! kinds the bridge does not handle.

use fbw_types::{ClientDataDefinitionId, DefinitionId, EventId, GroupId, RequestId};

use crate::connection::{DataRequestFlags, ObjectId};

#[derive(Debug, Clone, PartialEq)]
pub enum Recv {
    /// Nothing of interest; a keep-alive.
    Null,
    /// The session was accepted.
    Open { application_name: String },
    /// The host is shutting down.
    Quit,
    /// A previous call was rejected asynchronously.
    Exception {
        exception: u32,
        send_id: u32,
        index: u32,
    },
    /// A subscribed event fired.
    Event {
        group: GroupId,
        event: EventId,
        data: u32,
    },
    /// A response to a simulation-object request.
    SimObjectData {
        request: RequestId,
        define: DefinitionId,
        object: ObjectId,
        flags: DataRequestFlags,
        data: Vec<u8>,
    },
    /// A response to a client-data request.
    ClientData {
        request: RequestId,
        define: ClientDataDefinitionId,
        data: Vec<u8>,
    },
    /// Any message kind not listed above, identified by its raw ID.
    Unknown { id: u32 },
}

impl Recv {
    /// Short label used in trace logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Recv::Null => "null",
            Recv::Open { .. } => "open",
            Recv::Quit => "quit",
            Recv::Exception { .. } => "exception",
            Recv::Event { .. } => "event",
            Recv::SimObjectData { .. } => "simobject_data",
            Recv::ClientData { .. } => "client_data",
            Recv::Unknown { .. } => "unknown",
        }
    }
}
