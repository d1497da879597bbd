//! The host API as seen by the bridge.
//!
//! [`SimConnect`] has one method per host call the bridge makes.  A
//! [`Connector`] opens sessions; the bridge wraps each one in a [`Session`]
//! guard so the handle is released on every exit path, including early
//! returns during a failed `connect`.

use std::ops::{Deref, DerefMut};

use fbw_types::{
    ClientDataDefinitionId, ClientDataId, DataType, DefinitionId, EventId, GroupId, RequestId,
};
use thiserror::Error;
use tracing::warn;

use crate::recv::Recv;

// ─────────────────────────────────────────────────────────────────────────────
// Host constants
// ─────────────────────────────────────────────────────────────────────────────

/// Object the bridge reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The user's own aircraft.
    pub const USER: ObjectId = ObjectId(0);
}

/// Notification-group priorities, lowest value first served.
pub mod priority {
    pub const HIGHEST: u32 = 1;
    pub const HIGHEST_MASKABLE: u32 = 10_000_000;
    pub const STANDARD: u32 = 1_900_000_000;
    pub const DEFAULT: u32 = 2_000_000_000;
    pub const LOWEST: u32 = 4_000_000_000;
}

/// How often a simulation-object request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Never,
    Once,
    VisualFrame,
    SimFrame,
    Second,
}

/// How often a client-data request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientDataPeriod {
    Never,
    Once,
    VisualFrame,
    /// Whenever any writer sets the area.
    OnSet,
    Second,
}

/// Shape of the data block in a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataRequestFlags {
    /// Only send when a value changed.
    pub changed: bool,
    /// Send `(datum index, value)` pairs instead of the full record.
    pub tagged: bool,
}

impl DataRequestFlags {
    pub const DEFAULT: Self = Self {
        changed: false,
        tagged: false,
    };
    pub const CHANGED_TAGGED: Self = Self {
        changed: true,
        tagged: true,
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// A host call did not return success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{call} failed: {reason}")]
pub struct HostError {
    pub call: &'static str,
    pub reason: String,
}

impl HostError {
    pub fn new(call: &'static str, reason: impl Into<String>) -> Self {
        Self {
            call,
            reason: reason.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Host traits
// ─────────────────────────────────────────────────────────────────────────────

/// One open host session.
///
/// Every call is synchronous and non-blocking: requests are queued on the
/// host side and answered later through [`SimConnect::next_dispatch`].
pub trait SimConnect {
    /// Release the session.  Calls after `close` fail.
    fn close(&mut self) -> Result<(), HostError>;

    /// Append one field to a simulation-object definition.  `unit` is `None`
    /// for composite datatypes.
    fn add_to_data_definition(
        &mut self,
        define: DefinitionId,
        name: &str,
        unit: Option<&str>,
        data_type: DataType,
        datum: u32,
    ) -> Result<(), HostError>;

    fn map_client_event_to_sim_event(&mut self, event: EventId, name: &str)
    -> Result<(), HostError>;

    /// Subscribe `event` through `group`.  A masked event is consumed by this
    /// client and the host's built-in handling is suppressed.
    fn add_client_event_to_notification_group(
        &mut self,
        group: GroupId,
        event: EventId,
        masked: bool,
    ) -> Result<(), HostError>;

    fn set_notification_group_priority(
        &mut self,
        group: GroupId,
        priority: u32,
    ) -> Result<(), HostError>;

    fn request_data_on_sim_object(
        &mut self,
        request: RequestId,
        define: DefinitionId,
        object: ObjectId,
        period: Period,
        flags: DataRequestFlags,
    ) -> Result<(), HostError>;

    fn set_data_on_sim_object(
        &mut self,
        define: DefinitionId,
        object: ObjectId,
        data: &[u8],
    ) -> Result<(), HostError>;

    /// Send a discrete command.  No acknowledgment is ever returned.
    fn transmit_client_event(
        &mut self,
        object: ObjectId,
        event: EventId,
        data: u32,
        priority: u32,
    ) -> Result<(), HostError>;

    fn map_client_data_name_to_id(&mut self, name: &str, id: ClientDataId)
    -> Result<(), HostError>;

    fn create_client_data(
        &mut self,
        id: ClientDataId,
        size: usize,
        read_only: bool,
    ) -> Result<(), HostError>;

    fn add_to_client_data_definition(
        &mut self,
        define: ClientDataDefinitionId,
        offset: usize,
        size: usize,
    ) -> Result<(), HostError>;

    fn request_client_data(
        &mut self,
        id: ClientDataId,
        request: RequestId,
        define: ClientDataDefinitionId,
        period: ClientDataPeriod,
    ) -> Result<(), HostError>;

    fn set_client_data(
        &mut self,
        id: ClientDataId,
        define: ClientDataDefinitionId,
        data: &[u8],
    ) -> Result<(), HostError>;

    /// Pop the next inbound message, or `Ok(None)` when nothing is pending.
    fn next_dispatch(&mut self) -> Result<Option<Recv>, HostError>;
}

/// Opens host sessions.
pub trait Connector {
    type Session: SimConnect;

    /// Open a session announcing the client as `client_name`.
    fn open(&mut self, client_name: &str) -> Result<Self::Session, HostError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// RAII session guard
// ─────────────────────────────────────────────────────────────────────────────

/// Owns an open session and closes it exactly once, on [`Session::close`] or
/// on drop.
pub struct Session<S: SimConnect> {
    inner: S,
    closed: bool,
}

impl<S: SimConnect> Session<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Close the session now.  Further calls are no-ops.
    pub fn close(&mut self) -> Result<(), HostError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close()
    }
}

impl<S: SimConnect> Deref for Session<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S: SimConnect> DerefMut for Session<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: SimConnect> Drop for Session<S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "host session close failed");
        }
    }
}
