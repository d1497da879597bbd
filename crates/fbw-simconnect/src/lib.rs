//! `fbw-simconnect` – The Host Boundary
//!
//! Everything the bridge knows about the flight-simulation host: the calls it
//! makes, the messages it receives, and an in-process host for tests.
//!
//! # Modules
//!
//! - [`connection`] – the [`SimConnect`] session trait, the [`Connector`]
//!   factory that opens sessions, and the [`Session`] RAII guard that closes
//!   a session exactly once on every exit path.
//! - [`recv`] – [`Recv`]: the closed vocabulary of inbound messages, with an
//!   `Unknown` catch-all the bridge ignores.
//! - [`exception`] – [`Exception`] codes and
//!   [`exception_string`][exception::exception_string] for log output.
//! - [`sim`] – [`SimHost`]: an in-process host that validates registrations
//!   against the simulation-variable vocabulary, records all traffic, and lets
//!   tests inject events, data blocks and shutdowns.  Used in CI where no
//!   simulator is available.

pub mod connection;
pub mod exception;
pub mod recv;
pub mod sim;

pub use connection::{
    ClientDataPeriod, Connector, DataRequestFlags, HostError, ObjectId, Period, Session,
    SimConnect, priority,
};
pub use exception::{Exception, exception_string};
pub use recv::Recv;
pub use sim::{ClientDataRequest, RegisteredField, SimHost, SimHostSession, SimObjectRequest};

// Re-exported so host implementations need no direct dependency on fbw-types
// for the datatype tag.
pub use fbw_types::DataType;
