//! `fbw-bridge` – The Host Bridge
//!
//! The only path by which simulation state reaches the flight-control laws and
//! by which their commands reach the host.
//!
//! # Modules
//!
//! - [`definitions`] – [`DefinitionRegistry`][definitions::DefinitionRegistry]:
//!   declares the inbound state record and the outbound command records field
//!   by field, in binary-offset order.
//! - [`events`] – decides which semantic events a session subscribes to,
//!   declares them, and folds received notifications into the edge-triggered
//!   input mirrors.
//! - [`client_data`] – the five fixed-layout cross-module channels:
//!   registration, subscription and whole-payload writes.
//! - [`mirror`] – [`MirroredState`] and its pure classify-and-merge step,
//!   testable without a host.
//! - [`throttle`] – the [`ThrottleAxisMapping`] collaborator interface and a
//!   linear [`DirectThrottleAxis`][throttle::DirectThrottleAxis].
//! - [`session`] – [`SimConnectInterface`]: connect/disconnect and the
//!   per-cycle request, read and send protocol.
//!
//! # Edge-triggered inputs
//!
//! Discrete pilot actions accumulate in the `SimInput*` mirrors until the
//! consumer calls
//! [`reset_sim_input_autopilot`][SimConnectInterface::reset_sim_input_autopilot]
//! or [`reset_sim_input_throttles`][SimConnectInterface::reset_sim_input_throttles].
//! A consumer that skips the reset applies the same command again next cycle.

pub mod client_data;
pub mod definitions;
pub mod events;
pub mod mirror;
pub mod session;
pub mod throttle;

pub use client_data::Channel;
pub use mirror::{Merge, MirroredState};
pub use session::{Registration, SimConnectInterface};
pub use throttle::{DirectThrottleAxis, SharedThrottleAxis, ThrottleAxisMapping};
