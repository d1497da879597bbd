//! [`CycleRunner`] – reference driver for the per-cycle protocol.
//!
//! Each call to [`CycleRunner::run_cycle`] performs one simulation tick:
//!
//! 1. **Request** – ask for a state snapshot and the subscribed client-data
//!    channels.
//! 2. **Read** – drain the inbound stream into the mirrors.
//! 3. **Step** – hand a copy of the mirrors to the [`ControlLaw`].
//! 4. **Send** – forward the law's commands, events and channel payloads.
//! 5. **Reset** – acknowledge the edge-triggered inputs the law just applied.
//!
//! A failure in any step ends the cycle early and is returned to the caller,
//! which decides whether to retry next tick or reconnect.  The edge mirrors
//! are reset as soon as the law has seen them, even when sending its outputs
//! then fails; a failed read leaves them for the next cycle.
//!
//! # Example
//!
//! ```rust,no_run
//! use fbw_bridge::MirroredState;
//! use fbw_runtime::config::BridgeConfig;
//! use fbw_runtime::cycle::{ControlLaw, CycleOutputs, CycleRunner};
//! use fbw_simconnect::SimHost;
//!
//! struct Hold;
//!
//! impl ControlLaw for Hold {
//!     fn step(&mut self, _state: &MirroredState) -> CycleOutputs {
//!         CycleOutputs::default()
//!     }
//! }
//!
//! let mut runner = CycleRunner::new(SimHost::new(), BridgeConfig::default());
//! runner.connect().expect("connect");
//! let stats = runner.run_cycle(&mut Hold).expect("cycle");
//! assert_eq!(stats.cycle, 1);
//! ```

use fbw_bridge::{
    DirectThrottleAxis, MirroredState, SharedThrottleAxis, SimConnectInterface, throttle::shared,
};
use fbw_simconnect::Connector;
use fbw_types::{
    BridgeError, ClientDataAutopilotLaws, ClientDataAutopilotStateMachine,
    ClientDataLocalVariables, ClientDataLocalVariablesAutothrust, Event, SimOutput,
    SimOutputEtaTrim, SimOutputThrottles, SimOutputZetaTrim,
};
use tracing::{debug, warn};

use crate::config::BridgeConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Consumer interface
// ─────────────────────────────────────────────────────────────────────────────

/// A control-law module driven once per cycle.
pub trait ControlLaw {
    /// Compute this cycle's commands from a snapshot of the mirrors.
    fn step(&mut self, state: &MirroredState) -> CycleOutputs;
}

/// Everything a [`ControlLaw`] wants sent this cycle.  `None` fields are not
/// written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutputs {
    pub sim_output: Option<SimOutput>,
    pub eta_trim: Option<SimOutputEtaTrim>,
    pub zeta_trim: Option<SimOutputZetaTrim>,
    pub throttles: Option<SimOutputThrottles>,
    /// Transmitted in order.
    pub events: Vec<Event>,
    pub autopilot_state_machine: Option<ClientDataAutopilotStateMachine>,
    pub autopilot_laws: Option<ClientDataAutopilotLaws>,
    pub local_variables: Option<ClientDataLocalVariables>,
    pub local_variables_autothrust: Option<ClientDataLocalVariablesAutothrust>,
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// 1-based index of the cycle.
    pub cycle: u64,
    /// Inbound messages drained.
    pub messages: usize,
    /// Simulation-object records written.
    pub records_sent: usize,
    pub events_sent: usize,
    pub channels_written: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// CycleRunner
// ─────────────────────────────────────────────────────────────────────────────

/// Owns a bridge and drives it one tick at a time.
pub struct CycleRunner<C: Connector> {
    bridge: SimConnectInterface<C>,
    config: BridgeConfig,
    throttle_axes: Vec<SharedThrottleAxis>,
    cycles: u64,
}

impl<C: Connector> CycleRunner<C> {
    pub fn new(connector: C, config: BridgeConfig) -> Self {
        let bridge = SimConnectInterface::new(connector, config.client_name.clone());
        Self {
            bridge,
            config,
            throttle_axes: Vec::new(),
            cycles: 0,
        }
    }

    /// Connect with the configured features and one [`DirectThrottleAxis`]
    /// per configured engine.  Lever positions start at idle on every
    /// connect.
    ///
    /// # Errors
    ///
    /// Whatever [`SimConnectInterface::connect`] reports.
    pub fn connect(&mut self) -> Result<(), BridgeError> {
        self.throttle_axes = (0..self.config.throttle_axis_count)
            .map(|_| shared(DirectThrottleAxis::new()))
            .collect();
        self.bridge
            .connect(self.config.features, self.throttle_axes.clone())
    }

    pub fn disconnect(&mut self) {
        self.bridge.disconnect();
    }

    pub fn bridge(&self) -> &SimConnectInterface<C> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut SimConnectInterface<C> {
        &mut self.bridge
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The mappings handed to the current session.
    pub fn throttle_axes(&self) -> &[SharedThrottleAxis] {
        &self.throttle_axes
    }

    /// Cycles completed successfully.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one full request → read → step → send → reset cycle.
    ///
    /// # Errors
    ///
    /// The first [`BridgeError`] raised by the bridge.  When the read fails
    /// the law is not stepped and the edge mirrors are left untouched.  A send
    /// failure is reported after the edge mirrors have been reset.
    pub fn run_cycle<L: ControlLaw + ?Sized>(
        &mut self,
        law: &mut L,
    ) -> Result<CycleStats, BridgeError> {
        let cycle = self.cycles + 1;

        // ── Request ─────────────────────────────────────────────────────────
        self.bridge.request_read_data()?;
        self.bridge.request_data()?;

        // ── Read ────────────────────────────────────────────────────────────
        let messages = self.bridge.read_data().inspect_err(|e| {
            warn!(cycle, error = %e, "cycle read failed");
        })?;

        // ── Step ────────────────────────────────────────────────────────────
        let outputs = law.step(&self.bridge.mirrored_state());

        // ── Send ────────────────────────────────────────────────────────────
        let sent = self.send(&outputs);

        // ── Reset ───────────────────────────────────────────────────────────
        // The law has consumed the edges whether or not its outputs got out.
        self.bridge.reset_sim_input_autopilot();
        self.bridge.reset_sim_input_throttles();

        let mut stats = sent.inspect_err(|e| {
            warn!(cycle, error = %e, "cycle send failed");
        })?;
        self.cycles = cycle;
        stats.cycle = cycle;
        stats.messages = messages;
        debug!(
            cycle,
            messages,
            records_sent = stats.records_sent,
            events_sent = stats.events_sent,
            channels_written = stats.channels_written,
            "cycle complete"
        );
        Ok(stats)
    }

    fn send(&mut self, outputs: &CycleOutputs) -> Result<CycleStats, BridgeError> {
        let mut stats = CycleStats::default();
        let bridge = &mut self.bridge;

        if let Some(output) = outputs.sim_output {
            bridge.send_sim_output(output)?;
            stats.records_sent += 1;
        }
        if let Some(output) = outputs.eta_trim {
            bridge.send_sim_output_eta_trim(output)?;
            stats.records_sent += 1;
        }
        if let Some(output) = outputs.zeta_trim {
            bridge.send_sim_output_zeta_trim(output)?;
            stats.records_sent += 1;
        }
        if let Some(output) = outputs.throttles {
            bridge.send_sim_output_throttles(output)?;
            stats.records_sent += 1;
        }

        for &event in &outputs.events {
            bridge.send_event(event)?;
            stats.events_sent += 1;
        }

        if let Some(payload) = outputs.autopilot_state_machine {
            bridge.set_client_data_autopilot_state_machine(payload)?;
            stats.channels_written += 1;
        }
        if let Some(payload) = outputs.autopilot_laws {
            bridge.set_client_data_autopilot_laws(payload)?;
            stats.channels_written += 1;
        }
        if let Some(payload) = outputs.local_variables {
            bridge.set_client_data_local_variables(payload)?;
            stats.channels_written += 1;
        }
        if let Some(payload) = outputs.local_variables_autothrust {
            bridge.set_client_data_local_variables_autothrust(payload)?;
            stats.channels_written += 1;
        }
        Ok(stats)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
