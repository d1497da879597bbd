//! Session manager.
//!
//! [`SimConnectInterface`] owns the host session and the mirrored state and
//! exposes the per-cycle protocol:
//!
//! ```text
//! request_read_data()  ──► host queues a SimData snapshot
//! request_data()       ──► host queues the subscribed client-data areas
//! read_data()          ◄── drain: SimData / events / client data → mirrors
//! send_* / set_*       ──► commands and outbound channels
//! reset_sim_input_*()      consumer acknowledges the edge-triggered inputs
//! ```
//!
//! `connect` registers, in order: the inbound state record, the input events,
//! the outbound command records, and the client-data channels.  Any failure
//! drops the half-built session, which closes it.

use std::collections::BTreeSet;

use fbw_simconnect::{
    ClientDataPeriod, Connector, DataRequestFlags, ObjectId, Period, Session, SimConnect, priority,
};
use fbw_types::{
    BridgeError, ClientDataAutopilotLaws, ClientDataAutopilotStateMachine, ClientDataAutothrust,
    ClientDataLocalVariables, ClientDataLocalVariablesAutothrust, ClientDataPayload, DefinitionId,
    Event, FeatureFlags, Record, SimData, SimInput, SimInputAutopilot, SimInputThrottles,
    SimOutput, SimOutputEtaTrim, SimOutputThrottles, SimOutputZetaTrim,
    input::THROTTLE_AXIS_COUNT,
};
use tracing::{debug, info, warn};

use crate::client_data::{self, Channel};
use crate::definitions::{
    DefinitionRegistry, SIM_DATA, SIM_DATA_REQUEST, SIM_OUTPUT, SIM_OUTPUT_ETA_TRIM,
    SIM_OUTPUT_THROTTLES, SIM_OUTPUT_ZETA_TRIM,
};
use crate::events::prepare_sim_input_definitions;
use crate::mirror::{DispatchContext, Merge, MirroredState};
use crate::throttle::SharedThrottleAxis;

/// What a connected session declared to the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub flags: FeatureFlags,
    pub definitions: Vec<DefinitionId>,
    pub events: BTreeSet<Event>,
    pub read_channels: Vec<Channel>,
}

/// The bridge between the host and the control-law modules.
pub struct SimConnectInterface<C: Connector> {
    connector: C,
    client_name: String,
    session: Option<Session<C::Session>>,
    registration: Registration,
    throttle_axes: Vec<SharedThrottleAxis>,
    state: MirroredState,
}

impl<C: Connector> SimConnectInterface<C> {
    pub fn new(connector: C, client_name: impl Into<String>) -> Self {
        Self {
            connector,
            client_name: client_name.into(),
            session: None,
            registration: Registration::default(),
            throttle_axes: Vec::new(),
            state: MirroredState::default(),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Open a session and register everything `flags` and `throttle_axes`
    /// call for.  An open session is disconnected first.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ThrottleMapping`] for more mappings than engines.
    /// - [`BridgeError::Registration`] when the host refuses the session or
    ///   any declaration.  No session is left open.
    pub fn connect(
        &mut self,
        flags: FeatureFlags,
        throttle_axes: Vec<SharedThrottleAxis>,
    ) -> Result<(), BridgeError> {
        if throttle_axes.len() > THROTTLE_AXIS_COUNT {
            return Err(BridgeError::ThrottleMapping(format!(
                "{} throttle axes supplied, at most {THROTTLE_AXIS_COUNT} supported",
                throttle_axes.len()
            )));
        }
        self.disconnect();

        let mut session = Session::new(
            self.connector
                .open(&self.client_name)
                .map_err(|e| BridgeError::registration("host session", e))?,
        );

        let mut definitions = DefinitionRegistry::new();
        let registered = definitions
            .prepare_sim_data_definitions(&mut *session)
            .and_then(|()| {
                prepare_sim_input_definitions(&mut *session, flags, throttle_axes.len())
            })
            .and_then(|events| {
                definitions.prepare_sim_output_definitions(&mut *session)?;
                Ok(events)
            })
            .and_then(|events| {
                let channels = client_data::prepare_client_data_definitions(&mut *session, flags)?;
                Ok((events, channels))
            });

        let (events, read_channels) = match registered {
            Ok(registered) => registered,
            Err(e) => {
                warn!(client = %self.client_name, error = %e, "connect aborted");
                return Err(e);
            }
        };

        info!(
            client = %self.client_name,
            autopilot_state_machine = flags.autopilot_state_machine,
            autopilot_laws = flags.autopilot_laws,
            fly_by_wire = flags.fly_by_wire,
            throttle_axes = throttle_axes.len(),
            events = events.len(),
            "connected"
        );

        self.registration = Registration {
            flags,
            definitions: definitions.definitions(),
            events,
            read_channels,
        };
        self.throttle_axes = throttle_axes;
        self.state = MirroredState::default();
        self.session = Some(session);
        Ok(())
    }

    /// Release the session.  Safe to call at any time.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close() {
                warn!(error = %e, "host session close failed");
            }
            self.registration = Registration::default();
            info!(client = %self.client_name, "disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// What the current session registered; empty when disconnected.
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    fn session(&mut self) -> Result<&mut Session<C::Session>, BridgeError> {
        self.session.as_mut().ok_or(BridgeError::NotConnected)
    }

    // ── Per-cycle protocol ──────────────────────────────────────────────────

    /// Ask for one [`SimData`] snapshot on the next drain.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn request_read_data(&mut self) -> Result<(), BridgeError> {
        self.session()?
            .request_data_on_sim_object(
                SIM_DATA_REQUEST,
                SIM_DATA,
                ObjectId::USER,
                Period::Once,
                DataRequestFlags::DEFAULT,
            )
            .map_err(|e| {
                warn!(error = %e, "simulation data request failed");
                BridgeError::transport("request_data_on_sim_object", e)
            })
    }

    /// Ask for the current contents of every subscribed client-data channel.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn request_data(&mut self) -> Result<(), BridgeError> {
        let channels = self.registration.read_channels.clone();
        let session = self.session()?;
        for channel in channels {
            session
                .request_client_data(
                    channel.id(),
                    channel.request(),
                    channel.definition(),
                    ClientDataPeriod::Once,
                )
                .map_err(|e| {
                    warn!(channel = channel.name(), error = %e, "client data request failed");
                    BridgeError::transport("request_client_data", e)
                })?;
        }
        Ok(())
    }

    /// Drain every pending inbound message in arrival order.  Returns the
    /// number of messages processed.
    ///
    /// Messages merged before a failure stay merged.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotConnected`] without a session.
    /// - [`BridgeError::Transport`] when the host stream fails.
    /// - [`BridgeError::HostQuit`] when the host shut down; the session has
    ///   been released.
    pub fn read_data(&mut self) -> Result<usize, BridgeError> {
        let session = self.session.as_mut().ok_or(BridgeError::NotConnected)?;
        let ctx = DispatchContext {
            flags: self.registration.flags,
            events: &self.registration.events,
            throttle_axes: &self.throttle_axes,
        };

        let mut processed = 0;
        let mut quit = false;
        let mut failure = None;
        loop {
            match session.next_dispatch() {
                Ok(Some(message)) => {
                    processed += 1;
                    if self.state.merge(&message, ctx) == Merge::Quit {
                        quit = true;
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, processed, "inbound stream failed");
                    failure = Some(BridgeError::transport("next_dispatch", e));
                    break;
                }
            }
        }

        self.state.refresh_throttle_levels(&self.throttle_axes);
        if quit {
            info!("host quit");
            self.disconnect();
            return Err(BridgeError::HostQuit);
        }
        match failure {
            Some(e) => Err(e),
            None => {
                debug!(processed, "inbound drained");
                Ok(processed)
            }
        }
    }

    fn send_data<R: Record>(&mut self, define: DefinitionId, record: &R) -> Result<(), BridgeError> {
        self.session()?
            .set_data_on_sim_object(define, ObjectId::USER, &record.encode())
            .map_err(|e| {
                warn!(record = R::NAME, error = %e, "data write failed");
                BridgeError::transport("set_data_on_sim_object", e)
            })
    }

    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn send_sim_output(&mut self, output: SimOutput) -> Result<(), BridgeError> {
        self.send_data(SIM_OUTPUT, &output)
    }

    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn send_sim_output_eta_trim(&mut self, output: SimOutputEtaTrim) -> Result<(), BridgeError> {
        self.send_data(SIM_OUTPUT_ETA_TRIM, &output)
    }

    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn send_sim_output_zeta_trim(
        &mut self,
        output: SimOutputZetaTrim,
    ) -> Result<(), BridgeError> {
        self.send_data(SIM_OUTPUT_ZETA_TRIM, &output)
    }

    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn send_sim_output_throttles(
        &mut self,
        output: SimOutputThrottles,
    ) -> Result<(), BridgeError> {
        self.send_data(SIM_OUTPUT_THROTTLES, &output)
    }

    /// Transmit a discrete command.  Delivery is not acknowledged.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotConnected`] without a session.
    /// - [`BridgeError::Unregistered`] for an event this session did not map.
    /// - [`BridgeError::Transport`] when the host refuses the call.
    pub fn send_event(&mut self, event: Event) -> Result<(), BridgeError> {
        if self.session.is_none() {
            return Err(BridgeError::NotConnected);
        }
        if !self.registration.events.contains(&event) {
            return Err(BridgeError::Unregistered {
                what: format!("event {event}"),
            });
        }
        self.session()?
            .transmit_client_event(ObjectId::USER, event.id(), 0, priority::HIGHEST)
            .map_err(|e| {
                warn!(%event, error = %e, "event transmit failed");
                BridgeError::transport("transmit_client_event", e)
            })
    }

    // ── Client data ─────────────────────────────────────────────────────────

    fn set_client_data<P: ClientDataPayload>(
        &mut self,
        channel: Channel,
        payload: &P,
    ) -> Result<(), BridgeError> {
        client_data::set_client_data(&mut **self.session()?, channel, payload)
    }

    /// Publish the autopilot state machine output.  The local mirror is
    /// updated on success.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn set_client_data_autopilot_state_machine(
        &mut self,
        output: ClientDataAutopilotStateMachine,
    ) -> Result<(), BridgeError> {
        self.set_client_data(Channel::AutopilotStateMachine, &output)?;
        self.state.client_data_autopilot_state_machine = output;
        Ok(())
    }

    /// Publish the autopilot laws output.  The local mirror is updated on
    /// success.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn set_client_data_autopilot_laws(
        &mut self,
        output: ClientDataAutopilotLaws,
    ) -> Result<(), BridgeError> {
        self.set_client_data(Channel::AutopilotLaws, &output)?;
        self.state.client_data_autopilot_laws = output;
        Ok(())
    }

    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn set_client_data_local_variables(
        &mut self,
        output: ClientDataLocalVariables,
    ) -> Result<(), BridgeError> {
        self.set_client_data(Channel::LocalVariables, &output)
    }

    /// # Errors
    ///
    /// [`BridgeError::NotConnected`] or [`BridgeError::Transport`].
    pub fn set_client_data_local_variables_autothrust(
        &mut self,
        output: ClientDataLocalVariablesAutothrust,
    ) -> Result<(), BridgeError> {
        self.set_client_data(Channel::LocalVariablesAutothrust, &output)
    }

    /// Latest state machine payload, zeroed until one arrives.
    pub fn get_client_data_autopilot_state_machine(&self) -> ClientDataAutopilotStateMachine {
        self.state.client_data_autopilot_state_machine
    }

    pub fn get_client_data_autopilot_laws(&self) -> ClientDataAutopilotLaws {
        self.state.client_data_autopilot_laws
    }

    pub fn get_client_data_autothrust(&self) -> ClientDataAutothrust {
        self.state.client_data_autothrust
    }

    // ── Mirrors ─────────────────────────────────────────────────────────────

    /// Return the autopilot pushbuttons to baseline.
    pub fn reset_sim_input_autopilot(&mut self) {
        self.state.sim_input_autopilot = SimInputAutopilot::default();
    }

    /// Zero the throttle increments and autothrust flags.  Lever and reverse
    /// levels are kept.
    pub fn reset_sim_input_throttles(&mut self) {
        self.state.sim_input_throttles.clear_edges();
    }

    pub fn sim_data(&self) -> SimData {
        self.state.sim_data
    }

    pub fn sim_input(&self) -> SimInput {
        self.state.sim_input
    }

    pub fn sim_input_autopilot(&self) -> SimInputAutopilot {
        self.state.sim_input_autopilot
    }

    pub fn sim_input_throttles(&self) -> SimInputThrottles {
        self.state.sim_input_throttles
    }

    /// Copy of every mirror, for diagnostics.
    pub fn mirrored_state(&self) -> MirroredState {
        self.state
    }
}

impl<C: Connector> Drop for SimConnectInterface<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbw_simconnect::{Recv, SimHost};
    use fbw_types::GroupId;

    use crate::events::InputGroup;
    use crate::throttle::{DirectThrottleAxis, ThrottleAxisMapping, shared};

    fn bridge(host: &SimHost) -> SimConnectInterface<SimHost> {
        SimConnectInterface::new(host.clone(), "A32NX_FBW")
    }

    fn two_axes() -> Vec<SharedThrottleAxis> {
        vec![shared(DirectThrottleAxis::new()), shared(DirectThrottleAxis::new())]
    }

    fn flag_combinations() -> Vec<FeatureFlags> {
        let mut all = Vec::new();
        for bits in 0..8u8 {
            all.push(FeatureFlags {
                autopilot_state_machine: bits & 1 != 0,
                autopilot_laws: bits & 2 != 0,
                fly_by_wire: bits & 4 != 0,
            });
        }
        all
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    #[test]
    fn connect_registers_exactly_what_flags_imply() {
        for flags in flag_combinations() {
            let host = SimHost::new();
            let mut bridge = bridge(&host);
            bridge.connect(flags, two_axes()).unwrap();

            assert_eq!(
                host.subscription(Event::AxisElevatorSet).is_some(),
                flags.fly_by_wire,
                "{flags:?}"
            );
            assert_eq!(
                host.subscription(Event::ApMaster).is_some(),
                flags.autopilot_state_machine,
                "{flags:?}"
            );
            assert_eq!(
                host.subscription(Event::FcuHdgPull).is_some(),
                flags.autopilot_state_machine,
                "{flags:?}"
            );
            assert!(host.subscription(Event::AutoThrottleArm).is_some());
            assert!(host.subscription(Event::Throttle2Incr).is_some());

            let read: Vec<_> = host.client_data_requests().iter().map(|r| r.id).collect();
            assert_eq!(
                read.contains(&Channel::AutopilotStateMachine.id()),
                flags.autopilot_state_machine
            );
            assert_eq!(
                read.contains(&Channel::AutopilotLaws.id()),
                flags.autopilot_laws
            );
            assert!(read.contains(&Channel::Autothrust.id()));
            assert_eq!(host.client_data_areas().len(), 5);
            assert_eq!(
                bridge.registration().definitions,
                vec![
                    SIM_DATA,
                    SIM_OUTPUT,
                    SIM_OUTPUT_ETA_TRIM,
                    SIM_OUTPUT_ZETA_TRIM,
                    SIM_OUTPUT_THROTTLES
                ]
            );
        }
    }

    #[test]
    fn connect_opens_session_with_client_name() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        assert!(!bridge.is_connected());
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        assert!(bridge.is_connected());
        assert_eq!(host.client_name().as_deref(), Some("A32NX_FBW"));
        assert_eq!(
            host.group_priority(InputGroup::Autopilot.id()),
            Some(priority::HIGHEST_MASKABLE)
        );
    }

    #[test]
    fn without_mappings_no_throttle_events_are_bound() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        assert!(host.subscription(Event::ThrottleSet).is_none());
        assert!(host.subscription(Event::ThrottleMappingLoadFromFile).is_none());
        assert!(host.subscription(Event::AutoThrottleArm).is_some());
    }

    #[test]
    fn registration_failure_aborts_connect_and_closes_session() {
        let host = SimHost::new().without_simvar("GEAR ANIMATION POSITION:1");
        let mut bridge = bridge(&host);

        let err = bridge.connect(FeatureFlags::ALL, two_axes()).unwrap_err();

        assert!(matches!(err, BridgeError::Registration { .. }));
        assert!(!bridge.is_connected());
        assert!(!host.is_open());
        assert_eq!(bridge.read_data(), Err(BridgeError::NotConnected));
    }

    #[test]
    fn rejected_event_aborts_connect() {
        let host = SimHost::new().without_sim_event("AP_MASTER");
        let mut bridge = bridge(&host);
        assert!(bridge.connect(FeatureFlags::ALL, Vec::new()).is_err());
        assert!(!host.is_open());

        let flags = FeatureFlags {
            autopilot_state_machine: false,
            ..FeatureFlags::ALL
        };
        bridge.connect(flags, Vec::new()).unwrap();
    }

    #[test]
    fn refused_session_is_a_registration_error() {
        let host = SimHost::new();
        host.fail("open", "simulator not running");
        let mut bridge = bridge(&host);
        assert!(matches!(
            bridge.connect(FeatureFlags::ALL, Vec::new()),
            Err(BridgeError::Registration { .. })
        ));
    }

    #[test]
    fn too_many_mappings_are_rejected() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        let mut axes = two_axes();
        axes.push(shared(DirectThrottleAxis::new()));
        assert!(matches!(
            bridge.connect(FeatureFlags::ALL, axes),
            Err(BridgeError::ThrottleMapping(_))
        ));
        assert_eq!(host.sessions_opened(), 0);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.disconnect();
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        bridge.disconnect();
        bridge.disconnect();
        assert!(!host.is_open());
        assert_eq!(bridge.registration(), &Registration::default());
    }

    #[test]
    fn reconnect_replaces_the_session() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        bridge.connect(FeatureFlags::NONE, Vec::new()).unwrap();
        assert_eq!(host.sessions_opened(), 2);
        assert!(host.is_open());
        assert!(host.subscription(Event::ApMaster).is_none());
    }

    #[test]
    fn dropping_the_bridge_closes_the_session() {
        let host = SimHost::new();
        {
            let mut bridge = bridge(&host);
            bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        }
        assert!(!host.is_open());
    }

    #[test]
    fn operations_without_session_report_not_connected() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        assert_eq!(bridge.request_read_data(), Err(BridgeError::NotConnected));
        assert_eq!(bridge.request_data(), Err(BridgeError::NotConnected));
        assert_eq!(
            bridge.send_sim_output(SimOutput::default()),
            Err(BridgeError::NotConnected)
        );
        assert_eq!(bridge.send_event(Event::ApMaster), Err(BridgeError::NotConnected));
        assert_eq!(
            bridge.set_client_data_local_variables(ClientDataLocalVariables::default()),
            Err(BridgeError::NotConnected)
        );
    }

    // ── Reading ─────────────────────────────────────────────────────────────

    #[test]
    fn requested_snapshot_is_merged_on_read() {
        let snapshot = SimData {
            v_ias_kn: 250.0,
            h_ft: 12_000.0,
            ..SimData::default()
        };
        let host = SimHost::new().with_auto_response(SIM_DATA, &snapshot);
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        bridge.request_read_data().unwrap();
        bridge.read_data().unwrap();

        assert_eq!(bridge.sim_data(), snapshot);
        let request = host.sim_object_requests()[0];
        assert_eq!(request.period, Period::Once);
        assert_eq!(request.define, SIM_DATA);
    }

    #[test]
    fn last_write_wins_within_one_drain() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        let first = SimData {
            nz_g: 1.4,
            ..SimData::default()
        };
        let second = SimData {
            nz_g: 0.9,
            ..SimData::default()
        };
        host.push_sim_object(SIM_DATA_REQUEST, SIM_DATA, &first);
        host.push_sim_object(SIM_DATA_REQUEST, SIM_DATA, &second);
        bridge.read_data().unwrap();

        assert_eq!(bridge.sim_data().nz_g, 0.9);
    }

    #[test]
    fn transport_failure_keeps_what_was_merged() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        bridge.read_data().unwrap();

        let snapshot = SimData {
            h_ft: 3_000.0,
            ..SimData::default()
        };
        host.push_sim_object(SIM_DATA_REQUEST, SIM_DATA, &snapshot);
        bridge.read_data().unwrap();
        host.fail("next_dispatch", "pipe broken");

        assert!(matches!(
            bridge.read_data(),
            Err(BridgeError::Transport { call: "next_dispatch", .. })
        ));
        assert_eq!(bridge.sim_data(), snapshot);
        assert!(bridge.is_connected());
    }

    #[test]
    fn unknown_messages_are_ignored() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        host.push(Recv::Unknown { id: 0xdead });
        host.push(Recv::Null);
        host.push(Recv::Exception {
            exception: 3,
            send_id: 12,
            index: 0,
        });

        // Open + three stray messages.
        assert_eq!(bridge.read_data(), Ok(4));
        assert_eq!(bridge.mirrored_state(), MirroredState::default());
    }

    #[test]
    fn host_quit_releases_the_session() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        host.shutdown();
        assert_eq!(bridge.read_data(), Err(BridgeError::HostQuit));
        assert!(!bridge.is_connected());
        assert!(!host.is_open());
        assert_eq!(bridge.request_read_data(), Err(BridgeError::NotConnected));
    }

    // ── Events ──────────────────────────────────────────────────────────────

    #[test]
    fn ap_master_sets_engage_until_reset() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, vec![shared(DirectThrottleAxis::new())]).unwrap();
        bridge.read_data().unwrap();
        let before = bridge.mirrored_state();

        assert!(host.fire_event(Event::ApMaster, 0));
        bridge.read_data().unwrap();

        let after = bridge.mirrored_state();
        assert_eq!(after.sim_input_autopilot.ap_engage, 1.0);
        assert_eq!(
            after.sim_input_autopilot,
            SimInputAutopilot {
                ap_engage: 1.0,
                ..SimInputAutopilot::default()
            }
        );
        assert_eq!(after.sim_input, before.sim_input);
        assert_eq!(after.sim_input_throttles, before.sim_input_throttles);
        assert_eq!(after.sim_data, before.sim_data);

        // Edge-triggered: a later drain does not clear it.
        bridge.read_data().unwrap();
        assert_eq!(bridge.sim_input_autopilot().ap_engage, 1.0);

        bridge.reset_sim_input_autopilot();
        assert!(bridge.sim_input_autopilot().is_idle());
        assert_eq!(bridge.mirrored_state(), before);
    }

    #[test]
    fn autopilot_reset_is_idempotent() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        host.fire_event(Event::FcuVsPull, 0);
        bridge.read_data().unwrap();

        bridge.reset_sim_input_autopilot();
        let once = bridge.mirrored_state();
        bridge.reset_sim_input_autopilot();
        assert_eq!(bridge.mirrored_state(), once);
    }

    #[test]
    fn disabled_features_leave_mirrors_at_default() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::NONE, Vec::new()).unwrap();

        assert!(!host.fire_event(Event::AxisElevatorSet, 8192));
        assert!(!host.fire_event(Event::ApMaster, 0));
        // Delivered anyway by a misbehaving host.
        host.push(Recv::Event {
            group: GroupId(0),
            event: Event::AxisElevatorSet.id(),
            data: 8192,
        });
        bridge.read_data().unwrap();

        assert_eq!(bridge.sim_input(), SimInput::default());
        assert!(bridge.sim_input_autopilot().is_idle());
    }

    #[test]
    fn throttle_increments_accumulate_until_reset() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, two_axes()).unwrap();

        for _ in 0..4 {
            host.fire_event(Event::ThrottleIncrSmall, 0);
        }
        bridge.read_data().unwrap();
        let accumulated = bridge.sim_input_throttles().increments;
        bridge.reset_sim_input_throttles();

        host.fire_event(Event::ThrottleIncr, 0);
        bridge.read_data().unwrap();
        assert_eq!(bridge.sim_input_throttles().increments, accumulated);
        assert_eq!(accumulated, [1.0, 1.0]);

        bridge.reset_sim_input_throttles();
        assert_eq!(bridge.sim_input_throttles().increments, [0.0, 0.0]);
    }

    #[test]
    fn throttle_levels_follow_mappings_and_survive_reset() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        let axes = two_axes();
        bridge.connect(FeatureFlags::ALL, axes.clone()).unwrap();

        host.fire_event(Event::Throttle1Full, 0);
        host.fire_event(Event::AutoThrottleArm, 0);
        host.fire_event(Event::ThrottleReverseThrustToggle, 0);
        bridge.read_data().unwrap();

        let throttles = bridge.sim_input_throttles();
        assert_eq!(throttles.throttles, [1.0, 0.0]);
        assert_eq!(throttles.reverse, [1.0, 1.0]);
        assert_eq!(throttles.athr_push, 1.0);
        assert_eq!(axes[0].borrow().value(), 1.0);

        bridge.reset_sim_input_throttles();
        let throttles = bridge.sim_input_throttles();
        assert_eq!(throttles.athr_push, 0.0);
        assert_eq!(throttles.throttles, [1.0, 0.0]);
        assert_eq!(throttles.reverse, [1.0, 1.0]);
    }

    #[test]
    fn send_event_requires_registration() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::NONE, Vec::new()).unwrap();

        assert!(matches!(
            bridge.send_event(Event::ApMaster),
            Err(BridgeError::Unregistered { .. })
        ));
        bridge.send_event(Event::AutoThrottleArm).unwrap();
        assert_eq!(host.transmitted(), vec![(Event::AutoThrottleArm.id(), 0)]);
    }

    // ── Writing ─────────────────────────────────────────────────────────────

    #[test]
    fn outputs_are_written_in_registered_layout() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        let output = SimOutput {
            eta: 0.1,
            xi: -0.2,
            zeta: 0.0,
        };
        bridge.send_sim_output(output).unwrap();
        bridge
            .send_sim_output_eta_trim(SimOutputEtaTrim { eta_trim_deg: 2.0 })
            .unwrap();
        bridge
            .send_sim_output_zeta_trim(SimOutputZetaTrim { zeta_trim_pos: 0.1 })
            .unwrap();
        bridge
            .send_sim_output_throttles(SimOutputThrottles {
                throttle_lever_position_1: 50.0,
                throttle_lever_position_2: 50.0,
            })
            .unwrap();

        let writes = host.writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[0], (SIM_OUTPUT, output.encode()));
        assert_eq!(writes[3].0, SIM_OUTPUT_THROTTLES);
    }

    #[test]
    fn write_failure_is_a_transport_error() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();
        host.fail("set_data_on_sim_object", "pipe broken");

        assert!(matches!(
            bridge.send_sim_output(SimOutput::default()),
            Err(BridgeError::Transport { .. })
        ));
        assert!(bridge.is_connected());
    }

    // ── Client data ─────────────────────────────────────────────────────────

    #[test]
    fn state_machine_round_trips_through_client_data() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        let payload = ClientDataAutopilotStateMachine {
            enabled: 1.0,
            lateral_mode: 20.0,
            h_c_ft: 5_000.0,
            ..Default::default()
        };
        bridge.set_client_data_autopilot_state_machine(payload).unwrap();
        assert_eq!(bridge.get_client_data_autopilot_state_machine(), payload);

        // The host echoes the write to subscribers; a later drain agrees.
        bridge.read_data().unwrap();
        assert_eq!(bridge.get_client_data_autopilot_state_machine(), payload);
    }

    #[test]
    fn inbound_channels_update_from_other_writers() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        let laws = ClientDataAutopilotLaws {
            autopilot_theta: 3.5,
            ..Default::default()
        };
        let athr = ClientDataAutothrust {
            n1_c_1_percent: 82.0,
            ..Default::default()
        };
        host.publish_client_data(Channel::AutopilotLaws.id(), &laws.to_bytes());
        host.publish_client_data(Channel::Autothrust.id(), &athr.to_bytes());
        bridge.read_data().unwrap();

        assert_eq!(bridge.get_client_data_autopilot_laws(), laws);
        assert_eq!(bridge.get_client_data_autothrust(), athr);
    }

    #[test]
    fn request_data_pulls_current_channel_contents() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::NONE, Vec::new()).unwrap();
        let athr = ClientDataAutothrust {
            mode: 3.0,
            ..Default::default()
        };
        assert_eq!(host.publish_client_data(Channel::Autothrust.id(), &athr.to_bytes()), 1);
        bridge.read_data().unwrap();

        bridge.request_data().unwrap();
        bridge.read_data().unwrap();
        assert_eq!(bridge.get_client_data_autothrust(), athr);
        assert!(
            host.client_data_requests()
                .iter()
                .any(|r| r.id == Channel::Autothrust.id() && r.period == ClientDataPeriod::Once)
        );
    }

    #[test]
    fn laws_channel_stays_default_when_disabled() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::NONE, Vec::new()).unwrap();

        let laws = ClientDataAutopilotLaws {
            autopilot_phi: 10.0,
            ..Default::default()
        };
        assert_eq!(host.publish_client_data(Channel::AutopilotLaws.id(), &laws.to_bytes()), 0);
        bridge.request_data().unwrap();
        bridge.read_data().unwrap();

        assert_eq!(
            bridge.get_client_data_autopilot_laws(),
            ClientDataAutopilotLaws::default()
        );
        assert_eq!(
            bridge.get_client_data_autopilot_state_machine(),
            ClientDataAutopilotStateMachine::default()
        );
    }

    #[test]
    fn outbound_local_variables_reach_the_host() {
        let host = SimHost::new();
        let mut bridge = bridge(&host);
        bridge.connect(FeatureFlags::ALL, Vec::new()).unwrap();

        let vars = ClientDataLocalVariablesAutothrust {
            tla_1: 25.0,
            tla_2: 25.0,
            ..Default::default()
        };
        bridge.set_client_data_local_variables_autothrust(vars).unwrap();
        assert_eq!(
            host.client_data(Channel::LocalVariablesAutothrust.id()),
            Some(vars.to_bytes())
        );
    }
}
