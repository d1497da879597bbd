//! In-process simulated host for CI and unit tests.
//!
//! [`SimHost`] implements [`Connector`] and hands out sessions that share one
//! host state.  The host knows a fixed vocabulary of simulation variables and
//! trigger names, records every registration, request, write and transmitted
//! event, and lets a test inject inbound messages.  Cloning a `SimHost` gives
//! another handle onto the same state, so a test keeps one handle for
//! assertions while the bridge owns the session.
//!
//! # Stub behaviour
//!
//! | Call | Behaviour |
//! |---|---|
//! | `add_to_data_definition` | Rejects names/units outside the vocabulary. |
//! | `map_client_event_to_sim_event` | Rejects unknown built-in triggers; custom `A.B` names always map. |
//! | `request_data_on_sim_object` | Queues an untagged response when an auto-response is configured. |
//! | `set_client_data` | Rejects size mismatches; echoes the block to `OnSet` subscribers. |
//! | any call | Fails with the configured reason after [`SimHost::fail`]. |
//!
//! # Example
//!
//! ```rust
//! use fbw_simconnect::{Connector, Recv, SimConnect, SimHost};
//!
//! let host = SimHost::new().without_simvar("G FORCE");
//! let mut session = host.clone().open("A32NX_FBW").unwrap();
//! assert!(matches!(session.next_dispatch().unwrap(), Some(Recv::Open { .. })));
//! assert!(host.is_open());
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use fbw_types::{
    ClientDataDefinitionId, ClientDataId, DataType, DefinitionId, Event, EventId, GroupId, Record,
    RequestId, SimData, SimOutput, SimOutputEtaTrim, SimOutputThrottles, SimOutputZetaTrim,
};

use crate::connection::{
    ClientDataPeriod, Connector, DataRequestFlags, HostError, ObjectId, Period, SimConnect,
};
use crate::recv::Recv;

// ─────────────────────────────────────────────────────────────────────────────
// Recorded host state
// ─────────────────────────────────────────────────────────────────────────────

/// One field as the host recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredField {
    pub name: String,
    pub unit: Option<String>,
    pub data_type: DataType,
    pub datum: u32,
}

/// A client-data subscription as the host recorded it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientDataRequest {
    pub id: ClientDataId,
    pub request: RequestId,
    pub define: ClientDataDefinitionId,
    pub period: ClientDataPeriod,
}

/// A simulation-object request as the host recorded it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimObjectRequest {
    pub request: RequestId,
    pub define: DefinitionId,
    pub object: ObjectId,
    pub period: Period,
    pub flags: DataRequestFlags,
}

#[derive(Debug, Clone)]
struct ClientDataArea {
    name: Option<String>,
    size: usize,
    data: Vec<u8>,
}

#[derive(Default)]
struct HostState {
    // Vocabulary
    scalar_vars: HashSet<(String, String)>,
    struct_vars: HashSet<String>,
    sim_events: HashSet<String>,
    failing: HashMap<&'static str, String>,

    // Session bookkeeping
    open: bool,
    sessions_opened: usize,
    client_name: Option<String>,

    // Per-session registrations
    definitions: BTreeMap<DefinitionId, Vec<RegisteredField>>,
    mapped_events: BTreeMap<EventId, String>,
    subscriptions: BTreeMap<EventId, (GroupId, bool)>,
    group_priorities: BTreeMap<GroupId, u32>,
    client_data_definitions: BTreeMap<ClientDataDefinitionId, usize>,
    sim_object_requests: Vec<SimObjectRequest>,
    client_data_requests: Vec<ClientDataRequest>,

    // Areas outlive sessions, as on a real host.
    client_data: BTreeMap<ClientDataId, ClientDataArea>,

    // Traffic
    writes: Vec<(DefinitionId, Vec<u8>)>,
    transmitted: Vec<(EventId, u32)>,
    inbound: VecDeque<Recv>,
    auto_responses: HashMap<DefinitionId, Vec<u8>>,
}

impl HostState {
    fn check(&self, call: &'static str) -> Result<(), HostError> {
        if let Some(reason) = self.failing.get(call) {
            return Err(HostError::new(call, reason.clone()));
        }
        if !self.open {
            return Err(HostError::new(call, "session is not open"));
        }
        Ok(())
    }

    fn begin_session(&mut self, client_name: &str) {
        self.open = true;
        self.sessions_opened += 1;
        self.client_name = Some(client_name.to_string());
        self.definitions.clear();
        self.mapped_events.clear();
        self.subscriptions.clear();
        self.group_priorities.clear();
        self.client_data_definitions.clear();
        self.sim_object_requests.clear();
        self.client_data_requests.clear();
        self.inbound.clear();
    }

    /// Queue `data` for every `OnSet` subscriber of area `id`.
    fn notify_on_set(&mut self, id: ClientDataId, data: &[u8]) -> usize {
        let subscribers: Vec<ClientDataRequest> = self
            .client_data_requests
            .iter()
            .filter(|r| r.id == id && r.period == ClientDataPeriod::OnSet)
            .copied()
            .collect();
        for sub in &subscribers {
            self.inbound.push_back(Recv::ClientData {
                request: sub.request,
                define: sub.define,
                data: data.to_vec(),
            });
        }
        subscribers.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SimHost
// ─────────────────────────────────────────────────────────────────────────────

/// Shared handle onto one simulated host.
#[derive(Clone)]
pub struct SimHost {
    state: Rc<RefCell<HostState>>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// A host that knows every variable the bridge's records use and every
    /// built-in trigger of [`Event`].
    pub fn new() -> Self {
        let mut state = HostState::default();
        let fields = SimData::FIELDS
            .iter()
            .chain(SimOutput::FIELDS)
            .chain(SimOutputEtaTrim::FIELDS)
            .chain(SimOutputZetaTrim::FIELDS)
            .chain(SimOutputThrottles::FIELDS);
        for field in fields {
            if field.data_type.is_struct() {
                state.struct_vars.insert(field.name.to_string());
            } else {
                state
                    .scalar_vars
                    .insert((field.name.to_string(), field.unit.to_uppercase()));
            }
        }
        for event in Event::ALL.iter().filter(|e| !e.is_custom()) {
            state.sim_events.insert(event.sim_event_name().to_string());
        }
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    // -- Configuration ------------------------------------------------------

    /// Remove a simulation variable from the vocabulary.
    pub fn without_simvar(self, name: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.scalar_vars.retain(|(n, _)| n != name);
            state.struct_vars.remove(name);
        }
        self
    }

    /// Remove a built-in trigger from the vocabulary.
    pub fn without_sim_event(self, name: &str) -> Self {
        self.state.borrow_mut().sim_events.remove(name);
        self
    }

    /// Answer every request for `define` with `record`, untagged.
    pub fn with_auto_response<R: Record>(self, define: DefinitionId, record: &R) -> Self {
        self.state
            .borrow_mut()
            .auto_responses
            .insert(define, record.encode());
        self
    }

    /// Make `call` fail until [`SimHost::recover`] is called.
    pub fn fail(&self, call: &'static str, reason: impl Into<String>) {
        self.state.borrow_mut().failing.insert(call, reason.into());
    }

    pub fn recover(&self, call: &'static str) {
        self.state.borrow_mut().failing.remove(call);
    }

    // -- Injection ----------------------------------------------------------

    /// Queue a raw inbound message.
    pub fn push(&self, message: Recv) {
        self.state.borrow_mut().inbound.push_back(message);
    }

    /// Fire `event` with `data` through the group it was subscribed in.
    /// Returns `false` (and queues nothing) when the event is not subscribed.
    pub fn fire_event(&self, event: Event, data: u32) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(&(group, _)) = state.subscriptions.get(&event.id()) else {
            return false;
        };
        state.inbound.push_back(Recv::Event {
            group,
            event: event.id(),
            data,
        });
        true
    }

    /// Queue an untagged simulation-object response carrying `record`.
    pub fn push_sim_object<R: Record>(&self, request: RequestId, define: DefinitionId, record: &R) {
        self.push(Recv::SimObjectData {
            request,
            define,
            object: ObjectId::USER,
            flags: DataRequestFlags::DEFAULT,
            data: record.encode(),
        });
    }

    /// Write `data` into area `id` as another module would, notifying `OnSet`
    /// subscribers.  Returns the number of notifications queued.
    pub fn publish_client_data(&self, id: ClientDataId, data: &[u8]) -> usize {
        let mut state = self.state.borrow_mut();
        if let Some(area) = state.client_data.get_mut(&id) {
            area.data = data.to_vec();
        }
        state.notify_on_set(id, data)
    }

    /// Announce host shutdown on the inbound stream.
    pub fn shutdown(&self) {
        self.push(Recv::Quit);
    }

    // -- Inspection ---------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.borrow().sessions_opened
    }

    pub fn client_name(&self) -> Option<String> {
        self.state.borrow().client_name.clone()
    }

    pub fn definition_ids(&self) -> Vec<DefinitionId> {
        self.state.borrow().definitions.keys().copied().collect()
    }

    pub fn definition(&self, define: DefinitionId) -> Vec<RegisteredField> {
        self.state
            .borrow()
            .definitions
            .get(&define)
            .cloned()
            .unwrap_or_default()
    }

    /// Trigger names mapped this session, in event-ID order.
    pub fn mapped_events(&self) -> Vec<String> {
        self.state.borrow().mapped_events.values().cloned().collect()
    }

    /// Group and mask flag `event` was subscribed with.
    pub fn subscription(&self, event: Event) -> Option<(GroupId, bool)> {
        self.state.borrow().subscriptions.get(&event.id()).copied()
    }

    pub fn group_priority(&self, group: GroupId) -> Option<u32> {
        self.state.borrow().group_priorities.get(&group).copied()
    }

    /// Name and size of every client-data area the host holds.
    pub fn client_data_areas(&self) -> Vec<(ClientDataId, Option<String>, usize)> {
        self.state
            .borrow()
            .client_data
            .iter()
            .map(|(id, area)| (*id, area.name.clone(), area.size))
            .collect()
    }

    /// Current contents of area `id`.
    pub fn client_data(&self, id: ClientDataId) -> Option<Vec<u8>> {
        self.state.borrow().client_data.get(&id).map(|a| a.data.clone())
    }

    pub fn client_data_requests(&self) -> Vec<ClientDataRequest> {
        self.state.borrow().client_data_requests.clone()
    }

    pub fn sim_object_requests(&self) -> Vec<SimObjectRequest> {
        self.state.borrow().sim_object_requests.clone()
    }

    /// Every block written with `set_data_on_sim_object`, oldest first.
    pub fn writes(&self) -> Vec<(DefinitionId, Vec<u8>)> {
        self.state.borrow().writes.clone()
    }

    pub fn transmitted(&self) -> Vec<(EventId, u32)> {
        self.state.borrow().transmitted.clone()
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().inbound.len()
    }
}

impl Connector for SimHost {
    type Session = SimHostSession;

    fn open(&mut self, client_name: &str) -> Result<SimHostSession, HostError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.failing.get("open") {
            return Err(HostError::new("open", reason.clone()));
        }
        state.begin_session(client_name);
        state.inbound.push_back(Recv::Open {
            application_name: "SimHost".to_string(),
        });
        Ok(SimHostSession {
            state: Rc::clone(&self.state),
            generation: state.sessions_opened,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// A session opened on a [`SimHost`].
pub struct SimHostSession {
    state: Rc<RefCell<HostState>>,
    generation: usize,
}

impl SimHostSession {
    /// Borrow host state, failing when `call` is configured to fail, the host
    /// is closed, or a newer session has replaced this one.
    fn host(&self, call: &'static str) -> Result<std::cell::RefMut<'_, HostState>, HostError> {
        let state = self.state.borrow_mut();
        state.check(call)?;
        if state.sessions_opened != self.generation {
            return Err(HostError::new(call, "session was superseded"));
        }
        Ok(state)
    }
}

impl SimConnect for SimHostSession {
    fn close(&mut self) -> Result<(), HostError> {
        let mut state = self.host("close")?;
        state.open = false;
        Ok(())
    }

    fn add_to_data_definition(
        &mut self,
        define: DefinitionId,
        name: &str,
        unit: Option<&str>,
        data_type: DataType,
        datum: u32,
    ) -> Result<(), HostError> {
        let mut state = self.host("add_to_data_definition")?;
        let known = match unit {
            None => data_type.is_struct() && state.struct_vars.contains(name),
            Some(unit) => state
                .scalar_vars
                .contains(&(name.to_string(), unit.to_uppercase())),
        };
        if !known {
            return Err(HostError::new(
                "add_to_data_definition",
                format!("NAME_UNRECOGNIZED: {name} [{}]", unit.unwrap_or("")),
            ));
        }
        state.definitions.entry(define).or_default().push(RegisteredField {
            name: name.to_string(),
            unit: unit.map(str::to_string),
            data_type,
            datum,
        });
        Ok(())
    }

    fn map_client_event_to_sim_event(
        &mut self,
        event: EventId,
        name: &str,
    ) -> Result<(), HostError> {
        let mut state = self.host("map_client_event_to_sim_event")?;
        if !name.contains('.') && !state.sim_events.contains(name) {
            return Err(HostError::new(
                "map_client_event_to_sim_event",
                format!("NAME_UNRECOGNIZED: {name}"),
            ));
        }
        if state.mapped_events.contains_key(&event) {
            return Err(HostError::new(
                "map_client_event_to_sim_event",
                format!("EVENT_ID_DUPLICATE: {event}"),
            ));
        }
        state.mapped_events.insert(event, name.to_string());
        Ok(())
    }

    fn add_client_event_to_notification_group(
        &mut self,
        group: GroupId,
        event: EventId,
        masked: bool,
    ) -> Result<(), HostError> {
        let mut state = self.host("add_client_event_to_notification_group")?;
        if !state.mapped_events.contains_key(&event) {
            return Err(HostError::new(
                "add_client_event_to_notification_group",
                format!("UNRECOGNIZED_ID: {event}"),
            ));
        }
        state.subscriptions.insert(event, (group, masked));
        Ok(())
    }

    fn set_notification_group_priority(
        &mut self,
        group: GroupId,
        priority: u32,
    ) -> Result<(), HostError> {
        let mut state = self.host("set_notification_group_priority")?;
        state.group_priorities.insert(group, priority);
        Ok(())
    }

    fn request_data_on_sim_object(
        &mut self,
        request: RequestId,
        define: DefinitionId,
        object: ObjectId,
        period: Period,
        flags: DataRequestFlags,
    ) -> Result<(), HostError> {
        let mut state = self.host("request_data_on_sim_object")?;
        if !state.definitions.contains_key(&define) {
            return Err(HostError::new(
                "request_data_on_sim_object",
                format!("UNRECOGNIZED_ID: {define}"),
            ));
        }
        state.sim_object_requests.push(SimObjectRequest {
            request,
            define,
            object,
            period,
            flags,
        });
        if period != Period::Never
            && let Some(data) = state.auto_responses.get(&define).cloned()
        {
            state.inbound.push_back(Recv::SimObjectData {
                request,
                define,
                object,
                flags: DataRequestFlags::DEFAULT,
                data,
            });
        }
        Ok(())
    }

    fn set_data_on_sim_object(
        &mut self,
        define: DefinitionId,
        _object: ObjectId,
        data: &[u8],
    ) -> Result<(), HostError> {
        let mut state = self.host("set_data_on_sim_object")?;
        let Some(fields) = state.definitions.get(&define) else {
            return Err(HostError::new(
                "set_data_on_sim_object",
                format!("UNRECOGNIZED_ID: {define}"),
            ));
        };
        let expected: usize = fields
            .iter()
            .map(|f| f.data_type.size().unwrap_or(0))
            .sum();
        if data.len() != expected {
            return Err(HostError::new(
                "set_data_on_sim_object",
                format!("SIZE_MISMATCH: expected {expected}, got {}", data.len()),
            ));
        }
        state.writes.push((define, data.to_vec()));
        Ok(())
    }

    fn transmit_client_event(
        &mut self,
        _object: ObjectId,
        event: EventId,
        data: u32,
        _priority: u32,
    ) -> Result<(), HostError> {
        let mut state = self.host("transmit_client_event")?;
        if !state.mapped_events.contains_key(&event) {
            return Err(HostError::new(
                "transmit_client_event",
                format!("UNRECOGNIZED_ID: {event}"),
            ));
        }
        state.transmitted.push((event, data));
        Ok(())
    }

    fn map_client_data_name_to_id(
        &mut self,
        name: &str,
        id: ClientDataId,
    ) -> Result<(), HostError> {
        let mut state = self.host("map_client_data_name_to_id")?;
        if let Some(area) = state.client_data.get(&id)
            && let Some(existing) = &area.name
            && existing != name
        {
            return Err(HostError::new(
                "map_client_data_name_to_id",
                format!("DUPLICATE_ID: {id} is already {existing}"),
            ));
        }
        let area = state.client_data.entry(id).or_insert_with(|| ClientDataArea {
            name: None,
            size: 0,
            data: Vec::new(),
        });
        area.name = Some(name.to_string());
        Ok(())
    }

    fn create_client_data(
        &mut self,
        id: ClientDataId,
        size: usize,
        _read_only: bool,
    ) -> Result<(), HostError> {
        let mut state = self.host("create_client_data")?;
        let Some(area) = state.client_data.get_mut(&id) else {
            return Err(HostError::new(
                "create_client_data",
                format!("UNRECOGNIZED_ID: {id} has no name"),
            ));
        };
        if area.size != 0 && area.size != size {
            return Err(HostError::new(
                "create_client_data",
                format!("ALREADY_CREATED: {id} with {} bytes", area.size),
            ));
        }
        if area.size == 0 {
            area.size = size;
            area.data = vec![0; size];
        }
        Ok(())
    }

    fn add_to_client_data_definition(
        &mut self,
        define: ClientDataDefinitionId,
        offset: usize,
        size: usize,
    ) -> Result<(), HostError> {
        let mut state = self.host("add_to_client_data_definition")?;
        let total = state.client_data_definitions.entry(define).or_default();
        *total = (*total).max(offset + size);
        Ok(())
    }

    fn request_client_data(
        &mut self,
        id: ClientDataId,
        request: RequestId,
        define: ClientDataDefinitionId,
        period: ClientDataPeriod,
    ) -> Result<(), HostError> {
        let mut state = self.host("request_client_data")?;
        if !state.client_data.contains_key(&id)
            || !state.client_data_definitions.contains_key(&define)
        {
            return Err(HostError::new(
                "request_client_data",
                format!("UNRECOGNIZED_ID: {id}/{define}"),
            ));
        }
        state.client_data_requests.push(ClientDataRequest {
            id,
            request,
            define,
            period,
        });
        if period == ClientDataPeriod::Once
            && let Some(data) = state.client_data.get(&id).map(|a| a.data.clone())
        {
            state.inbound.push_back(Recv::ClientData {
                request,
                define,
                data,
            });
        }
        Ok(())
    }

    fn set_client_data(
        &mut self,
        id: ClientDataId,
        define: ClientDataDefinitionId,
        data: &[u8],
    ) -> Result<(), HostError> {
        let mut state = self.host("set_client_data")?;
        let defined = state.client_data_definitions.get(&define).copied();
        let Some(area) = state.client_data.get_mut(&id) else {
            return Err(HostError::new(
                "set_client_data",
                format!("UNRECOGNIZED_ID: {id}"),
            ));
        };
        if defined != Some(data.len()) || area.size != data.len() {
            return Err(HostError::new(
                "set_client_data",
                format!("SIZE_MISMATCH: area holds {} bytes, got {}", area.size, data.len()),
            ));
        }
        area.data = data.to_vec();
        state.notify_on_set(id, data);
        Ok(())
    }

    fn next_dispatch(&mut self) -> Result<Option<Recv>, HostError> {
        let mut state = self.host("next_dispatch")?;
        Ok(state.inbound.pop_front())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Session;

    fn open(host: &SimHost) -> SimHostSession {
        host.clone().open("test").unwrap()
    }

    #[test]
    fn open_queues_an_open_message() {
        let host = SimHost::new();
        let mut session = open(&host);
        assert!(host.is_open());
        assert_eq!(host.client_name().as_deref(), Some("test"));
        assert!(matches!(
            session.next_dispatch().unwrap(),
            Some(Recv::Open { .. })
        ));
        assert_eq!(session.next_dispatch().unwrap(), None);
    }

    #[test]
    fn vocabulary_rejects_unknown_names_and_units() {
        let host = SimHost::new();
        let mut session = open(&host);
        let define = DefinitionId(0);
        session
            .add_to_data_definition(define, "G FORCE", Some("GFORCE"), DataType::Float64, 0)
            .unwrap();
        assert!(
            session
                .add_to_data_definition(define, "G FORCE", Some("FEET"), DataType::Float64, 1)
                .is_err()
        );
        assert!(
            session
                .add_to_data_definition(define, "WARP DRIVE", Some("NUMBER"), DataType::Float64, 1)
                .is_err()
        );
        assert_eq!(host.definition(define).len(), 1);
    }

    #[test]
    fn struct_fields_register_without_unit() {
        let host = SimHost::new();
        let mut session = open(&host);
        session
            .add_to_data_definition(
                DefinitionId(0),
                "STRUCT BODY ROTATION VELOCITY",
                None,
                DataType::Xyz,
                0,
            )
            .unwrap();
        assert_eq!(host.definition(DefinitionId(0))[0].unit, None);
    }

    #[test]
    fn without_simvar_removes_it_from_vocabulary() {
        let host = SimHost::new().without_simvar("G FORCE");
        let mut session = open(&host);
        let err = session
            .add_to_data_definition(DefinitionId(0), "G FORCE", Some("GFORCE"), DataType::Float64, 0)
            .unwrap_err();
        assert!(err.reason.contains("NAME_UNRECOGNIZED"));
    }

    #[test]
    fn fire_event_requires_subscription() {
        let host = SimHost::new();
        let mut session = open(&host);
        assert!(!host.fire_event(Event::ApMaster, 0));

        session
            .map_client_event_to_sim_event(Event::ApMaster.id(), "AP_MASTER")
            .unwrap();
        session
            .add_client_event_to_notification_group(GroupId(1), Event::ApMaster.id(), true)
            .unwrap();
        assert!(host.fire_event(Event::ApMaster, 0));
        assert_eq!(host.subscription(Event::ApMaster), Some((GroupId(1), true)));
    }

    #[test]
    fn client_data_set_echoes_to_on_set_subscribers() {
        let host = SimHost::new();
        let mut session = open(&host);
        let id = ClientDataId(0);
        let define = ClientDataDefinitionId(0);
        session.map_client_data_name_to_id("AREA", id).unwrap();
        session.create_client_data(id, 16, false).unwrap();
        session.add_to_client_data_definition(define, 0, 16).unwrap();
        session
            .request_client_data(id, RequestId(7), define, ClientDataPeriod::OnSet)
            .unwrap();
        while session.next_dispatch().unwrap().is_some() {}

        assert!(session.set_client_data(id, define, &[1u8; 8]).is_err());
        session.set_client_data(id, define, &[1u8; 16]).unwrap();
        assert_eq!(host.client_data(id), Some(vec![1u8; 16]));
        assert!(matches!(
            session.next_dispatch().unwrap(),
            Some(Recv::ClientData { request: RequestId(7), .. })
        ));
    }

    #[test]
    fn configured_failure_surfaces_and_recovers() {
        let host = SimHost::new();
        let mut session = open(&host);
        host.fail("next_dispatch", "pipe broken");
        assert_eq!(
            session.next_dispatch().unwrap_err(),
            HostError::new("next_dispatch", "pipe broken")
        );
        host.recover("next_dispatch");
        assert!(session.next_dispatch().is_ok());
    }

    #[test]
    fn session_guard_closes_on_drop() {
        let host = SimHost::new();
        {
            let _session = Session::new(open(&host));
            assert!(host.is_open());
        }
        assert!(!host.is_open());
    }

    #[test]
    fn session_guard_close_is_idempotent() {
        let host = SimHost::new();
        let mut session = Session::new(open(&host));
        session.close().unwrap();
        session.close().unwrap();
        assert!(!host.is_open());
        assert!(session.next_dispatch().is_err());
    }

    #[test]
    fn reopening_supersedes_the_old_session() {
        let mut host = SimHost::new();
        let mut first = host.open("one").unwrap();
        let _second = host.open("two").unwrap();
        assert!(first.next_dispatch().is_err());
        assert_eq!(host.sessions_opened(), 2);
    }
}
