//! Data-definition registry.
//!
//! Simulation-object records are declared to the host field by field.  The
//! position of a field in its definition is its binary offset and its datum
//! index in tagged blocks, so records are always registered in [`Record::FIELDS`]
//! order.

use std::collections::{BTreeMap, HashSet};

use fbw_simconnect::SimConnect;
use fbw_types::{
    BridgeError, DataType, DefinitionId, Record, RequestId, SimData, SimOutput, SimOutputEtaTrim,
    SimOutputThrottles, SimOutputZetaTrim,
};
use tracing::{debug, warn};

/// Full inbound state snapshot.
pub const SIM_DATA: DefinitionId = DefinitionId(0);
/// Actuator command.
pub const SIM_OUTPUT: DefinitionId = DefinitionId(1);
pub const SIM_OUTPUT_ETA_TRIM: DefinitionId = DefinitionId(2);
pub const SIM_OUTPUT_ZETA_TRIM: DefinitionId = DefinitionId(3);
pub const SIM_OUTPUT_THROTTLES: DefinitionId = DefinitionId(4);

/// Request ID used for every [`SIM_DATA`] read.
pub const SIM_DATA_REQUEST: RequestId = RequestId(0);

/// Per-session record of which fields have been declared to which definition.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    fields: BTreeMap<DefinitionId, Vec<String>>,
    seen: HashSet<(DefinitionId, String)>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one field to `define`.
    ///
    /// Composite datatypes are registered without a unit.  Declaring the same
    /// `(define, name)` pair again is a no-op.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Registration`] when the host rejects the name or unit.
    pub fn add_data_definition<S: SimConnect + ?Sized>(
        &mut self,
        host: &mut S,
        define: DefinitionId,
        data_type: DataType,
        name: &str,
        unit: &str,
    ) -> Result<(), BridgeError> {
        if self.seen.contains(&(define, name.to_string())) {
            return Ok(());
        }
        let unit = if data_type.is_struct() { None } else { Some(unit) };
        let fields = self.fields.entry(define).or_default();
        let datum = fields.len() as u32;

        if let Err(e) = host.add_to_data_definition(define, name, unit, data_type, datum) {
            warn!(definition = %define, name, unit = unit.unwrap_or(""), error = %e, "data definition rejected");
            return Err(BridgeError::registration(
                format!("{define} field {name}"),
                e,
            ));
        }
        debug!(definition = %define, datum, name, unit = unit.unwrap_or(""), "data definition added");
        fields.push(name.to_string());
        self.seen.insert((define, name.to_string()));
        Ok(())
    }

    /// Declare every field of `R` under `define`, stopping at the first
    /// rejection.
    ///
    /// # Errors
    ///
    /// See [`DefinitionRegistry::add_data_definition`].
    pub fn register_record<R: Record, S: SimConnect + ?Sized>(
        &mut self,
        host: &mut S,
        define: DefinitionId,
    ) -> Result<(), BridgeError> {
        for field in R::FIELDS {
            self.add_data_definition(host, define, field.data_type, field.name, field.unit)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`DefinitionRegistry::add_data_definition`].
    pub fn prepare_sim_data_definitions<S: SimConnect + ?Sized>(
        &mut self,
        host: &mut S,
    ) -> Result<(), BridgeError> {
        self.register_record::<SimData, _>(host, SIM_DATA)
    }

    /// Declare the actuator, trim and throttle command records.
    ///
    /// # Errors
    ///
    /// See [`DefinitionRegistry::add_data_definition`].
    pub fn prepare_sim_output_definitions<S: SimConnect + ?Sized>(
        &mut self,
        host: &mut S,
    ) -> Result<(), BridgeError> {
        self.register_record::<SimOutput, _>(host, SIM_OUTPUT)?;
        self.register_record::<SimOutputEtaTrim, _>(host, SIM_OUTPUT_ETA_TRIM)?;
        self.register_record::<SimOutputZetaTrim, _>(host, SIM_OUTPUT_ZETA_TRIM)?;
        self.register_record::<SimOutputThrottles, _>(host, SIM_OUTPUT_THROTTLES)
    }

    /// Definitions with at least one declared field, in ID order.
    pub fn definitions(&self) -> Vec<DefinitionId> {
        self.fields
            .iter()
            .filter(|(_, fields)| !fields.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Field names declared under `define`, in datum order.
    pub fn fields(&self, define: DefinitionId) -> &[String] {
        self.fields.get(&define).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, define: DefinitionId) -> bool {
        !self.fields(define).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbw_simconnect::{Connector, SimHost};

    #[test]
    fn sim_data_fields_register_in_declaration_order() {
        let host = SimHost::new();
        let mut session = host.clone().open("test").unwrap();
        let mut registry = DefinitionRegistry::new();

        registry.prepare_sim_data_definitions(&mut session).unwrap();

        let registered = host.definition(SIM_DATA);
        assert_eq!(registered.len(), SimData::FIELDS.len());
        for (datum, (field, spec)) in registered.iter().zip(SimData::FIELDS).enumerate() {
            assert_eq!(field.name, spec.name);
            assert_eq!(field.datum, datum as u32);
        }
    }

    fn registered(host: &SimHost, define: DefinitionId) -> Vec<(String, Option<String>)> {
        host.definition(define)
            .into_iter()
            .map(|f| (f.name, f.unit))
            .collect()
    }

    fn pairs(expected: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        expected
            .iter()
            .map(|(name, unit)| (name.to_string(), unit.map(str::to_string)))
            .collect()
    }

    #[test]
    fn output_records_use_host_simvar_names_and_units() {
        let host = SimHost::new();
        let mut session = host.clone().open("test").unwrap();
        DefinitionRegistry::new()
            .prepare_sim_output_definitions(&mut session)
            .unwrap();

        assert_eq!(
            registered(&host, SIM_OUTPUT),
            pairs(&[
                ("ELEVATOR POSITION", Some("POSITION")),
                ("AILERON POSITION", Some("POSITION")),
                ("RUDDER POSITION", Some("POSITION")),
            ])
        );
        assert_eq!(
            registered(&host, SIM_OUTPUT_ETA_TRIM),
            pairs(&[("ELEVATOR TRIM POSITION", Some("DEGREE"))])
        );
        assert_eq!(
            registered(&host, SIM_OUTPUT_ZETA_TRIM),
            pairs(&[("RUDDER TRIM PCT", Some("PERCENT OVER 100"))])
        );
        assert_eq!(
            registered(&host, SIM_OUTPUT_THROTTLES),
            pairs(&[
                ("GENERAL ENG THROTTLE LEVER POSITION:1", Some("PERCENT")),
                ("GENERAL ENG THROTTLE LEVER POSITION:2", Some("PERCENT")),
            ])
        );
    }

    #[test]
    fn sim_data_offsets_match_host_simvar_names_and_units() {
        let host = SimHost::new();
        let mut session = host.clone().open("test").unwrap();
        DefinitionRegistry::new()
            .prepare_sim_data_definitions(&mut session)
            .unwrap();

        let fields = registered(&host, SIM_DATA);
        assert_eq!(fields.len(), 61);
        let expected = [
            (0, "G FORCE", Some("GFORCE")),
            (1, "PLANE PITCH DEGREES", Some("DEGREE")),
            (2, "PLANE BANK DEGREES", Some("DEGREE")),
            (3, "STRUCT BODY ROTATION VELOCITY", None),
            (4, "STRUCT BODY ROTATION ACCELERATION", None),
            (9, "RUDDER TRIM PCT", Some("PERCENT OVER 100")),
            (13, "AIRSPEED INDICATED", Some("KNOTS")),
            (16, "PLANE ALTITUDE", Some("FEET")),
            (19, "VERTICAL SPEED", Some("FEET PER MINUTE")),
            (60, "SIMULATION RATE", Some("NUMBER")),
        ];
        for (datum, name, unit) in expected {
            assert_eq!(
                fields[datum],
                (name.to_string(), unit.map(str::to_string)),
                "datum {datum}"
            );
        }
    }

    #[test]
    fn struct_fields_register_without_unit() {
        let host = SimHost::new();
        let mut session = host.clone().open("test").unwrap();
        let mut registry = DefinitionRegistry::new();

        registry.prepare_sim_data_definitions(&mut session).unwrap();

        let velocity = host
            .definition(SIM_DATA)
            .into_iter()
            .find(|f| f.name == "STRUCT BODY ROTATION VELOCITY")
            .unwrap();
        assert_eq!(velocity.unit, None);
        assert_eq!(velocity.data_type, DataType::Xyz);
    }

    #[test]
    fn repeated_field_is_not_declared_twice() {
        let host = SimHost::new();
        let mut session = host.clone().open("test").unwrap();
        let mut registry = DefinitionRegistry::new();

        for _ in 0..2 {
            registry
                .add_data_definition(&mut session, SIM_DATA, DataType::Float64, "G FORCE", "GFORCE")
                .unwrap();
        }
        assert_eq!(host.definition(SIM_DATA).len(), 1);
        assert_eq!(registry.fields(SIM_DATA), ["G FORCE".to_string()]);
    }

    #[test]
    fn unknown_field_is_a_registration_error() {
        let host = SimHost::new().without_simvar("RUDDER TRIM PCT");
        let mut session = host.clone().open("test").unwrap();
        let mut registry = DefinitionRegistry::new();

        let err = registry
            .prepare_sim_output_definitions(&mut session)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Registration { ref what, .. } if what.contains("RUDDER TRIM PCT")));
        assert!(!registry.contains(SIM_OUTPUT_ZETA_TRIM));
        assert!(registry.contains(SIM_OUTPUT_ETA_TRIM));
    }

    #[test]
    fn output_records_use_distinct_definitions() {
        let host = SimHost::new();
        let mut session = host.clone().open("test").unwrap();
        let mut registry = DefinitionRegistry::new();

        registry.prepare_sim_output_definitions(&mut session).unwrap();
        assert_eq!(
            registry.definitions(),
            vec![
                SIM_OUTPUT,
                SIM_OUTPUT_ETA_TRIM,
                SIM_OUTPUT_ZETA_TRIM,
                SIM_OUTPUT_THROTTLES
            ]
        );
        assert_eq!(host.definition(SIM_OUTPUT_THROTTLES).len(), 2);
    }
}
