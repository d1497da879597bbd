//! Cross-module client-data payloads.
//!
//! Each payload is a flat run of little-endian `f64` values whose order is the
//! field order below.  Writers and readers in other modules share this layout
//! out of band, so a payload is always written and read whole.

use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// A fixed-size payload carried by one named client-data channel.
pub trait ClientDataPayload: Copy + Default + PartialEq + std::fmt::Debug {
    /// Host-visible channel name.
    const CHANNEL_NAME: &'static str;
    const FIELD_COUNT: usize;
    const SIZE: usize = Self::FIELD_COUNT * 8;

    fn to_bytes(&self) -> Vec<u8>;

    /// Decode a payload.  The block must be exactly [`Self::SIZE`] bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, BridgeError>;
}

macro_rules! client_payload {
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $channel:literal {
            $( $(#[$fmeta:meta])* $field:ident ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: f64, )*
        }

        impl ClientDataPayload for $name {
            const CHANNEL_NAME: &'static str = $channel;
            const FIELD_COUNT: usize = [$(stringify!($field)),*].len();

            fn to_bytes(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(Self::SIZE);
                $( out.extend_from_slice(&self.$field.to_le_bytes()); )*
                out
            }

            fn from_bytes(bytes: &[u8]) -> Result<Self, BridgeError> {
                if bytes.len() != Self::SIZE {
                    return Err(BridgeError::Layout {
                        record: stringify!($name),
                        expected: Self::SIZE,
                        actual: bytes.len(),
                    });
                }
                let mut values = bytes
                    .chunks_exact(8)
                    .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap_or([0; 8])));
                Ok(Self {
                    $( $field: values.next().unwrap_or_default(), )*
                })
            }
        }
    };
}

client_payload! {
    /// Autopilot state machine output: active/armed modes and targets.
    pub struct ClientDataAutopilotStateMachine = "A32NX_CLIENT_DATA_AUTOPILOT_STATE_MACHINE" {
        enabled,
        lateral_law,
        lateral_mode,
        lateral_mode_armed,
        vertical_law,
        vertical_mode,
        vertical_mode_armed,
        mode_reversion_lateral,
        mode_reversion_vertical,
        mode_reversion_trk_fpa,
        speed_protection_mode,
        autothrust_mode,
        psi_c_deg,
        h_c_ft,
        h_dot_c_fpm,
        fpa_c_deg,
        v_c_kn,
        alt_soft_mode_active,
        exped_mode_active,
        fd_disconnect,
        fd_connect,
    }
}

client_payload! {
    /// Autopilot laws output: attitude commands for autopilot and flight
    /// director.
    pub struct ClientDataAutopilotLaws = "A32NX_CLIENT_DATA_AUTOPILOT_LAWS" {
        enable_autopilot,
        flight_director_theta,
        autopilot_theta,
        flight_director_phi,
        autopilot_phi,
        autopilot_beta,
    }
}

client_payload! {
    /// Autothrust output.
    pub struct ClientDataAutothrust = "A32NX_CLIENT_DATA_AUTOTHRUST" {
        n1_tla_1_percent,
        n1_tla_2_percent,
        is_in_reverse_1,
        is_in_reverse_2,
        thrust_limit_type,
        thrust_limit_percent,
        n1_c_1_percent,
        n1_c_2_percent,
        status,
        mode,
        mode_message,
    }
}

client_payload! {
    /// Flight-management values published for the autopilot modules.
    pub struct ClientDataLocalVariables = "A32NX_CLIENT_DATA_LOCAL_VARIABLES" {
        flight_phase,
        v2_kn,
        vapp_kn,
        vls_kn,
        flight_plan_available,
        altitude_constraint_ft,
        thrust_reduction_altitude,
        thrust_reduction_altitude_go_around,
        acceleration_altitude,
        acceleration_altitude_engine_out,
        acceleration_altitude_go_around,
        cruise_altitude,
        direct_to_trigger,
    }
}

client_payload! {
    /// Inputs published for the autothrust module.
    pub struct ClientDataLocalVariablesAutothrust = "A32NX_CLIENT_DATA_LOCAL_VARIABLES_AUTOTHRUST" {
        athr_push,
        athr_disconnect,
        athr_reset_disable,
        tla_1,
        tla_2,
        v_c_kn,
        v_ls_kn,
        v_max_kn,
        thrust_limit_rev_percent,
        thrust_limit_idle_percent,
        thrust_limit_clb_percent,
        thrust_limit_mct_percent,
        thrust_limit_flex_percent,
        thrust_limit_toga_percent,
        flex_temperature_deg_c,
        mode_requested,
        is_mach_mode_active,
        alpha_floor_condition,
        is_approach_mode_active,
        is_srs_to_mode_active,
        is_srs_ga_mode_active,
        thrust_reduction_altitude,
        thrust_reduction_altitude_go_around,
        flight_phase,
        is_alt_soft_mode_active,
        is_anti_ice_wing_active,
        is_anti_ice_engine_1_active,
        is_anti_ice_engine_2_active,
        is_air_conditioning_1_active,
        is_air_conditioning_2_active,
        fd_active,
    }
}
