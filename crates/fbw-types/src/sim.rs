//! Simulation-object records: the full inbound state snapshot and the
//! outbound actuator, trim and throttle commands.
//!
//! Field names and units are the host's simulation-variable vocabulary and
//! must not be altered.

use crate::record::{Xyz, record};

record! {
    /// Full inbound aircraft state, read once per cycle.
    pub struct SimData {
        nz_g: f64 => ("G FORCE", "GFORCE"),
        theta_deg: f64 => ("PLANE PITCH DEGREES", "DEGREE"),
        phi_deg: f64 => ("PLANE BANK DEGREES", "DEGREE"),
        body_rotation_velocity: Xyz => ("STRUCT BODY ROTATION VELOCITY", "DEGREE PER SECOND"),
        body_rotation_acceleration: Xyz => ("STRUCT BODY ROTATION ACCELERATION", "DEGREE PER SECOND SQUARED"),
        eta_pos: f64 => ("ELEVATOR POSITION", "POSITION"),
        eta_trim_deg: f64 => ("ELEVATOR TRIM POSITION", "DEGREE"),
        xi_pos: f64 => ("AILERON POSITION", "POSITION"),
        zeta_pos: f64 => ("RUDDER POSITION", "POSITION"),
        zeta_trim_pos: f64 => ("RUDDER TRIM PCT", "PERCENT OVER 100"),
        alpha_deg: f64 => ("INCIDENCE ALPHA", "DEGREE"),
        beta_deg: f64 => ("INCIDENCE BETA", "DEGREE"),
        beta_dot_deg_s: f64 => ("BETA DOT", "DEGREE PER SECOND"),
        v_ias_kn: f64 => ("AIRSPEED INDICATED", "KNOTS"),
        v_tas_kn: f64 => ("AIRSPEED TRUE", "KNOTS"),
        v_mach: f64 => ("AIRSPEED MACH", "MACH"),
        h_ft: f64 => ("PLANE ALTITUDE", "FEET"),
        h_ind_ft: f64 => ("INDICATED ALTITUDE", "FEET"),
        h_radio_ft: f64 => ("PLANE ALT ABOVE GROUND MINUS CG", "FEET"),
        h_dot_fpm: f64 => ("VERTICAL SPEED", "FEET PER MINUTE"),
        cg_percent_mac: f64 => ("CG PERCENT", "PERCENT"),
        total_weight_kg: f64 => ("TOTAL WEIGHT", "KILOGRAMS"),
        gear_animation_pos_0: f64 => ("GEAR ANIMATION POSITION:0", "NUMBER"),
        gear_animation_pos_1: f64 => ("GEAR ANIMATION POSITION:1", "NUMBER"),
        gear_animation_pos_2: f64 => ("GEAR ANIMATION POSITION:2", "NUMBER"),
        flaps_handle_index: f64 => ("FLAPS HANDLE INDEX", "NUMBER"),
        spoilers_left_pos: f64 => ("SPOILERS LEFT POSITION", "POSITION"),
        spoilers_right_pos: f64 => ("SPOILERS RIGHT POSITION", "POSITION"),
        autopilot_master_on: f64 => ("AUTOPILOT MASTER", "BOOL"),
        slew_on: f64 => ("IS SLEW ACTIVE", "BOOL"),
        pause_on: f64 => ("SIM DISABLED", "BOOL"),
        on_ground: f64 => ("SIM ON GROUND", "BOOL"),
        psi_magnetic_deg: f64 => ("PLANE HEADING DEGREES MAGNETIC", "DEGREE"),
        psi_magnetic_track_deg: f64 => ("GPS GROUND MAGNETIC TRACK", "DEGREE"),
        psi_true_deg: f64 => ("PLANE HEADING DEGREES TRUE", "DEGREE"),
        bx_m_s2: f64 => ("ACCELERATION BODY X", "METERS PER SECOND SQUARED"),
        by_m_s2: f64 => ("ACCELERATION BODY Y", "METERS PER SECOND SQUARED"),
        bz_m_s2: f64 => ("ACCELERATION BODY Z", "METERS PER SECOND SQUARED"),
        nav_valid: f64 => ("NAV HAS NAV:3", "BOOL"),
        nav_loc_deg: f64 => ("NAV LOCALIZER:3", "DEGREES"),
        nav_radial_error_deg: f64 => ("NAV RADIAL ERROR:3", "DEGREES"),
        nav_dme_valid: f64 => ("NAV HAS DME:3", "BOOL"),
        nav_dme_nmi: f64 => ("NAV DME:3", "NAUTICAL MILES"),
        nav_gs_valid: f64 => ("NAV HAS GLIDE SLOPE:3", "BOOL"),
        nav_gs_error_deg: f64 => ("NAV GLIDE SLOPE ERROR:3", "DEGREES"),
        flight_guidance_xtk_nmi: f64 => ("GPS WP CROSS TRK", "NAUTICAL MILES"),
        flight_guidance_tae_deg: f64 => ("GPS WP TRACK ANGLE ERROR", "DEGREES"),
        ambient_temperature_celsius: f64 => ("AMBIENT TEMPERATURE", "CELSIUS"),
        ambient_pressure_mbar: f64 => ("AMBIENT PRESSURE", "MILLIBARS"),
        ambient_wind_velocity_kn: f64 => ("AMBIENT WIND VELOCITY", "KNOTS"),
        ambient_wind_direction_deg: f64 => ("AMBIENT WIND DIRECTION", "DEGREES"),
        total_air_temperature_celsius: f64 => ("TOTAL AIR TEMPERATURE", "CELSIUS"),
        latitude_deg: f64 => ("PLANE LATITUDE", "DEGREES"),
        longitude_deg: f64 => ("PLANE LONGITUDE", "DEGREES"),
        engine_1_thrust_lbf: f64 => ("TURB ENG JET THRUST:1", "POUNDS"),
        engine_2_thrust_lbf: f64 => ("TURB ENG JET THRUST:2", "POUNDS"),
        engine_1_n1_percent: f64 => ("TURB ENG CORRECTED N1:1", "PERCENT"),
        engine_2_n1_percent: f64 => ("TURB ENG CORRECTED N1:2", "PERCENT"),
        engine_1_throttle_lever_percent: f64 => ("GENERAL ENG THROTTLE LEVER POSITION:1", "PERCENT"),
        engine_2_throttle_lever_percent: f64 => ("GENERAL ENG THROTTLE LEVER POSITION:2", "PERCENT"),
        simulation_rate: f64 => ("SIMULATION RATE", "NUMBER"),
    }
}

record! {
    /// Primary flight-control surface commands, each in −1..1.
    pub struct SimOutput {
        eta: f64 => ("ELEVATOR POSITION", "POSITION"),
        xi: f64 => ("AILERON POSITION", "POSITION"),
        zeta: f64 => ("RUDDER POSITION", "POSITION"),
    }
}

record! {
    /// Pitch trim command.
    pub struct SimOutputEtaTrim {
        eta_trim_deg: f64 => ("ELEVATOR TRIM POSITION", "DEGREE"),
    }
}

record! {
    /// Rudder trim command.
    pub struct SimOutputZetaTrim {
        zeta_trim_pos: f64 => ("RUDDER TRIM PCT", "PERCENT OVER 100"),
    }
}

record! {
    /// Per-engine throttle lever commands in percent.
    pub struct SimOutputThrottles {
        throttle_lever_position_1: f64 => ("GENERAL ENG THROTTLE LEVER POSITION:1", "PERCENT"),
        throttle_lever_position_2: f64 => ("GENERAL ENG THROTTLE LEVER POSITION:2", "PERCENT"),
    }
}
