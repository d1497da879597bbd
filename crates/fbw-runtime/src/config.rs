//! Bridge configuration – reads/writes `fbw.toml`.
//!
//! The file is optional: every field has a default, and a missing file is not
//! an error.  `FBW_*` environment variables override the file.

use std::fs;
use std::path::{Path, PathBuf};

use fbw_types::{BridgeError, FeatureFlags, input::THROTTLE_AXIS_COUNT};
use serde::{Deserialize, Serialize};

use crate::telemetry::LogConfig;

/// Settings for one bridge process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Name the session announces to the host.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Which optional definitions, events and channels are registered.
    #[serde(default)]
    pub features: FeatureFlags,

    /// Number of throttle-axis mappings handed to `connect` (0..=2).
    #[serde(default = "default_throttle_axis_count")]
    pub throttle_axis_count: usize,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_client_name() -> String {
    "A32NX_FBW".to_string()
}
fn default_throttle_axis_count() -> usize {
    THROTTLE_AXIS_COUNT
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            features: FeatureFlags::default(),
            throttle_axis_count: default_throttle_axis_count(),
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Reject values the bridge cannot honour.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.client_name.trim().is_empty() {
            return Err(BridgeError::Config("client_name must not be empty".into()));
        }
        if self.throttle_axis_count > THROTTLE_AXIS_COUNT {
            return Err(BridgeError::Config(format!(
                "throttle_axis_count {} exceeds {THROTTLE_AXIS_COUNT}",
                self.throttle_axis_count
            )));
        }
        Ok(())
    }
}

/// Path of the config file: `FBW_CONFIG` if set, otherwise `fbw.toml` in the
/// working directory.
pub fn config_path() -> PathBuf {
    std::env::var("FBW_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("fbw.toml"))
}

/// Load the config from [`config_path`], falling back to defaults when the
/// file does not exist.  Environment overrides are applied either way.
///
/// # Errors
///
/// [`BridgeError::Config`] when the file cannot be read, parsed or validated.
pub fn load() -> Result<BridgeConfig, BridgeError> {
    let cfg = match load_from(&config_path())? {
        Some(cfg) => cfg,
        None => {
            let mut cfg = BridgeConfig::default();
            apply_env_overrides(&mut cfg);
            cfg
        }
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Load the config from a specific path.  Returns `None` if the file does not
/// exist.
///
/// # Errors
///
/// [`BridgeError::Config`] when the file cannot be read or parsed.
pub fn load_from(path: &Path) -> Result<Option<BridgeConfig>, BridgeError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        BridgeError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut cfg: BridgeConfig = toml::from_str(&raw)
        .map_err(|e| BridgeError::Config(format!("failed to parse {}: {e}", path.display())))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply `FBW_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `FBW_CLIENT_NAME` | `client_name` |
/// | `FBW_AUTOPILOT_STATE_MACHINE` | `features.autopilot_state_machine` |
/// | `FBW_AUTOPILOT_LAWS` | `features.autopilot_laws` |
/// | `FBW_FLY_BY_WIRE` | `features.fly_by_wire` |
///
/// Unparseable booleans are ignored.
pub fn apply_env_overrides(cfg: &mut BridgeConfig) {
    if let Ok(v) = std::env::var("FBW_CLIENT_NAME") {
        cfg.client_name = v;
    }
    let flags = [
        (
            "FBW_AUTOPILOT_STATE_MACHINE",
            &mut cfg.features.autopilot_state_machine,
        ),
        ("FBW_AUTOPILOT_LAWS", &mut cfg.features.autopilot_laws),
        ("FBW_FLY_BY_WIRE", &mut cfg.features.fly_by_wire),
    ];
    for (var, field) in flags {
        if let Ok(v) = std::env::var(var)
            && let Some(enabled) = parse_bool(&v)
        {
            *field = enabled;
        }
    }
}

/// Write the config to `path`, creating parent directories.
///
/// # Errors
///
/// [`BridgeError::Config`] when the file cannot be written.
pub fn save_to(cfg: &BridgeConfig, path: &Path) -> Result<(), BridgeError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| BridgeError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| BridgeError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)
        .map_err(|e| BridgeError::Config(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::LogFormat;
    use crate::test_env::env_lock;

    #[test]
    fn defaults_match_the_aircraft() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.client_name, "A32NX_FBW");
        assert_eq!(cfg.features, FeatureFlags::ALL);
        assert_eq!(cfg.throttle_axis_count, 2);
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn roundtrip_default_config() {
        let _env = env_lock();
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nested").join("fbw.toml");

        save_to(&BridgeConfig::default(), &path).expect("save");
        let loaded = load_from(&path).expect("load ok").expect("some");

        assert_eq!(loaded.throttle_axis_count, 2);
        assert_eq!(loaded.features, FeatureFlags::ALL);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let _env = env_lock();
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join("fbw.toml")).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let _env = env_lock();
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("fbw.toml");
        std::fs::write(
            &path,
            "throttle_axis_count = 1\n\n[features]\nautopilot_laws = false\n\n[log]\nformat = \"json\"\n",
        )
        .unwrap();

        let cfg = load_from(&path).unwrap().unwrap();
        assert_eq!(cfg.throttle_axis_count, 1);
        assert!(!cfg.features.autopilot_laws);
        assert!(cfg.features.fly_by_wire);
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let _env = env_lock();
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("fbw.toml");
        std::fs::write(&path, "throttle_axis_count = \"two\"").unwrap();
        assert!(matches!(load_from(&path), Err(BridgeError::Config(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let cfg = BridgeConfig {
            throttle_axis_count: 3,
            ..BridgeConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(BridgeError::Config(_))));

        let cfg = BridgeConfig {
            client_name: "  ".into(),
            ..BridgeConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(BridgeConfig::default().validate().is_ok());
    }

    #[test]
    fn apply_env_overrides_changes_client_name() {
        let _env = env_lock();
        // SAFETY: `env_lock` is held; no other test touches the environment meanwhile.
        unsafe { std::env::set_var("FBW_CLIENT_NAME", "A32NX_TEST") };
        let mut cfg = BridgeConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.client_name, "A32NX_TEST");
        unsafe { std::env::remove_var("FBW_CLIENT_NAME") };
    }

    #[test]
    fn apply_env_overrides_changes_feature_flags() {
        let _env = env_lock();
        // SAFETY: `env_lock` is held; no other test touches the environment meanwhile.
        unsafe { std::env::set_var("FBW_FLY_BY_WIRE", "false") };
        let mut cfg = BridgeConfig::default();
        apply_env_overrides(&mut cfg);
        assert!(!cfg.features.fly_by_wire);
        assert!(cfg.features.autopilot_laws);
        unsafe { std::env::remove_var("FBW_FLY_BY_WIRE") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_bool() {
        let _env = env_lock();
        // SAFETY: `env_lock` is held; no other test touches the environment meanwhile.
        unsafe { std::env::set_var("FBW_AUTOPILOT_LAWS", "maybe") };
        let mut cfg = BridgeConfig::default();
        apply_env_overrides(&mut cfg);
        assert!(cfg.features.autopilot_laws);
        unsafe { std::env::remove_var("FBW_AUTOPILOT_LAWS") };
    }

    #[test]
    fn env_overrides_apply_over_file_values() {
        let _env = env_lock();
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("fbw.toml");
        std::fs::write(&path, "[features]\nfly_by_wire = true\n").unwrap();

        // SAFETY: `env_lock` is held; no other test touches the environment meanwhile.
        unsafe { std::env::set_var("FBW_FLY_BY_WIRE", "off") };
        let overridden = load_from(&path).unwrap().unwrap();
        unsafe { std::env::remove_var("FBW_FLY_BY_WIRE") };
        let plain = load_from(&path).unwrap().unwrap();

        assert!(!overridden.features.fly_by_wire);
        assert!(plain.features.fly_by_wire);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
