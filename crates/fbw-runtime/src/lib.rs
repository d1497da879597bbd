//! `fbw-runtime` – Process Glue
//!
//! Everything a host process needs around the bridge that is not the bridge
//! itself.
//!
//! # Modules
//!
//! - [`config`] – [`BridgeConfig`][config::BridgeConfig]: client name,
//!   feature flags, throttle-axis count and logging, read from `fbw.toml`
//!   with `FBW_*` environment overrides.  A missing file means defaults.
//! - [`cycle`] – [`CycleRunner`][cycle::CycleRunner]: a reference driver that
//!   runs the request, read, step, send and reset protocol once per tick
//!   against any [`ControlLaw`][cycle::ControlLaw].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to Jaeger, Grafana Tempo, or any OTLP-compatible collector.

pub mod config;
pub mod cycle;
pub mod telemetry;

#[cfg(test)]
mod test_env {
    use std::sync::{Mutex, MutexGuard};

    /// Serialises tests that read or write process environment variables;
    /// the harness runs tests on parallel threads of one process.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub use config::BridgeConfig;
pub use cycle::{ControlLaw, CycleOutputs, CycleRunner, CycleStats};
pub use telemetry::{LogConfig, LogFormat, TracerProviderGuard, init_tracing};
