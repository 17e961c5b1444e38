//! Point-in-time host and process snapshots.
//!
//! Each builder reads the provider once per field, swaps any failure for the
//! field's zero value and returns a typed record. Nothing is remembered
//! between calls.

pub mod cpu;
pub mod host;
pub mod load;
pub mod memory;
pub mod process;

use crate::provider::{Provider, ProviderError};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use cpu::build_cpu;
use host::build_host;
use load::build_load;
use memory::{build_disks, build_memory};
use process::build_process;

pub const DEFAULT_CPU_SAMPLE_WINDOW: Duration = Duration::from_millis(200);
/// SMC key of the CPU package sensor on Intel Macs.
pub const DEFAULT_TEMPERATURE_SENSOR_KEY: &str = "TC0P";

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOptions {
    pub cpu_sample_window: Duration,
    pub temperature_sensor_key: String,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            cpu_sample_window: DEFAULT_CPU_SAMPLE_WINDOW,
            temperature_sensor_key: DEFAULT_TEMPERATURE_SENSOR_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotRequest {
    Host,
    Cpu,
    Load,
    Memory,
    Disk,
    Process(u32),
}

impl SnapshotRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Cpu => "cpu",
            Self::Load => "load",
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Process(_) => "process",
        }
    }

    /// Builds the requested snapshot and returns its JSON wire bytes.
    pub fn build(&self, provider: &dyn Provider, opts: &SnapshotOptions) -> Vec<u8> {
        match *self {
            Self::Host => encode(&build_host(provider, opts)),
            Self::Cpu => encode(&build_cpu(provider, opts)),
            Self::Load => encode(&build_load(provider)),
            Self::Memory => encode(&build_memory(provider)),
            Self::Disk => encode(&build_disks(provider)),
            Self::Process(pid) => encode(&build_process(provider, pid)),
        }
    }
}

pub fn encode<T: Serialize + ?Sized>(record: &T) -> Vec<u8> {
    serde_json::to_vec(record).unwrap_or_else(|err| {
        error!(error = %err, "не удалось сериализовать снимок");
        b"null".to_vec()
    })
}

/// Unwraps a provider result, logging the failure so the caller can fall back
/// to a zero value.
fn fetch<T>(call: &'static str, res: Result<T, ProviderError>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(err) => {
            debug!(call, error = %err, "значение заменено нулевым");
            None
        }
    }
}
