pub mod observed;
pub mod procfs;
pub mod system;

#[cfg(test)]
pub mod fake;

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("процесс {0} не найден")]
    NoSuchProcess(u32),
    #[error("не поддерживается на этой платформе: {0}")]
    Unsupported(&'static str),
    #[error("не удалось прочитать {path}: {message}")]
    Read { path: String, message: String },
    #[error("данные недоступны: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub platform_family: String,
    pub platform_version: String,
    pub kernel_arch: String,
    pub uptime_secs: u64,
    pub boot_time_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAvg {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskUsage {
    pub path: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
}

/// One network interface with its addresses in `ip/prefix` form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    pub name: String,
    pub addrs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureStat {
    pub sensor_key: String,
    pub temperature: f64,
}

/// Per-process CPU time in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: f64,
}

impl CpuTimes {
    pub fn total(&self) -> f64 {
        self.user + self.system + self.idle + self.iowait
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryInfo {
    pub rss: u64,
    pub vms: u64,
    pub swap: u64,
}

/// Non-owning reference to a process. Only the pid is kept; the process
/// may be gone by the time anyone looks it up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessRef {
    pub pid: u32,
}

/// Raw OS/process readings. Implementations answer each call from current
/// OS state and keep nothing between calls.
pub trait Provider: Send + Sync {
    fn host_info(&self) -> Result<HostInfo, ProviderError>;

    /// Utilization over `window`: a single aggregate value, or one value per
    /// core in core index order when `per_cpu` is set.
    fn cpu_percent(&self, window: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError>;

    fn load_avg(&self) -> Result<LoadAvg, ProviderError>;

    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError>;

    fn partitions(&self) -> Result<Vec<Partition>, ProviderError>;

    fn disk_usage(&self, mountpoint: &str) -> Result<DiskUsage, ProviderError>;

    fn interfaces(&self) -> Result<Vec<Interface>, ProviderError>;

    fn temperatures(&self) -> Result<Vec<TemperatureStat>, ProviderError>;

    fn process_name(&self, pid: u32) -> Result<String, ProviderError>;

    fn process_cmdline(&self, pid: u32) -> Result<String, ProviderError>;

    /// CPU time consumed since start divided by wall time since start.
    fn process_cpu_fraction(&self, pid: u32) -> Result<f64, ProviderError>;

    fn process_times(&self, pid: u32) -> Result<CpuTimes, ProviderError>;

    fn process_memory(&self, pid: u32) -> Result<MemoryInfo, ProviderError>;

    /// Milliseconds since the Unix epoch.
    fn process_create_time(&self, pid: u32) -> Result<i64, ProviderError>;

    fn pid_exists(&self, pid: u32) -> Result<bool, ProviderError>;

    fn process_status(&self, pid: u32) -> Result<Vec<String>, ProviderError>;

    fn process_ppid(&self, pid: u32) -> Result<u32, ProviderError>;

    fn process_parent(&self, pid: u32) -> Result<ProcessRef, ProviderError>;

    fn process_children(&self, pid: u32) -> Result<Vec<u32>, ProviderError>;
}
