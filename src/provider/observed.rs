use crate::metrics::Metrics;
use crate::provider::{
    CpuTimes, DiskUsage, HostInfo, Interface, LoadAvg, MemoryInfo, Partition, ProcessRef,
    Provider, ProviderError, TemperatureStat, VirtualMemory,
};
use std::sync::Arc;
use std::time::Duration;

/// Forwards to the wrapped provider and counts every failed call in
/// `hostsnap_provider_errors_total`.
pub struct ObservedProvider<P> {
    inner: P,
    metrics: Arc<Metrics>,
}

impl<P: Provider> ObservedProvider<P> {
    pub fn new(inner: P, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }

    fn observe<T>(&self, call: &str, res: Result<T, ProviderError>) -> Result<T, ProviderError> {
        if res.is_err() {
            self.metrics.inc_provider_error(call);
        }
        res
    }
}

impl<P: Provider> Provider for ObservedProvider<P> {
    fn host_info(&self) -> Result<HostInfo, ProviderError> {
        self.observe("host_info", self.inner.host_info())
    }

    fn cpu_percent(&self, window: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError> {
        self.observe("cpu_percent", self.inner.cpu_percent(window, per_cpu))
    }

    fn load_avg(&self) -> Result<LoadAvg, ProviderError> {
        self.observe("load_avg", self.inner.load_avg())
    }

    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError> {
        self.observe("virtual_memory", self.inner.virtual_memory())
    }

    fn partitions(&self) -> Result<Vec<Partition>, ProviderError> {
        self.observe("partitions", self.inner.partitions())
    }

    fn disk_usage(&self, mountpoint: &str) -> Result<DiskUsage, ProviderError> {
        self.observe("disk_usage", self.inner.disk_usage(mountpoint))
    }

    fn interfaces(&self) -> Result<Vec<Interface>, ProviderError> {
        self.observe("interfaces", self.inner.interfaces())
    }

    fn temperatures(&self) -> Result<Vec<TemperatureStat>, ProviderError> {
        self.observe("temperatures", self.inner.temperatures())
    }

    fn process_name(&self, pid: u32) -> Result<String, ProviderError> {
        self.observe("process_name", self.inner.process_name(pid))
    }

    fn process_cmdline(&self, pid: u32) -> Result<String, ProviderError> {
        self.observe("process_cmdline", self.inner.process_cmdline(pid))
    }

    fn process_cpu_fraction(&self, pid: u32) -> Result<f64, ProviderError> {
        self.observe("process_cpu_fraction", self.inner.process_cpu_fraction(pid))
    }

    fn process_times(&self, pid: u32) -> Result<CpuTimes, ProviderError> {
        self.observe("process_times", self.inner.process_times(pid))
    }

    fn process_memory(&self, pid: u32) -> Result<MemoryInfo, ProviderError> {
        self.observe("process_memory", self.inner.process_memory(pid))
    }

    fn process_create_time(&self, pid: u32) -> Result<i64, ProviderError> {
        self.observe("process_create_time", self.inner.process_create_time(pid))
    }

    fn pid_exists(&self, pid: u32) -> Result<bool, ProviderError> {
        self.observe("pid_exists", self.inner.pid_exists(pid))
    }

    fn process_status(&self, pid: u32) -> Result<Vec<String>, ProviderError> {
        self.observe("process_status", self.inner.process_status(pid))
    }

    fn process_ppid(&self, pid: u32) -> Result<u32, ProviderError> {
        self.observe("process_ppid", self.inner.process_ppid(pid))
    }

    fn process_parent(&self, pid: u32) -> Result<ProcessRef, ProviderError> {
        self.observe("process_parent", self.inner.process_parent(pid))
    }

    fn process_children(&self, pid: u32) -> Result<Vec<u32>, ProviderError> {
        self.observe("process_children", self.inner.process_children(pid))
    }
}
