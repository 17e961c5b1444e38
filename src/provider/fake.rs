use crate::provider::{
    CpuTimes, DiskUsage, HostInfo, Interface, LoadAvg, MemoryInfo, Partition, ProcessRef,
    Provider, ProviderError, TemperatureStat, VirtualMemory,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted process entry; every field can be made to fail on its own.
#[derive(Debug, Clone)]
pub struct FakeProcess {
    pub name: Result<String, ProviderError>,
    pub cmdline: Result<String, ProviderError>,
    pub cpu_fraction: Result<f64, ProviderError>,
    pub times: Result<CpuTimes, ProviderError>,
    pub memory: Result<MemoryInfo, ProviderError>,
    pub create_time_ms: Result<i64, ProviderError>,
    pub status: Result<Vec<String>, ProviderError>,
    pub ppid: Result<u32, ProviderError>,
    pub children: Result<Vec<u32>, ProviderError>,
}

impl FakeProcess {
    pub fn new(name: &str, ppid: u32) -> Self {
        Self {
            name: Ok(name.to_string()),
            cmdline: Ok(format!("/usr/bin/{name}")),
            cpu_fraction: Ok(0.0),
            times: Ok(CpuTimes::default()),
            memory: Ok(MemoryInfo::default()),
            create_time_ms: Ok(0),
            status: Ok(vec!["sleep".to_string()]),
            ppid: Ok(ppid),
            children: Ok(Vec::new()),
        }
    }

    /// Entry whose every accessor fails, as for a process that exited after
    /// its pid was handed out.
    pub fn vanished(pid: u32) -> Self {
        let gone = ProviderError::NoSuchProcess(pid);
        Self {
            name: Err(gone.clone()),
            cmdline: Err(gone.clone()),
            cpu_fraction: Err(gone.clone()),
            times: Err(gone.clone()),
            memory: Err(gone.clone()),
            create_time_ms: Err(gone.clone()),
            status: Err(gone.clone()),
            ppid: Err(gone.clone()),
            children: Err(gone),
        }
    }
}

pub struct FakeProvider {
    pub host: Result<HostInfo, ProviderError>,
    pub cpu_total: Result<Vec<f64>, ProviderError>,
    pub cpu_per_core: Result<Vec<f64>, ProviderError>,
    pub load: Result<LoadAvg, ProviderError>,
    pub memory: Result<VirtualMemory, ProviderError>,
    pub partitions: Result<Vec<Partition>, ProviderError>,
    pub usage: HashMap<String, Result<DiskUsage, ProviderError>>,
    pub interfaces: Result<Vec<Interface>, ProviderError>,
    pub temperatures: Result<Vec<TemperatureStat>, ProviderError>,
    pub processes: HashMap<u32, FakeProcess>,
    pub cpu_calls: Mutex<Vec<(Duration, bool)>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        let unavailable = || ProviderError::Unavailable("не задано в тесте".to_string());
        Self {
            host: Err(unavailable()),
            cpu_total: Err(unavailable()),
            cpu_per_core: Err(unavailable()),
            load: Err(unavailable()),
            memory: Err(unavailable()),
            partitions: Err(unavailable()),
            usage: HashMap::new(),
            interfaces: Err(unavailable()),
            temperatures: Err(unavailable()),
            processes: HashMap::new(),
            cpu_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeProvider {
    pub fn with_process(mut self, pid: u32, process: FakeProcess) -> Self {
        self.processes.insert(pid, process);
        self
    }

    pub fn cpu_calls(&self) -> Vec<(Duration, bool)> {
        self.cpu_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn process<T: Clone>(
        &self,
        pid: u32,
        field: impl FnOnce(&FakeProcess) -> &Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        match self.processes.get(&pid) {
            Some(p) => field(p).clone(),
            None => Err(ProviderError::NoSuchProcess(pid)),
        }
    }
}

impl Provider for FakeProvider {
    fn host_info(&self) -> Result<HostInfo, ProviderError> {
        self.host.clone()
    }

    fn cpu_percent(&self, window: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError> {
        if let Ok(mut calls) = self.cpu_calls.lock() {
            calls.push((window, per_cpu));
        }
        if per_cpu {
            self.cpu_per_core.clone()
        } else {
            self.cpu_total.clone()
        }
    }

    fn load_avg(&self) -> Result<LoadAvg, ProviderError> {
        self.load.clone()
    }

    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError> {
        self.memory.clone()
    }

    fn partitions(&self) -> Result<Vec<Partition>, ProviderError> {
        self.partitions.clone()
    }

    fn disk_usage(&self, mountpoint: &str) -> Result<DiskUsage, ProviderError> {
        self.usage.get(mountpoint).cloned().unwrap_or_else(|| {
            Err(ProviderError::Unavailable(format!(
                "нет данных для {mountpoint}"
            )))
        })
    }

    fn interfaces(&self) -> Result<Vec<Interface>, ProviderError> {
        self.interfaces.clone()
    }

    fn temperatures(&self) -> Result<Vec<TemperatureStat>, ProviderError> {
        self.temperatures.clone()
    }

    fn process_name(&self, pid: u32) -> Result<String, ProviderError> {
        self.process(pid, |p| &p.name)
    }

    fn process_cmdline(&self, pid: u32) -> Result<String, ProviderError> {
        self.process(pid, |p| &p.cmdline)
    }

    fn process_cpu_fraction(&self, pid: u32) -> Result<f64, ProviderError> {
        self.process(pid, |p| &p.cpu_fraction)
    }

    fn process_times(&self, pid: u32) -> Result<CpuTimes, ProviderError> {
        self.process(pid, |p| &p.times)
    }

    fn process_memory(&self, pid: u32) -> Result<MemoryInfo, ProviderError> {
        self.process(pid, |p| &p.memory)
    }

    fn process_create_time(&self, pid: u32) -> Result<i64, ProviderError> {
        self.process(pid, |p| &p.create_time_ms)
    }

    fn pid_exists(&self, pid: u32) -> Result<bool, ProviderError> {
        Ok(self.processes.get(&pid).is_some_and(|p| p.name.is_ok()))
    }

    fn process_status(&self, pid: u32) -> Result<Vec<String>, ProviderError> {
        self.process(pid, |p| &p.status)
    }

    fn process_ppid(&self, pid: u32) -> Result<u32, ProviderError> {
        self.process(pid, |p| &p.ppid)
    }

    fn process_parent(&self, pid: u32) -> Result<ProcessRef, ProviderError> {
        let ppid = self.process_ppid(pid)?;
        if !self.pid_exists(ppid)? {
            return Err(ProviderError::NoSuchProcess(ppid));
        }
        Ok(ProcessRef { pid: ppid })
    }

    fn process_children(&self, pid: u32) -> Result<Vec<u32>, ProviderError> {
        self.process(pid, |p| &p.children)
    }
}
