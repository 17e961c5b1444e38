use crate::provider::{
    procfs, CpuTimes, DiskUsage, HostInfo, Interface, LoadAvg, MemoryInfo, Partition, ProcessRef,
    Provider, ProviderError, TemperatureStat, VirtualMemory,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sysinfo::{
    ComponentExt, CpuExt, DiskExt, Pid, PidExt, Process, ProcessExt, ProcessStatus, System,
    SystemExt,
};
use tracing::debug;

/// `Provider` backed by sysinfo, if-addrs and `/proc`. Every call builds a
/// fresh `System` and refreshes only the part it reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProvider;

impl SysinfoProvider {
    pub fn new() -> Self {
        Self
    }

    fn with_process<T>(
        &self,
        pid: u32,
        read: impl FnOnce(&Process) -> T,
    ) -> Result<T, ProviderError> {
        let mut system = System::new();
        let sys_pid = Pid::from_u32(pid);
        if !system.refresh_process(sys_pid) {
            return Err(ProviderError::NoSuchProcess(pid));
        }
        system
            .process(sys_pid)
            .map(read)
            .ok_or(ProviderError::NoSuchProcess(pid))
    }
}

impl Provider for SysinfoProvider {
    fn host_info(&self) -> Result<HostInfo, ProviderError> {
        let system = System::new();
        let platform_family = procfs::read_platform_family().unwrap_or_else(|err| {
            debug!(error = %err, "семейство платформы недоступно");
            String::new()
        });

        Ok(HostInfo {
            hostname: system.host_name().unwrap_or_default(),
            os: std::env::consts::OS.to_string(),
            platform: system.distribution_id(),
            platform_family,
            platform_version: system.os_version().unwrap_or_default(),
            kernel_arch: std::env::consts::ARCH.to_string(),
            uptime_secs: system.uptime(),
            boot_time_secs: system.boot_time(),
        })
    }

    fn cpu_percent(&self, window: Duration, per_cpu: bool) -> Result<Vec<f64>, ProviderError> {
        let mut system = System::new();
        system.refresh_cpu();
        std::thread::sleep(window);
        system.refresh_cpu();

        if system.cpus().is_empty() {
            return Err(ProviderError::Unavailable("список CPU пуст".to_string()));
        }
        if per_cpu {
            Ok(system
                .cpus()
                .iter()
                .map(|c| c.cpu_usage() as f64)
                .collect())
        } else {
            Ok(vec![system.global_cpu_info().cpu_usage() as f64])
        }
    }

    fn load_avg(&self) -> Result<LoadAvg, ProviderError> {
        let system = System::new();
        let avg = system.load_average();
        Ok(LoadAvg {
            load1: avg.one,
            load5: avg.five,
            load15: avg.fifteen,
        })
    }

    fn virtual_memory(&self) -> Result<VirtualMemory, ProviderError> {
        let mut system = System::new();
        system.refresh_memory();
        let total = system.total_memory();
        if total == 0 {
            return Err(ProviderError::Unavailable("объём памяти равен нулю".to_string()));
        }
        let used = system.used_memory();

        Ok(VirtualMemory {
            total,
            available: system.available_memory(),
            used,
            used_percent: percent(used, total),
        })
    }

    fn partitions(&self) -> Result<Vec<Partition>, ProviderError> {
        match procfs::read_mounts() {
            Err(ProviderError::Unsupported(_)) => Ok(sysinfo_partitions()),
            res => res,
        }
    }

    fn disk_usage(&self, mountpoint: &str) -> Result<DiskUsage, ProviderError> {
        match procfs::read_disk_usage(mountpoint) {
            Err(ProviderError::Unsupported(_)) => sysinfo_disk_usage(mountpoint),
            res => res,
        }
    }

    fn interfaces(&self) -> Result<Vec<Interface>, ProviderError> {
        let addrs = if_addrs::get_if_addrs()
            .map_err(|err| ProviderError::Unavailable(format!("сетевые интерфейсы: {err}")))?;

        let mut out: Vec<Interface> = Vec::new();
        for ifa in addrs {
            let cidr = match &ifa.addr {
                if_addrs::IfAddr::V4(v4) => format!(
                    "{}/{}",
                    v4.ip,
                    v4.netmask.octets().iter().map(|b| b.count_ones()).sum::<u32>()
                ),
                if_addrs::IfAddr::V6(v6) => format!(
                    "{}/{}",
                    v6.ip,
                    v6.netmask.segments().iter().map(|s| s.count_ones()).sum::<u32>()
                ),
            };
            match out.iter_mut().find(|i| i.name == ifa.name) {
                Some(existing) => existing.addrs.push(cidr),
                None => out.push(Interface {
                    name: ifa.name,
                    addrs: vec![cidr],
                }),
            }
        }

        Ok(out)
    }

    fn temperatures(&self) -> Result<Vec<TemperatureStat>, ProviderError> {
        let mut system = System::new();
        system.refresh_components_list();

        Ok(system
            .components()
            .iter()
            .map(|c| TemperatureStat {
                sensor_key: c.label().to_string(),
                // Going through the f32's shortest text keeps 45.3 from
                // widening into 45.29999923706055.
                temperature: c.temperature().to_string().parse().unwrap_or_default(),
            })
            .collect())
    }

    fn process_name(&self, pid: u32) -> Result<String, ProviderError> {
        self.with_process(pid, |p| p.name().to_string())
    }

    fn process_cmdline(&self, pid: u32) -> Result<String, ProviderError> {
        self.with_process(pid, |p| p.cmd().join(" "))
    }

    fn process_cpu_fraction(&self, pid: u32) -> Result<f64, ProviderError> {
        let start_secs = self.with_process(pid, |p| p.start_time())?;
        let times = self.process_times(pid)?;
        let elapsed = now_unix_secs_f64() - start_secs as f64;
        if elapsed <= 0.0 {
            return Ok(0.0);
        }
        Ok(times.total() / elapsed)
    }

    fn process_times(&self, pid: u32) -> Result<CpuTimes, ProviderError> {
        procfs::read_process_times(pid)
    }

    fn process_memory(&self, pid: u32) -> Result<MemoryInfo, ProviderError> {
        let (rss, vms) = self.with_process(pid, |p| (p.memory(), p.virtual_memory()))?;
        let swap = procfs::read_process_swap(pid).unwrap_or_else(|err| {
            debug!(pid, error = %err, "swap процесса недоступен");
            0
        });
        Ok(MemoryInfo { rss, vms, swap })
    }

    fn process_create_time(&self, pid: u32) -> Result<i64, ProviderError> {
        self.with_process(pid, |p| p.start_time() as i64 * 1000)
    }

    fn pid_exists(&self, pid: u32) -> Result<bool, ProviderError> {
        let mut system = System::new();
        Ok(system.refresh_process(Pid::from_u32(pid)))
    }

    fn process_status(&self, pid: u32) -> Result<Vec<String>, ProviderError> {
        self.with_process(pid, |p| vec![status_text(p.status())])
    }

    fn process_ppid(&self, pid: u32) -> Result<u32, ProviderError> {
        self.with_process(pid, |p| p.parent().map(|pp| pp.as_u32()))?
            .ok_or_else(|| ProviderError::Unavailable(format!("у процесса {pid} нет родителя")))
    }

    fn process_parent(&self, pid: u32) -> Result<ProcessRef, ProviderError> {
        let ppid = self.process_ppid(pid)?;
        if !self.pid_exists(ppid)? {
            return Err(ProviderError::NoSuchProcess(ppid));
        }
        Ok(ProcessRef { pid: ppid })
    }

    fn process_children(&self, pid: u32) -> Result<Vec<u32>, ProviderError> {
        let mut system = System::new();
        system.refresh_processes();
        let parent = Pid::from_u32(pid);

        let mut children: Vec<u32> = system
            .processes()
            .values()
            .filter(|p| p.parent() == Some(parent))
            .map(|p| p.pid().as_u32())
            .collect();
        children.sort_unstable();
        Ok(children)
    }
}

fn status_text(status: ProcessStatus) -> String {
    match status {
        ProcessStatus::Run => "running".to_string(),
        ProcessStatus::Sleep => "sleep".to_string(),
        ProcessStatus::Stop => "stop".to_string(),
        ProcessStatus::Idle => "idle".to_string(),
        ProcessStatus::Zombie => "zombie".to_string(),
        ProcessStatus::Dead => "dead".to_string(),
        ProcessStatus::LockBlocked => "lock".to_string(),
        ProcessStatus::UninterruptibleDiskSleep => "wait".to_string(),
        other => other.to_string().to_lowercase(),
    }
}

/// Mounts as sysinfo sees them. Used where the kernel mount table can't be
/// read; sysinfo leaves out pseudo filesystems.
fn sysinfo_partitions() -> Vec<Partition> {
    let mut system = System::new();
    system.refresh_disks_list();

    system
        .disks()
        .iter()
        .map(|d| Partition {
            device: d.name().to_string_lossy().to_string(),
            mountpoint: d.mount_point().to_string_lossy().to_string(),
            fstype: String::from_utf8_lossy(d.file_system()).to_string(),
        })
        .collect()
}

fn sysinfo_disk_usage(mountpoint: &str) -> Result<DiskUsage, ProviderError> {
    let mut system = System::new();
    system.refresh_disks_list();

    let disk = system
        .disks()
        .iter()
        .find(|d| d.mount_point().to_string_lossy() == mountpoint)
        .ok_or_else(|| {
            ProviderError::Unavailable(format!("точка монтирования {mountpoint} исчезла"))
        })?;
    let total = disk.total_space();
    let free = disk.available_space();
    let used = total.saturating_sub(free);

    Ok(DiskUsage {
        path: mountpoint.to_string(),
        total,
        free,
        used,
        used_percent: percent(used, total),
    })
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (used as f64 / total as f64) * 100.0
    }
}

fn now_unix_secs_f64() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
