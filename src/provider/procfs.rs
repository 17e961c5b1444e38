use crate::provider::{CpuTimes, DiskUsage, Partition, ProviderError};
#[cfg(target_os = "linux")]
use std::fs;

/// Kernel USER_HZ; fixed at 100 on every mainstream Linux ABI.
#[cfg(any(target_os = "linux", test))]
const CLOCK_TICKS: f64 = 100.0;

#[cfg(target_os = "linux")]
pub fn read_process_times(pid: u32) -> Result<CpuTimes, ProviderError> {
    let path = format!("/proc/{pid}/stat");
    let text = read(&path)?;
    parse_stat_times(&text).ok_or_else(|| ProviderError::Read {
        path,
        message: "неожиданный формат stat".to_string(),
    })
}

#[cfg(not(target_os = "linux"))]
pub fn read_process_times(_pid: u32) -> Result<CpuTimes, ProviderError> {
    Err(ProviderError::Unsupported("процессорное время процесса"))
}

#[cfg(target_os = "linux")]
pub fn read_process_swap(pid: u32) -> Result<u64, ProviderError> {
    let path = format!("/proc/{pid}/status");
    let text = read(&path)?;
    // Kernel threads carry no VmSwap line at all.
    Ok(parse_vm_swap(&text).unwrap_or(0))
}

#[cfg(not(target_os = "linux"))]
pub fn read_process_swap(_pid: u32) -> Result<u64, ProviderError> {
    Err(ProviderError::Unsupported("swap процесса"))
}

#[cfg(target_os = "linux")]
pub fn read_platform_family() -> Result<String, ProviderError> {
    let text = read("/etc/os-release")?;
    Ok(parse_platform_family(&text))
}

#[cfg(not(target_os = "linux"))]
pub fn read_platform_family() -> Result<String, ProviderError> {
    Err(ProviderError::Unsupported("семейство платформы"))
}

/// Every mounted filesystem in kernel order, pseudo and virtual ones included.
#[cfg(target_os = "linux")]
pub fn read_mounts() -> Result<Vec<Partition>, ProviderError> {
    let text = read("/proc/self/mounts")?;
    Ok(parse_mounts(&text))
}

#[cfg(not(target_os = "linux"))]
pub fn read_mounts() -> Result<Vec<Partition>, ProviderError> {
    Err(ProviderError::Unsupported("список точек монтирования"))
}

#[cfg(target_os = "linux")]
pub fn read_disk_usage(mountpoint: &str) -> Result<DiskUsage, ProviderError> {
    use nix::sys::statvfs::statvfs;

    let stats = statvfs(mountpoint).map_err(|err| ProviderError::Read {
        path: mountpoint.to_string(),
        message: err.to_string(),
    })?;

    Ok(usage_from_blocks(
        mountpoint,
        stats.blocks() as u64,
        stats.blocks_free() as u64,
        stats.blocks_available() as u64,
        stats.fragment_size() as u64,
    ))
}

#[cfg(not(target_os = "linux"))]
pub fn read_disk_usage(_mountpoint: &str) -> Result<DiskUsage, ProviderError> {
    Err(ProviderError::Unsupported("statvfs"))
}

#[cfg(target_os = "linux")]
fn read(path: &str) -> Result<String, ProviderError> {
    fs::read_to_string(path).map_err(|err| ProviderError::Read {
        path: path.to_string(),
        message: err.to_string(),
    })
}

/// Fields 1..3 of each `/proc/self/mounts` line. Lines with fewer fields
/// are skipped.
#[cfg(any(target_os = "linux", test))]
fn parse_mounts(text: &str) -> Vec<Partition> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            Some(Partition {
                device: unescape_mount_field(fields.next()?),
                mountpoint: unescape_mount_field(fields.next()?),
                fstype: unescape_mount_field(fields.next()?),
            })
        })
        .collect()
}

/// The kernel writes space, tab, newline and backslash as `\ooo` octal.
#[cfg(any(target_os = "linux", test))]
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let octal = std::str::from_utf8(&bytes[i + 1..i + 4]).ok();
            if let Some(byte) = octal.and_then(|o| u8::from_str_radix(o, 8).ok()) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Used space counts reserved blocks; free space is what an unprivileged
/// user can still allocate. The percentage is taken over their sum.
#[cfg(any(target_os = "linux", test))]
fn usage_from_blocks(path: &str, blocks: u64, bfree: u64, bavail: u64, frsize: u64) -> DiskUsage {
    let total = blocks.saturating_mul(frsize);
    let free = bavail.saturating_mul(frsize);
    let used = blocks.saturating_sub(bfree).saturating_mul(frsize);
    let used_percent = if used.saturating_add(free) == 0 {
        0.0
    } else {
        used as f64 / (used as f64 + free as f64) * 100.0
    };

    DiskUsage {
        path: path.to_string(),
        total,
        free,
        used,
        used_percent,
    }
}

/// Extracts utime, stime and delayacct_blkio_ticks from `/proc/<pid>/stat`.
/// The comm field may contain spaces and parentheses, so fields are counted
/// from the last closing parenthesis.
#[cfg(any(target_os = "linux", test))]
fn parse_stat_times(text: &str) -> Option<CpuTimes> {
    let rest = &text[text.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // fields[0] is field 3 (state) of proc(5).
    let ticks = |field: usize| -> Option<f64> {
        fields.get(field - 3)?.parse::<u64>().ok().map(|v| v as f64 / CLOCK_TICKS)
    };

    Some(CpuTimes {
        user: ticks(14)?,
        system: ticks(15)?,
        idle: 0.0,
        iowait: ticks(42).unwrap_or(0.0),
    })
}

#[cfg(any(target_os = "linux", test))]
fn parse_vm_swap(text: &str) -> Option<u64> {
    let line = text.lines().find(|l| l.starts_with("VmSwap:"))?;
    let kb = line
        .trim_start_matches("VmSwap:")
        .split_whitespace()
        .next()?
        .parse::<u64>()
        .ok()?;
    Some(kb.saturating_mul(1024))
}

#[cfg(any(target_os = "linux", test))]
fn parse_platform_family(text: &str) -> String {
    let value = |key: &str| -> Option<String> {
        text.lines()
            .find_map(|l| l.strip_prefix(key)?.strip_prefix('='))
            .map(|v| v.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    };

    value("ID_LIKE")
        .and_then(|v| v.split_whitespace().next().map(str::to_string))
        .or_else(|| value("ID"))
        .unwrap_or_default()
}
