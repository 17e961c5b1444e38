use super::fetch;
use crate::provider::{CpuTimes, ProcessRef, Provider};
use crate::units::{format_bytes, format_timestamp, round_to};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub ppid: u32,
    /// Weak reference, serialized as `{"pid": n}`; `null` when the parent
    /// can't be resolved.
    pub parent: Option<ProcessRef>,
    pub name: String,
    pub cmdline: String,
    pub create_time: String,
    pub is_exists: bool,
    pub status: String,
    pub cpu_percent: f64,
    pub cpu_total: f64,
    pub cpu_user: f64,
    pub cpu_system: f64,
    pub cpu_idle: f64,
    pub cpu_iowait: f64,
    pub vms: String,
    pub rss: String,
    pub swap: String,
    pub children: ProcessChildren,
}

/// Index-aligned child lists; a child whose lookups fail keeps its slot with
/// empty text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessChildren {
    pub names: Vec<String>,
    pub pids: Vec<u32>,
    pub cmdlines: Vec<String>,
}

/// Reads every field independently; a failing field is zeroed and the rest
/// are still filled in. The pid is not checked up front.
pub fn build_process(provider: &dyn Provider, pid: u32) -> ProcessSnapshot {
    let times = fetch("process_times", provider.process_times(pid));
    let CpuTimes {
        user,
        system,
        idle,
        iowait,
    } = times.unwrap_or_default();
    let memory = fetch("process_memory", provider.process_memory(pid));

    ProcessSnapshot {
        pid,
        ppid: fetch("process_ppid", provider.process_ppid(pid)).unwrap_or_default(),
        parent: fetch("process_parent", provider.process_parent(pid)),
        name: fetch("process_name", provider.process_name(pid)).unwrap_or_default(),
        cmdline: fetch("process_cmdline", provider.process_cmdline(pid)).unwrap_or_default(),
        create_time: fetch("process_create_time", provider.process_create_time(pid))
            .map(|ms| format_timestamp(ms / 1000))
            .unwrap_or_default(),
        is_exists: fetch("pid_exists", provider.pid_exists(pid)).unwrap_or_default(),
        status: fetch("process_status", provider.process_status(pid))
            .map(|flags| flags.join(", "))
            .unwrap_or_default(),
        cpu_percent: fetch("process_cpu_fraction", provider.process_cpu_fraction(pid))
            .map(|fraction| round_to(fraction * 100.0, 1))
            .unwrap_or_default(),
        cpu_total: times.map(|t| round_to(t.total(), 2)).unwrap_or_default(),
        cpu_user: user,
        cpu_system: system,
        cpu_idle: idle,
        cpu_iowait: iowait,
        vms: memory.map(|m| format_bytes(m.vms)).unwrap_or_default(),
        rss: memory.map(|m| format_bytes(m.rss)).unwrap_or_default(),
        swap: memory.map(|m| format_bytes(m.swap)).unwrap_or_default(),
        children: children(provider, pid),
    }
}

fn children(provider: &dyn Provider, pid: u32) -> ProcessChildren {
    let pids = fetch("process_children", provider.process_children(pid)).unwrap_or_default();
    let mut out = ProcessChildren {
        names: Vec::with_capacity(pids.len()),
        pids: Vec::with_capacity(pids.len()),
        cmdlines: Vec::with_capacity(pids.len()),
    };

    for child in pids {
        out.names
            .push(fetch("process_name", provider.process_name(child)).unwrap_or_default());
        out.cmdlines
            .push(fetch("process_cmdline", provider.process_cmdline(child)).unwrap_or_default());
        out.pids.push(child);
    }

    out
}
