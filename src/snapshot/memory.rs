use super::fetch;
use crate::provider::Provider;
use crate::units::{format_bytes, used_percent};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub total: String,
    pub available: String,
    pub used: String,
    pub used_percent: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSnapshot {
    pub name: String,
    pub total: String,
    pub free: String,
    pub used: String,
    pub used_percent: u32,
}

pub fn build_memory(provider: &dyn Provider) -> MemorySnapshot {
    fetch("virtual_memory", provider.virtual_memory())
        .map(|vm| MemorySnapshot {
            total: format_bytes(vm.total),
            available: format_bytes(vm.available),
            used: format_bytes(vm.used),
            used_percent: used_percent(vm.used_percent),
        })
        .unwrap_or_default()
}

/// One entry per mount the provider lists, pseudo filesystems included. A
/// mount whose usage can't be read still gets an entry, named after the
/// mountpoint and otherwise zeroed.
pub fn build_disks(provider: &dyn Provider) -> Vec<DiskSnapshot> {
    let partitions = fetch("partitions", provider.partitions()).unwrap_or_default();

    partitions
        .iter()
        .map(|p| match provider.disk_usage(&p.mountpoint) {
            Ok(usage) => DiskSnapshot {
                name: usage.path,
                total: format_bytes(usage.total),
                free: format_bytes(usage.free),
                used: format_bytes(usage.used),
                used_percent: used_percent(usage.used_percent),
            },
            Err(err) => {
                debug!(
                    mountpoint = %p.mountpoint,
                    device = %p.device,
                    fstype = %p.fstype,
                    error = %err,
                    "использование диска недоступно"
                );
                DiskSnapshot {
                    name: p.mountpoint.clone(),
                    ..DiskSnapshot::default()
                }
            }
        })
        .collect()
}
