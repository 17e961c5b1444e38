use super::{fetch, SnapshotOptions};
use crate::provider::Provider;
use crate::units::truncate_percent;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuSnapshot {
    pub total: u32,
    #[serde(rename = "percpu")]
    pub per_cpu: Vec<u32>,
}

/// Samples the aggregate and then the per-core figures, each over the same
/// window. If either sample fails the whole snapshot is zeroed.
pub fn build_cpu(provider: &dyn Provider, opts: &SnapshotOptions) -> CpuSnapshot {
    let window = opts.cpu_sample_window;
    let total = fetch("cpu_percent", provider.cpu_percent(window, false));
    let per_cpu = fetch("cpu_percent_per_cpu", provider.cpu_percent(window, true));

    match (total.as_deref(), per_cpu) {
        (Some([total, ..]), Some(per_cpu)) => CpuSnapshot {
            total: truncate_percent(*total),
            per_cpu: per_cpu.into_iter().map(truncate_percent).collect(),
        },
        _ => CpuSnapshot::default(),
    }
}
