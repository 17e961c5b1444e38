use super::fetch;
use crate::provider::Provider;
use crate::units::format_load;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadSnapshot {
    pub load1: String,
    pub load5: String,
    pub load15: String,
}

pub fn build_load(provider: &dyn Provider) -> LoadSnapshot {
    fetch("load_avg", provider.load_avg())
        .map(|avg| LoadSnapshot {
            load1: format_load(avg.load1),
            load5: format_load(avg.load5),
            load15: format_load(avg.load15),
        })
        .unwrap_or_default()
}
