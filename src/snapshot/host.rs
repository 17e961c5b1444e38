use super::{fetch, SnapshotOptions};
use crate::netaddr::local_ipv4;
use crate::provider::{Provider, TemperatureStat};
use crate::units::{format_temperature, format_timestamp, format_uptime};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub platform_family: String,
    pub platform_version: String,
    pub kernel_arch: String,
    pub uptime: String,
    pub boot_time: String,
    pub server_time: String,
    pub cpu_temperature: String,
    #[serde(rename = "ipaddr")]
    pub ip_addrs: Vec<String>,
}

pub fn build_host(provider: &dyn Provider, opts: &SnapshotOptions) -> HostSnapshot {
    let server_time = format_timestamp(chrono::Utc::now().timestamp());

    let mut snapshot = match fetch("host_info", provider.host_info()) {
        Some(info) => HostSnapshot {
            hostname: info.hostname,
            os: info.os,
            platform: info.platform,
            platform_family: info.platform_family,
            platform_version: info.platform_version,
            kernel_arch: info.kernel_arch,
            uptime: format_uptime(info.uptime_secs),
            boot_time: format_timestamp(info.boot_time_secs as i64),
            ..HostSnapshot::default()
        },
        None => HostSnapshot::default(),
    };

    snapshot.server_time = server_time;
    snapshot.cpu_temperature = fetch("temperatures", provider.temperatures())
        .and_then(|temps| cpu_temperature(&temps, &opts.temperature_sensor_key))
        .unwrap_or_default();
    snapshot.ip_addrs = fetch("interfaces", provider.interfaces())
        .map(|ifaces| local_ipv4(&ifaces))
        .unwrap_or_default();

    snapshot
}

/// First sensor whose key matches, in the provider's order. Readings are not
/// averaged.
pub fn cpu_temperature(temps: &[TemperatureStat], sensor_key: &str) -> Option<String> {
    temps
        .iter()
        .find(|t| t.sensor_key == sensor_key)
        .map(|t| format_temperature(t.temperature))
}
