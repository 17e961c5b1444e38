use crate::provider::Interface;
use std::net::IpAddr;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("в адресе {0:?} нет префикса")]
    MissingPrefix(String),
    #[error("некорректный IP-адрес в {0:?}")]
    Address(String),
    #[error("некорректная длина префикса в {0:?}")]
    Prefix(String),
}

/// Parses `ip/prefix` text, validating the prefix against the address family.
pub fn parse_cidr(text: &str) -> Result<(IpAddr, u8), CidrError> {
    let (addr, prefix) = text
        .split_once('/')
        .ok_or_else(|| CidrError::MissingPrefix(text.to_string()))?;
    let ip: IpAddr = addr
        .parse()
        .map_err(|_| CidrError::Address(text.to_string()))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| CidrError::Prefix(text.to_string()))?;
    let max = if ip.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(CidrError::Prefix(text.to_string()));
    }
    Ok((ip, prefix))
}

/// Local IPv4 addresses that are neither loopback nor link-local, in
/// interface-then-address order. Duplicates are kept. Entries that fail to
/// parse are logged and skipped.
pub fn local_ipv4(interfaces: &[Interface]) -> Vec<String> {
    let mut out = Vec::new();
    for iface in interfaces {
        for addr in &iface.addrs {
            match parse_cidr(addr) {
                Ok((IpAddr::V4(v4), _)) if !v4.is_loopback() && !v4.is_link_local() => {
                    out.push(v4.to_string());
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(iface = %iface.name, error = %err, "пропущен некорректный адрес интерфейса");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(name: &str, addrs: &[&str]) -> Interface {
        Interface {
            name: name.to_string(),
            addrs: addrs.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn keeps_only_routable_ipv4() {
        let interfaces = vec![
            iface("lo", &["127.0.0.1/8", "::1/128"]),
            iface("eth0", &["169.254.1.1/16", "192.168.1.5/24", "fe80::1/64"]),
        ];
        assert_eq!(local_ipv4(&interfaces), vec!["192.168.1.5"]);
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let interfaces = vec![
            iface("eth0", &["garbage", "10.0.0.300/8", "10.0.0.1/40", "10.0.0.2/8"]),
            iface("eth1", &["172.16.0.9/12"]),
        ];
        assert_eq!(local_ipv4(&interfaces), vec!["10.0.0.2", "172.16.0.9"]);
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let interfaces = vec![
            iface("wlan0", &["10.1.1.1/24"]),
            iface("eth0", &["10.0.0.1/24", "10.1.1.1/24"]),
        ];
        assert_eq!(
            local_ipv4(&interfaces),
            vec!["10.1.1.1", "10.0.0.1", "10.1.1.1"]
        );
    }

    #[test]
    fn cidr_errors_name_the_problem() {
        assert!(matches!(parse_cidr("10.0.0.1"), Err(CidrError::MissingPrefix(_))));
        assert!(matches!(parse_cidr("host/24"), Err(CidrError::Address(_))));
        assert!(matches!(parse_cidr("10.0.0.1/x"), Err(CidrError::Prefix(_))));
        assert_eq!(
            parse_cidr("::1/128"),
            Ok(("::1".parse().unwrap(), 128))
        );
    }
}
