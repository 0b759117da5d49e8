//! Addresses of the slaves tasks run on, for the `host` source.

use std::net::{IpAddr, ToSocketAddrs};

use mesos_state::Slave;

use crate::config::SlavesConfig;

/// Addresses for `slave`, v4 and v6, without duplicates.
///
/// Configured static addresses win. Otherwise the hostname is used as-is when
/// it is an IP literal, looked up when lookups are enabled, and the pid host
/// is the last resort.
pub fn slave_ips(slave: &Slave, cfg: &SlavesConfig) -> Vec<String> {
    if let Some(ips) = cfg.static_ips.get(&slave.id) {
        return ips.clone();
    }

    let host = if slave.hostname.is_empty() {
        slave.pid.as_ref().map(|p| p.host()).unwrap_or_default()
    } else {
        slave.hostname.as_str()
    };
    if host.is_empty() {
        return Vec::new();
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return vec![ip.to_string()];
    }
    if !cfg.resolve_hostnames {
        return Vec::new();
    }

    match (host, 0).to_socket_addrs() {
        Ok(addrs) => {
            let mut ips: Vec<String> = Vec::new();
            for ip in addrs.map(|a| a.ip().to_string()) {
                if !ips.contains(&ip) {
                    ips.push(ip);
                }
            }
            ips
        }
        Err(e) => {
            tracing::warn!(slave = %slave.id, host = %host, error = %e, "slave lookup failed");
            Vec::new()
        }
    }
}
