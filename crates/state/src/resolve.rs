//! Resolution of a task's IP addresses from the sources a snapshot offers.
//!
//! Each source extracts candidate address strings from a [`Task`]; the
//! [`Resolver`] runs its sources in order and keeps the candidates that parse
//! as IPv4 or IPv6 addresses. Callers decide which position wins.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::model::{Status, Task};
use crate::status::running_status;

/// Label key holding the Docker containerizer IP.
pub const DOCKER_IP_LABEL: &str = "Docker.NetworkSettings.IPAddress";
/// Label key holding the Mesos containerizer IP.
pub const MESOS_IP_LABEL: &str = "MesosContainerizer.NetworkSettings.IPAddress";

/// Source order used when none is configured.
pub const DEFAULT_IP_SOURCES: [&str; 3] = ["netinfo", "mesos", "host"];

/// Extracts candidate addresses for a task.
pub trait AddressSource: Send + Sync {
    /// Name used in logs and `Resolver` debug output.
    fn name(&self) -> &str;

    /// Raw candidates, unparsed. Order is preserved by the resolver.
    fn candidates(&self, task: &Task) -> Vec<String>;
}

/// The built-in sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpSource {
    /// Addresses of the slave the task runs on.
    Host,
    /// `MesosContainerizer.NetworkSettings.IPAddress` labels.
    Mesos,
    /// `Docker.NetworkSettings.IPAddress` labels.
    Docker,
    /// Container network infos.
    Netinfo,
}

/// A source name that is not one of the built-in sources.
#[derive(Debug, Error)]
#[error("unknown ip source: {0:?}")]
pub struct UnknownSource(pub String);

impl IpSource {
    /// Every built-in source.
    pub const ALL: [IpSource; 4] = [
        IpSource::Host,
        IpSource::Mesos,
        IpSource::Docker,
        IpSource::Netinfo,
    ];

    /// Name as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            IpSource::Host => "host",
            IpSource::Mesos => "mesos",
            IpSource::Docker => "docker",
            IpSource::Netinfo => "netinfo",
        }
    }
}

impl fmt::Display for IpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpSource::ALL
            .into_iter()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

impl AddressSource for IpSource {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn candidates(&self, task: &Task) -> Vec<String> {
        match self {
            IpSource::Host => task.slave_ips.clone(),
            IpSource::Mesos => from_running_status(task, |s| label_values(s, MESOS_IP_LABEL)),
            IpSource::Docker => from_running_status(task, |s| label_values(s, DOCKER_IP_LABEL)),
            IpSource::Netinfo => from_running_status(task, network_info_ips),
        }
    }
}

fn from_running_status<F>(task: &Task, extract: F) -> Vec<String>
where
    F: FnOnce(&Status) -> Vec<String>,
{
    running_status(&task.statuses)
        .map(extract)
        .unwrap_or_default()
}

fn label_values(status: &Status, key: &str) -> Vec<String> {
    status
        .labels
        .iter()
        .filter(|l| l.key == key)
        .map(|l| l.value.clone())
        .collect()
}

// Newer masters report `ip_addresses`; older ones a single `ip_address`.
fn network_info_ips(status: &Status) -> Vec<String> {
    let mut ips = Vec::new();
    for ni in &status.container_status.network_infos {
        if !ni.ip_addresses.is_empty() {
            ips.extend(ni.ip_addresses.iter().map(|a| a.ip_address.clone()));
        } else if !ni.ip_address.is_empty() {
            ips.push(ni.ip_address.clone());
        }
    }
    ips
}

/// Runs an ordered list of address sources against tasks.
///
/// Holds no mutable state; one resolver can serve any number of threads.
pub struct Resolver {
    sources: Vec<Box<dyn AddressSource>>,
}

impl Resolver {
    /// Builds a resolver from source names. Unknown names are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources = names
            .into_iter()
            .filter_map(|name| match name.as_ref().parse::<IpSource>() {
                Ok(src) => Some(Box::new(src) as Box<dyn AddressSource>),
                Err(e) => {
                    debug!(error = %e, "ignoring ip source");
                    None
                }
            })
            .collect();
        Self { sources }
    }

    /// Builds a resolver from arbitrary strategies, in priority order.
    pub fn with_sources(sources: Vec<Box<dyn AddressSource>>) -> Self {
        Self { sources }
    }

    /// Names of the configured sources, in order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Every address the sources yield for `task`, in source order. Text
    /// that does not parse as an IP address is dropped.
    pub fn ips(&self, task: &Task) -> Vec<IpAddr> {
        let mut ips = Vec::new();
        for src in &self.sources {
            for candidate in src.candidates(task) {
                match candidate.parse::<IpAddr>() {
                    Ok(ip) => ips.push(ip),
                    Err(_) => debug!(
                        task = %task.id,
                        source = src.name(),
                        candidate = %candidate,
                        "dropping unparsable address"
                    ),
                }
            }
        }
        ips
    }

    /// First resolved address, or an empty string.
    pub fn ip(&self, task: &Task) -> String {
        self.ips(task)
            .first()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::from_names(DEFAULT_IP_SOURCES)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl Task {
    /// Addresses from the named sources, in the order given.
    pub fn ips(&self, sources: &[&str]) -> Vec<IpAddr> {
        Resolver::from_names(sources).ips(self)
    }

    /// First address from the named sources, or an empty string.
    pub fn ip(&self, sources: &[&str]) -> String {
        Resolver::from_names(sources).ip(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerStatus, IpAddress, Label, NetworkInfo};
    use crate::status::TASK_RUNNING;

    struct Fixed(&'static [&'static str]);

    impl AddressSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn candidates(&self, _task: &Task) -> Vec<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    #[test]
    fn parses_source_names() {
        assert_eq!("netinfo".parse::<IpSource>().unwrap(), IpSource::Netinfo);
        assert!("Host".parse::<IpSource>().is_err());
        for src in IpSource::ALL {
            assert_eq!(src.to_string().parse::<IpSource>().unwrap(), src);
        }
    }

    #[test]
    fn injected_sources_run_in_order() {
        let r = Resolver::with_sources(vec![
            Box::new(Fixed(&["10.1.1.1", "bogus"])),
            Box::new(Fixed(&["::1"])),
        ]);
        let ips = r.ips(&Task::default());
        assert_eq!(ips, vec!["10.1.1.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]);
        assert_eq!(r.ip(&Task::default()), "10.1.1.1");
    }

    #[test]
    fn network_info_falls_back_to_legacy_field() {
        let status = Status {
            state: TASK_RUNNING.into(),
            container_status: ContainerStatus {
                network_infos: vec![
                    NetworkInfo {
                        ip_addresses: vec![IpAddress {
                            ip_address: "10.0.0.1".into(),
                        }],
                        ip_address: "10.9.9.9".into(),
                        ..Default::default()
                    },
                    NetworkInfo {
                        ip_address: "10.0.0.2".into(),
                        ..Default::default()
                    },
                    NetworkInfo::default(),
                ],
            },
            ..Default::default()
        };
        assert_eq!(network_info_ips(&status), vec!["10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn label_values_keep_order_and_duplicates() {
        let status = Status {
            labels: vec![
                Label {
                    key: DOCKER_IP_LABEL.into(),
                    value: "b".into(),
                },
                Label {
                    key: "other".into(),
                    value: "x".into(),
                },
                Label {
                    key: DOCKER_IP_LABEL.into(),
                    value: "a".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(label_values(&status, DOCKER_IP_LABEL), vec!["b", "a"]);
        assert!(label_values(&status, MESOS_IP_LABEL).is_empty());
    }

    #[test]
    fn debug_lists_source_names() {
        let r = Resolver::from_names(["host", "nope", "docker"]);
        assert_eq!(r.source_names(), vec!["host", "docker"]);
        assert_eq!(format!("{r:?}"), r#"Resolver { sources: ["host", "docker"] }"#);
    }
}
