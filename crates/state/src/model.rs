//! Serde model of the master's `/state` document.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::upid::Upid;

/// Snapshot of the master's `/state` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Registered frameworks, with their tasks.
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    /// Registered slaves.
    #[serde(default)]
    pub slaves: Vec<Slave>,
    /// Leader process identifier, as reported by the master (`master@host:port`).
    #[serde(default)]
    pub leader: String,
}

impl Snapshot {
    /// Decodes a snapshot from JSON text.
    pub fn from_json(s: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Decodes a snapshot from a reader (file, HTTP body, ...).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StateError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parses the leader string as a process identifier.
    pub fn leader_upid(&self) -> Result<Upid, StateError> {
        Ok(Upid::parse(&self.leader)?)
    }

    /// Slave with the given id.
    pub fn slave(&self, id: &str) -> Option<&Slave> {
        self.slaves.iter().find(|s| s.id == id)
    }

    /// All tasks across frameworks, in framework then task order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.frameworks.iter().flat_map(|f| f.tasks.iter())
    }

    /// Fills every task's `slave_ips` with the addresses `lookup` reports for
    /// its owning slave. Tasks whose slave is not in the snapshot get none.
    pub fn populate_slave_ips<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&Slave) -> Vec<String>,
    {
        let slaves = &self.slaves;
        for task in self.frameworks.iter_mut().flat_map(|f| f.tasks.iter_mut()) {
            task.slave_ips = slaves
                .iter()
                .find(|s| s.id == task.slave_id)
                .map(&mut lookup)
                .unwrap_or_default();
        }
    }
}

/// A registered framework and the tasks it owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Framework {
    /// Framework name, e.g. `marathon`.
    #[serde(default)]
    pub name: String,
    /// Host the scheduler registered from.
    #[serde(default)]
    pub hostname: String,
    /// Scheduler process id. Absent when the master omits it.
    #[serde(default)]
    pub pid: Option<Upid>,
    /// Tasks owned by this framework.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Framework {
    /// Host and port the scheduler listens on. Without a pid only the
    /// hostname is known and the port is empty.
    pub fn host_port(&self) -> (String, String) {
        match &self.pid {
            Some(pid) => (pid.host().to_string(), pid.port().to_string()),
            None => (self.hostname.clone(), String::new()),
        }
    }
}

/// An agent node that runs tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slave {
    /// Slave id, referenced by `Task::slave_id`.
    #[serde(default)]
    pub id: String,
    /// Hostname the slave registered with.
    #[serde(default)]
    pub hostname: String,
    /// Slave process id. Absent when the master omits it.
    #[serde(default)]
    pub pid: Option<Upid>,
}

/// A task as reported inside its framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    /// Id of the owning framework.
    #[serde(default)]
    pub framework_id: String,
    /// Task id, unique within the framework.
    #[serde(default)]
    pub id: String,
    /// Task name.
    #[serde(default)]
    pub name: String,
    /// Id of the slave the task runs on.
    #[serde(default)]
    pub slave_id: String,
    /// Lifecycle state, e.g. `TASK_RUNNING`.
    #[serde(default)]
    pub state: String,
    /// Historical and current statuses, in no particular order.
    #[serde(default)]
    pub statuses: Vec<Status>,
    /// Resources held by the task.
    #[serde(default)]
    pub resources: Resources,
    /// Discovery metadata; empty when the framework sets none.
    #[serde(default, rename = "discovery")]
    pub discovery_info: DiscoveryInfo,

    /// Addresses (v4, v6 or both) of the slave running this task. Supplied
    /// by the caller; never part of the document.
    #[serde(skip)]
    pub slave_ips: Vec<String>,
}

impl Task {
    /// Whether the framework attached discovery info to this task.
    pub fn has_discovery_info(&self) -> bool {
        !self.discovery_info.name.is_empty()
    }
}

/// Resources held by a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Raw port ranges, e.g. `[31000-31001, 32000-32000]`.
    #[serde(default, rename = "ports")]
    pub port_ranges: String,
}

/// Key/value pair attached to a status or to discovery info.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label key. Keys may repeat.
    #[serde(default)]
    pub key: String,
    /// Label value.
    #[serde(default)]
    pub value: String,
}

/// One status update of a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    /// Seconds since the epoch.
    #[serde(default)]
    pub timestamp: f64,
    /// Lifecycle state reported by this update.
    #[serde(default)]
    pub state: String,
    /// Labels attached by the containerizer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    /// Container network state at the time of the update.
    #[serde(default)]
    pub container_status: ContainerStatus,
}

/// Container metadata attached to a status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerStatus {
    /// One entry per container interface.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_infos: Vec<NetworkInfo>,
}

/// Network configuration of a single container interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Addresses configured on the interface.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addresses: Vec<IpAddress>,
    /// Host to container port mappings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,
    /// Single-address form used by older masters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
}

/// One address configured on an interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddress {
    /// Address text, IPv4 or IPv6.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
}

/// Host port to container port mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    /// `tcp` or `udp`, when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Port on the slave.
    #[serde(default)]
    pub host_port: u32,
    /// Port inside the container.
    #[serde(default)]
    pub container_port: u32,
}

/// Service discovery metadata a framework attaches to a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    /// `FRAMEWORK`, `CLUSTER` or `EXTERNAL`.
    #[serde(default)]
    pub visibility: String,
    /// Service version.
    #[serde(default)]
    pub version: String,
    /// Service name. Empty means no discovery info.
    #[serde(default)]
    pub name: String,
    /// Service location.
    #[serde(default)]
    pub location: String,
    /// Service environment, e.g. `prod`.
    #[serde(default)]
    pub environment: String,
    /// Free-form service labels.
    #[serde(default)]
    pub labels: DiscoveryLabels,
    /// Named service ports.
    #[serde(default)]
    pub ports: DiscoveryPorts,
}

/// Wrapper matching the nested `{"labels": [...]}` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryLabels {
    /// Labels, in document order.
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Wrapper matching the nested `{"ports": [...]}` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryPorts {
    /// Ports, in document order.
    #[serde(default)]
    pub ports: Vec<DiscoveryPort>,
}

/// A named service port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPort {
    /// `tcp` or `udp`.
    #[serde(default)]
    pub protocol: String,
    /// Port number.
    #[serde(default)]
    pub number: u32,
    /// Port name, e.g. `http`.
    #[serde(default)]
    pub name: String,
}
