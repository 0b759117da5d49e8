use mesos_state::{Resolver, Snapshot, Task, TASK_RUNNING};
use serde::Serialize;

/// One line of `statectl tasks` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub framework: String,
    pub task_id: String,
    pub name: String,
    pub state: String,
    pub slave_id: String,
    /// Best address, empty when none resolved.
    pub ip: String,
    pub ips: Vec<String>,
    pub ports: Vec<PortReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortReport {
    pub host_port: u32,
    pub container_port: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameworkReport {
    pub name: String,
    pub host: String,
    pub port: String,
    pub tasks: usize,
}

pub fn task_report(framework: &str, task: &Task, resolver: &Resolver) -> TaskReport {
    let ips: Vec<String> = resolver.ips(task).iter().map(ToString::to_string).collect();
    TaskReport {
        framework: framework.to_string(),
        task_id: task.id.clone(),
        name: task.name.clone(),
        state: task.state.clone(),
        slave_id: task.slave_id.clone(),
        ip: ips.first().cloned().unwrap_or_default(),
        ips,
        ports: task
            .resources
            .port_numbers()
            .map(|host_port| PortReport {
                host_port,
                container_port: task.map_port(host_port),
            })
            .collect(),
        discovery_name: task
            .has_discovery_info()
            .then(|| task.discovery_info.name.clone()),
    }
}

/// Reports for every task, or only running ones.
pub fn task_reports(snap: &Snapshot, resolver: &Resolver, running_only: bool) -> Vec<TaskReport> {
    snap.frameworks
        .iter()
        .flat_map(|fw| fw.tasks.iter().map(move |t| (fw, t)))
        .filter(|(_, t)| !running_only || t.state == TASK_RUNNING)
        .map(|(fw, t)| task_report(&fw.name, t, resolver))
        .collect()
}

pub fn framework_reports(snap: &Snapshot) -> Vec<FrameworkReport> {
    snap.frameworks
        .iter()
        .map(|fw| {
            let (host, port) = fw.host_port();
            FrameworkReport {
                name: fw.name.clone(),
                host,
                port,
                tasks: fw.tasks.len(),
            }
        })
        .collect()
}
