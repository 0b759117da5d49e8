//! Address resolution, status selection and port handling on decoded tasks.

use std::net::IpAddr;

use mesos_state::{
    running_status, ContainerStatus, IpAddress, Label, NetworkInfo, PortMapping, Resolver,
    Resources, Status, Task, DOCKER_IP_LABEL, MESOS_IP_LABEL, TASK_RUNNING,
};

fn running(timestamp: f64) -> Status {
    Status {
        state: TASK_RUNNING.into(),
        timestamp,
        ..Default::default()
    }
}

fn with_netinfo(mut status: Status, ips: &[&str]) -> Status {
    status.container_status = ContainerStatus {
        network_infos: vec![NetworkInfo {
            ip_addresses: ips
                .iter()
                .map(|ip| IpAddress {
                    ip_address: ip.to_string(),
                })
                .collect(),
            ..Default::default()
        }],
    };
    status
}

fn with_label(mut status: Status, key: &str, value: &str) -> Status {
    status.labels.push(Label {
        key: key.into(),
        value: value.into(),
    });
    status
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn expands_port_ranges() {
    let cases: &[(&str, &[&str])] = &[
        ("[0-0]", &["0"]),
        ("[31000-31001,32000-32000]", &["31000", "31001", "32000"]),
        ("[31000-31001, 32000-32000]", &["31000", "31001", "32000"]),
        ("", &[]),
        ("[]", &[]),
        ("[x-5]", &[]),
        ("[x-5, 100-101]", &["100", "101"]),
        ("[100-101, 7-y, 200-200]", &["100", "101", "200"]),
    ];
    for (input, want) in cases {
        let r = Resources {
            port_ranges: input.to_string(),
        };
        assert_eq!(r.ports(), *want, "ports of {input:?}");
    }
}

#[test]
fn single_running_status_is_selected_at_any_position() {
    let others = [
        Status {
            state: "TASK_STAGING".into(),
            timestamp: 5.0,
            ..Default::default()
        },
        Status {
            state: "TASK_FAILED".into(),
            timestamp: 9.0,
            ..Default::default()
        },
    ];
    for pos in 0..=others.len() {
        let mut statuses = others.to_vec();
        statuses.insert(pos, with_label(running(1.0), "marker", "yes"));
        let picked = running_status(&statuses).expect("running status");
        assert_eq!(picked.labels[0].value, "yes", "position {pos}");
        // selecting again gives the same answer
        assert_eq!(running_status(&statuses).unwrap().timestamp, picked.timestamp);
    }
}

#[test]
fn latest_running_status_wins_regardless_of_order() {
    let a = with_label(running(1.0), "n", "old");
    let b = with_label(running(2.0), "n", "new");

    let forward = vec![a.clone(), b.clone()];
    let backward = vec![b, a];
    assert_eq!(running_status(&forward).unwrap().timestamp, 2.0);
    assert_eq!(running_status(&backward).unwrap().timestamp, 2.0);
}

#[test]
fn first_running_status_wins_on_tie() {
    let statuses = vec![
        with_label(running(3.0), "n", "first"),
        with_label(running(3.0), "n", "second"),
    ];
    assert_eq!(running_status(&statuses).unwrap().labels[0].value, "first");
}

#[test]
fn sources_contribute_in_given_order() {
    let task = Task {
        slave_ips: vec!["10.0.0.1".into()],
        statuses: vec![with_netinfo(running(1.0), &["10.0.0.2"])],
        ..Default::default()
    };

    let ips = task.ips(&["host", "netinfo"]);
    assert_eq!(ips, vec![ip("10.0.0.1"), ip("10.0.0.2")]);
    assert_eq!(ips.last(), Some(&ip("10.0.0.2")));
    assert_eq!(task.ip(&["host", "netinfo"]), "10.0.0.1");
    assert_eq!(task.ip(&["netinfo", "host"]), "10.0.0.2");
}

#[test]
fn unparsable_addresses_are_dropped() {
    let status = with_label(
        with_netinfo(running(1.0), &["not-an-ip", "fd00::2"]),
        MESOS_IP_LABEL,
        "999.1.1.1",
    );
    let task = Task {
        slave_ips: vec!["not-an-ip".into(), "10.0.0.1".into()],
        statuses: vec![status],
        ..Default::default()
    };

    let ips = task.ips(&["host", "mesos", "netinfo"]);
    assert_eq!(ips, vec![ip("10.0.0.1"), ip("fd00::2")]);
}

#[test]
fn unknown_sources_are_ignored() {
    let task = Task {
        slave_ips: vec!["10.0.0.1".into()],
        ..Default::default()
    };
    assert_eq!(task.ips(&["bogus", "host", ""]), vec![ip("10.0.0.1")]);
    assert!(task.ips(&["bogus"]).is_empty());
    assert_eq!(task.ip(&[]), "");
}

#[test]
fn label_sources_read_only_the_freshest_running_status() {
    let stale = with_label(running(1.0), DOCKER_IP_LABEL, "172.17.0.1");
    let fresh = with_label(
        with_label(running(2.0), DOCKER_IP_LABEL, "172.17.0.2"),
        MESOS_IP_LABEL,
        "10.5.0.2",
    );
    let finished = with_label(
        Status {
            state: "TASK_FINISHED".into(),
            timestamp: 3.0,
            ..Default::default()
        },
        DOCKER_IP_LABEL,
        "172.17.0.3",
    );
    let task = Task {
        statuses: vec![finished, fresh, stale],
        ..Default::default()
    };

    assert_eq!(task.ips(&["docker"]), vec![ip("172.17.0.2")]);
    assert_eq!(task.ips(&["mesos"]), vec![ip("10.5.0.2")]);
}

#[test]
fn status_sources_are_empty_without_running_status() {
    let task = Task {
        statuses: vec![with_netinfo(
            Status {
                state: "TASK_KILLED".into(),
                timestamp: 1.0,
                ..Default::default()
            },
            &["10.0.0.9"],
        )],
        ..Default::default()
    };
    assert!(task.ips(&["netinfo", "mesos", "docker"]).is_empty());
}

#[test]
fn resolver_is_shareable_across_threads() {
    let resolver = Resolver::from_names(["host", "netinfo"]);
    let task = Task {
        slave_ips: vec!["10.0.0.1".into()],
        statuses: vec![with_netinfo(running(1.0), &["10.0.0.2"])],
        ..Default::default()
    };

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| resolver.ips(&task))).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), vec![ip("10.0.0.1"), ip("10.0.0.2")]);
        }
    });
}

#[test]
fn maps_host_ports_through_first_status() {
    let mut first = running(1.0);
    first.container_status.network_infos = vec![
        NetworkInfo::default(),
        NetworkInfo {
            port_mappings: vec![PortMapping {
                protocol: Some("tcp".into()),
                host_port: 8080,
                container_port: 80,
            }],
            ..Default::default()
        },
    ];
    let mut later = running(5.0);
    later.container_status.network_infos = vec![NetworkInfo {
        port_mappings: vec![PortMapping {
            protocol: None,
            host_port: 9090,
            container_port: 90,
        }],
        ..Default::default()
    }];
    let task = Task {
        statuses: vec![first, later],
        ..Default::default()
    };

    assert_eq!(task.map_port(8080), 80);
    assert_eq!(task.map_port(9090), 9090);
}

#[test]
fn map_port_passes_through_without_statuses() {
    assert_eq!(Task::default().map_port(31000), 31000);
}
