//! Selection of a task's current status.

use crate::model::Status;

/// State of a task that is up.
pub const TASK_RUNNING: &str = "TASK_RUNNING";

/// Picks the freshest running status.
///
/// The master makes no guarantee about the order of a task's statuses, so
/// the latest `TASK_RUNNING` entry is found by timestamp instead of
/// position. On equal timestamps the earlier entry wins.
pub fn running_status(statuses: &[Status]) -> Option<&Status> {
    let mut best: Option<&Status> = None;
    for st in statuses.iter().filter(|s| s.state == TASK_RUNNING) {
        match best {
            Some(b) if st.timestamp <= b.timestamp => {}
            _ => best = Some(st),
        }
    }
    best
}
