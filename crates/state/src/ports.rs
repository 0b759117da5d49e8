//! Port range expansion and host to container port mapping.

use tracing::error;

use crate::model::{Resources, Task};

impl Resources {
    /// Expands the port ranges into individual ports, in range order.
    ///
    /// A sub-range with a malformed endpoint is logged and skipped; the
    /// remaining sub-ranges are still expanded.
    pub fn ports(&self) -> Vec<String> {
        self.port_numbers().map(|p| p.to_string()).collect()
    }

    /// Same as [`Resources::ports`], as integers.
    pub fn port_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        sub_ranges(&self.port_ranges).flat_map(|(lo, hi)| lo..=hi)
    }
}

fn sub_ranges(text: &str) -> impl Iterator<Item = (u32, u32)> + '_ {
    let inner = text.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    inner
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .filter_map(|r| match parse_range(r) {
            Ok(bounds) => Some(bounds),
            Err(e) => {
                error!(range = r, error = %e, "skipping malformed port range");
                None
            }
        })
}

fn parse_range(range: &str) -> Result<(u32, u32), String> {
    let (lo, hi) = range
        .split_once('-')
        .ok_or_else(|| format!("missing `-` in {range:?}"))?;
    let lo = lo
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("low bound {lo:?}: {e}"))?;
    let hi = hi
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("high bound {hi:?}: {e}"))?;
    Ok((lo, hi))
}

impl Task {
    /// Maps a host port to the container port it forwards to.
    ///
    /// Only the first status is consulted, not the freshest running one.
    /// Without a matching mapping the host port is returned unchanged.
    pub fn map_port(&self, host_port: u32) -> u32 {
        let Some(first) = self.statuses.first() else {
            return host_port;
        };
        first
            .container_status
            .network_infos
            .iter()
            .flat_map(|ni| ni.port_mappings.iter())
            .find(|pm| pm.host_port == host_port)
            .map_or(host_port, |pm| pm.container_port)
    }
}
