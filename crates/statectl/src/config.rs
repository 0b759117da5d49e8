use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use mesos_state::resolve::DEFAULT_IP_SOURCES;
use mesos_state::Resolver;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub slaves: SlavesConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Source names in priority order: "host" | "mesos" | "docker" | "netinfo".
    #[serde(default = "default_ip_sources")]
    pub ip_sources: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            ip_sources: default_ip_sources(),
        }
    }
}

fn default_ip_sources() -> Vec<String> {
    DEFAULT_IP_SOURCES.iter().map(|s| s.to_string()).collect()
}

/// How the `host` source learns slave addresses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlavesConfig {
    /// Look up slave hostnames that are not already IP literals.
    #[serde(default = "default_resolve_hostnames")]
    pub resolve_hostnames: bool,
    /// Fixed addresses per slave id; takes precedence over lookups.
    #[serde(default)]
    pub static_ips: BTreeMap<String, Vec<String>>,
}

impl Default for SlavesConfig {
    fn default() -> Self {
        Self {
            resolve_hostnames: default_resolve_hostnames(),
            static_ips: BTreeMap::new(),
        }
    }
}

fn default_resolve_hostnames() -> bool {
    true
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize config")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::from_names(&self.resolve.ip_sources)
    }
}
