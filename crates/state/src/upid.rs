//! Process identifiers of the form `id@host:port`.

use std::fmt;
use std::io;
use std::net::ToSocketAddrs;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Failure to parse a process identifier.
#[derive(Debug, Error)]
pub enum UpidError {
    /// The input did not contain exactly one `@`.
    #[error("expected exactly one `@` in {0:?}")]
    Format(String),
    /// The address part could not be resolved as `host:port`.
    #[error("resolve {addr:?}: {source}")]
    Resolve {
        /// Address part of the input.
        addr: String,
        /// Resolver diagnostic.
        #[source]
        source: std::io::Error,
    },
    /// The address part resolved, but to nothing.
    #[error("{0:?} resolved to no addresses")]
    NoAddress(String),
}

/// A libprocess-style process identifier.
///
/// Values only come out of [`Upid::parse`], so a `Upid` always carries an
/// address that resolved at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Upid {
    id: String,
    host: String,
    port: String,
}

impl Upid {
    /// Parses `id@host:port`. IPv6 hosts must be bracketed (`id@[::1]:5050`);
    /// an empty host (`id@:5050`) means the unspecified address.
    pub fn parse(input: &str) -> Result<Self, UpidError> {
        let mut parts = input.split('@');
        let (id, addr) = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(addr), None) => (id, addr),
            _ => return Err(UpidError::Format(input.to_string())),
        };

        let resolve_err = |source| UpidError::Resolve {
            addr: addr.to_string(),
            source,
        };
        let (host, port) = split_host_port(addr).map_err(resolve_err)?;
        let port_num = port
            .parse::<u16>()
            .map_err(|e| invalid(format!("port {port:?}: {e}")))
            .map_err(resolve_err)?;

        // An empty host stands for the unspecified address.
        let lookup = if host.is_empty() { "0.0.0.0" } else { host };
        let mut resolved = (lookup, port_num).to_socket_addrs().map_err(resolve_err)?;
        if resolved.next().is_none() {
            return Err(UpidError::NoAddress(addr.to_string()));
        }

        Ok(Self {
            id: id.to_string(),
            host: host.to_string(),
            port: port.to_string(),
        })
    }

    /// Parses a raw JSON scalar, tolerating leftover quotes and padding
    /// around the identifier.
    pub fn from_json_scalar(raw: &str) -> Result<Self, UpidError> {
        Self::parse(raw.trim_matches(|c: char| c == '"' || c == ' '))
    }

    /// Process name, e.g. `master` or `slave(1)`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Host part, without IPv6 brackets. Empty for the unspecified address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port, as written in the input.
    pub fn port(&self) -> &str {
        &self.port
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

/// Splits `host:port` or `[host]:port`. IPv6 hosts must be bracketed.
fn split_host_port(addr: &str) -> io::Result<(&str, &str)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| invalid(format!("missing `]` in {addr:?}")))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| invalid(format!("missing port in {addr:?}")))?;
        return Ok((host, port));
    }
    let (host, port) = addr
        .split_once(':')
        .ok_or_else(|| invalid(format!("missing port in {addr:?}")))?;
    if port.contains(':') {
        return Err(invalid(format!("too many colons in {addr:?}")));
    }
    if host.contains(['[', ']']) {
        return Err(invalid(format!("unexpected bracket in {addr:?}")));
    }
    Ok((host, port))
}

impl fmt::Display for Upid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}@[{}]:{}", self.id, self.host, self.port)
        } else {
            write!(f, "{}@{}:{}", self.id, self.host, self.port)
        }
    }
}

impl FromStr for Upid {
    type Err = UpidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Upid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Upid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Upid::from_json_scalar(&raw).map_err(de::Error::custom)
    }
}
