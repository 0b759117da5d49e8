#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Decoded model of an orchestrator `/state` snapshot and the resolution of
//! task network identity (addresses and ports) from it.

pub mod error;
pub mod model;
pub mod ports;
pub mod resolve;
pub mod status;
pub mod upid;

pub use error::StateError;
pub use model::*;
pub use resolve::{AddressSource, IpSource, Resolver, DOCKER_IP_LABEL, MESOS_IP_LABEL};
pub use status::{running_status, TASK_RUNNING};
pub use upid::{Upid, UpidError};
