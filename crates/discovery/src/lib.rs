//! Topology Discovery Core
//!
//! Tracks switches, their ports and the links between them as the
//! device-control layer reports connects, disconnects and port changes.
//!
//! - [`fsm::SwitchFsm`] models the connectivity and management lifecycle of
//!   one switch and owns its known ports.
//! - [`fsm::PortFsm`] holds the per-port flags that gate discovery probing.
//! - [`DiscoveryService`] routes inbound events to the right controller,
//!   creates controllers on demand, and reconciles durable and live state.
//! - [`bootstrap::load_persistent`] turns durable switch/link records into
//!   per-switch snapshots.
//!
//! Nothing here performs I/O. Every operation takes a reply capability and
//! emits commands through it.

pub mod audit;
pub mod bootstrap;
pub mod error;
pub mod fsm;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;

pub use error::{DiscoveryError, Result};
pub use fsm::{PortFsm, PortFsmState, SwitchCommand, SwitchFsm, SwitchFsmState};
pub use model::*;
pub use registry::Registry;
pub use service::{
    DiscoveryOptions, DiscoveryService, PortReply, SwitchPrepopulateReply, SwitchReply,
    DEFAULT_DISCOVERY_INTERVAL_MS,
};
pub use store::{IslRecord, SnapshotRepository, SwitchRecord, TopologyRepository};
