//! Topology Discovery Daemon
//!
//! Actor boundary around the discovery core: decodes speaker events,
//! partitions them by switch across workers that each own one
//! [`topo_discovery::DiscoveryService`], drives time-based behaviour from a
//! monotonic tick, and preloads the durable topology on the first tick.

pub mod config_file;
pub mod error;
pub mod input;
pub mod preloader;
pub mod router;
pub mod tick;
pub mod worker;

pub use config_file::{DiscoverydConfig, DEFAULT_CONFIG_PATH};
pub use error::{DaemonError, Result};
pub use input::{OutboundEvent, Route, SpeakerEvent, WorkerInput};
pub use preloader::SwitchPreloader;
pub use router::EventRouter;
pub use tick::MonotonicTick;
pub use worker::DiscoveryWorker;
