//! Topology value types.

mod endpoint;
mod port;
mod speaker;
mod switch_id;

pub use endpoint::{Endpoint, IslFacts, IslReference, MAX_PORT_NUMBER};
pub use port::{LinkStatus, PortFacts, SwitchInit};
pub use speaker::{
    IslInfo, OperationMode, PortAdminState, PortChangeType, PortEvent, SharedSync,
    SwitchChangeType, SwitchEvent, SwitchPortView, SwitchView,
};
pub use switch_id::SwitchId;
