//! Switch and port state machines.

mod port;
mod switch;

pub use port::{PortFsm, PortFsmEvent, PortFsmState};
pub use switch::{Roster, SwitchCommand, SwitchFsm, SwitchFsmEvent, SwitchFsmState};
