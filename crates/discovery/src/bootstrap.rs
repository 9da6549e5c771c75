//! Translation of durable switch/link relations into per-switch snapshots.

use crate::error::Result;
use crate::model::{Endpoint, PortFacts, SwitchId, SwitchInit};
use crate::store::TopologyRepository;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Reads both relations and groups link records under their source switch.
///
/// Snapshots come back ordered by switch id. A link whose source switch is
/// not a known switch, or whose endpoints fail validation, is skipped with a
/// warning; the rest of the load continues.
pub fn load_persistent(repository: &dyn TopologyRepository) -> Result<Vec<SwitchInit>> {
    let mut switch_by_id: BTreeMap<SwitchId, SwitchInit> = repository
        .find_all_switches()?
        .into_iter()
        .map(|record| (record.switch_id, SwitchInit::new(record.switch_id)))
        .collect();

    for isl in repository.find_all_isls()? {
        let Some(init) = switch_by_id.get_mut(&isl.src_switch) else {
            warn!(
                switch_id = %isl.src_switch,
                port = isl.src_port,
                "Orphaned ISL relation (read race condition?)"
            );
            continue;
        };

        let local = match Endpoint::from_raw(init.switch_id, isl.src_port) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(error = %e, "Corrupted ISL relation endpoint (source)");
                continue;
            }
        };
        let remote = match Endpoint::from_raw(isl.dest_switch, isl.dest_port) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(error = %e, "Corrupted ISL relation endpoint (dest)");
                continue;
            }
        };

        init.add_port(PortFacts::new(local.port_number).with_remote(remote));
    }

    debug!(switches = switch_by_id.len(), "Loaded persistent topology");
    Ok(switch_by_id.into_values().collect())
}
