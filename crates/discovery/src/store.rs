//! Durable topology records and the read contract of the graph store.
//!
//! The graph store itself lives outside this crate. [`SnapshotRepository`]
//! is the in-process implementation used by the daemon: a JSON file written
//! by whatever owns the durable topology, read once at bootstrap.

use crate::error::Result;
use crate::model::SwitchId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Durable switch record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchRecord {
    pub switch_id: SwitchId,
}

/// Durable directed link record.
///
/// Port numbers are kept raw; they are validated when turned into endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslRecord {
    pub src_switch: SwitchId,
    pub src_port: i64,
    pub dest_switch: SwitchId,
    pub dest_port: i64,
}

impl IslRecord {
    pub fn new(src_switch: SwitchId, src_port: i64, dest_switch: SwitchId, dest_port: i64) -> Self {
        Self {
            src_switch,
            src_port,
            dest_switch,
            dest_port,
        }
    }
}

/// Read access to the durable topology relations.
pub trait TopologyRepository: Send + Sync {
    fn find_all_switches(&self) -> Result<Vec<SwitchRecord>>;

    fn find_all_isls(&self) -> Result<Vec<IslRecord>>;
}

/// In-memory topology relations, loadable from a JSON snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRepository {
    #[serde(default)]
    pub switches: Vec<SwitchRecord>,
    #[serde(default)]
    pub isls: Vec<IslRecord>,
}

impl SnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_switch(&mut self, switch_id: SwitchId) {
        self.switches.push(SwitchRecord { switch_id });
    }

    pub fn add_isl(&mut self, record: IslRecord) {
        self.isls.push(record);
    }

    /// Load snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load snapshot, treating a missing file as an empty store.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Topology snapshot not found, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write snapshot as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl TopologyRepository for SnapshotRepository {
    fn find_all_switches(&self) -> Result<Vec<SwitchRecord>> {
        Ok(self.switches.clone())
    }

    fn find_all_isls(&self) -> Result<Vec<IslRecord>> {
        Ok(self.isls.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> SnapshotRepository {
        let mut repo = SnapshotRepository::new();
        repo.add_switch(SwitchId::new(1));
        repo.add_switch(SwitchId::new(2));
        repo.add_isl(IslRecord::new(SwitchId::new(1), 10, SwitchId::new(2), 20));
        repo
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("topology.json");

        let repo = sample();
        repo.save(&path).unwrap();

        let loaded = SnapshotRepository::load(&path).unwrap();
        assert_eq!(loaded, repo);
        assert_eq!(loaded.find_all_switches().unwrap().len(), 2);
        assert_eq!(loaded.find_all_isls().unwrap()[0].dest_port, 20);
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let dir = tempdir().unwrap();
        let repo = SnapshotRepository::load_or_empty(dir.path().join("absent.json")).unwrap();
        assert!(repo.switches.is_empty());
        assert!(repo.isls.is_empty());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("topology.json");
        fs::write(&path, "{not json").unwrap();
        assert!(SnapshotRepository::load(&path).is_err());
    }
}
