use shadowforge_core::provider::{CreateMode, SnapshotProvider};
use shadowforge_core::{ShadowError, Snapshot, Volume};

fn requires_windows() -> ShadowError {
    ShadowError::PlatformQueryFailed("shadow copy management requires Windows".to_string())
}

pub struct VssProvider;

impl VssProvider {
    pub fn connect() -> Result<Self, ShadowError> {
        Err(requires_windows())
    }
}

impl SnapshotProvider for VssProvider {
    fn enumerate_volumes(&self) -> Result<Vec<Volume>, ShadowError> {
        Err(requires_windows())
    }

    fn enumerate_snapshots(&self) -> Result<Vec<Snapshot>, ShadowError> {
        Err(requires_windows())
    }

    fn create_snapshot(
        &self,
        _device_id: &str,
        _mode: CreateMode,
    ) -> Result<String, ShadowError> {
        Err(requires_windows())
    }

    fn delete_snapshot(&self, _snapshot_id: &str) -> Result<(), ShadowError> {
        Err(requires_windows())
    }
}
