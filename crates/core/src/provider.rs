use crate::{ShadowError, Snapshot, Volume};

/// Accessibility mode requested when creating a snapshot. Maps onto the
/// context strings the platform create method accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Expose the copy for direct client read access.
    ClientAccessible,
    AppRollback,
    Backup,
}

impl CreateMode {
    pub fn as_context_str(&self) -> &'static str {
        match self {
            CreateMode::ClientAccessible => "ClientAccessible",
            CreateMode::AppRollback => "AppRollback",
            CreateMode::Backup => "Backup",
        }
    }
}

/// The platform management interface consumed by the engine.
///
/// All calls are synchronous and blocking. Enumerations return the platform's
/// full, unfiltered view; filtering is the engine's job. Implementations map
/// query failures to `PlatformQueryFailed` and per-item delete failures to
/// `DeletionFailed`.
pub trait SnapshotProvider {
    fn enumerate_volumes(&self) -> Result<Vec<Volume>, ShadowError>;

    fn enumerate_snapshots(&self) -> Result<Vec<Snapshot>, ShadowError>;

    /// Requests a new snapshot of the volume named by `device_id` and returns
    /// the platform-assigned snapshot identifier.
    fn create_snapshot(&self, device_id: &str, mode: CreateMode)
        -> Result<String, ShadowError>;

    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), ShadowError>;
}
