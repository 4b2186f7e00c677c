use thiserror::Error;

/// Error kinds surfaced by volume and snapshot operations.
///
/// Every failure is reported to the caller as-is: nothing is retried, nothing
/// is fatal to the process, and no distinction is drawn between transient and
/// permanent causes.
#[derive(Debug, Error)]
pub enum ShadowError {
    /// A volume reference did not resolve to a known volume.
    #[error("volume not found: {0}")]
    VolumeNotFound(String),

    /// The platform enumeration call itself failed (privilege, service
    /// unavailability, COM setup).
    #[error("platform query failed: {0}")]
    PlatformQueryFailed(String),

    /// The platform create call returned no snapshot identifier.
    #[error("snapshot creation failed: {0}")]
    CreationFailed(String),

    /// A per-item delete call failed. Reported per snapshot; never aborts the
    /// rest of a batch.
    #[error("failed to delete snapshot {snapshot_id}: {reason}")]
    DeletionFailed { snapshot_id: String, reason: String },

    /// An operation needed an implicit target volume and none was selected.
    #[error("no volume selected")]
    NoVolumeSelected,

    /// A typed record was constructed from platform data missing a required
    /// field.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
