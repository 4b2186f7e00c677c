use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use shadowforge_core::provider::{CreateMode, SnapshotProvider};
use shadowforge_core::{now_utc_rfc3339, DriveType, ShadowError, Snapshot, Volume};

use crate::lifecycle::ConfirmationGate;

/// In-memory stand-in for the platform management interface.
pub struct FakeProvider {
    pub volumes: Vec<Volume>,
    snapshots: RefCell<Vec<Snapshot>>,
    fail_delete: RefCell<HashSet<String>>,
    next_id: Cell<u32>,
    pub fail_enumeration: bool,
    pub create_returns_empty: bool,
}

impl FakeProvider {
    pub fn new(volumes: Vec<Volume>) -> Self {
        Self {
            volumes,
            snapshots: RefCell::new(Vec::new()),
            fail_delete: RefCell::new(HashSet::new()),
            next_id: Cell::new(0),
            fail_enumeration: false,
            create_returns_empty: false,
        }
    }

    /// C: and D: fixed, E: removable, plus a letterless fixed volume.
    pub fn with_standard_volumes() -> Self {
        let mut c = Volume::new(r"\\?\Volume{c111}\", DriveType::Fixed).unwrap();
        c.drive_letter = Some('C');
        c.label = Some("System".to_string());
        c.filesystem = Some("NTFS".to_string());
        c.capacity_bytes = 500_000_000_000;
        c.free_bytes = 120_000_000_000;

        let mut d = Volume::new(r"\\?\Volume{d222}\", DriveType::Fixed).unwrap();
        d.drive_letter = Some('D');
        d.filesystem = Some("NTFS".to_string());

        let mut e = Volume::new(r"\\?\Volume{e333}\", DriveType::Removable).unwrap();
        e.drive_letter = Some('E');
        e.filesystem = Some("FAT32".to_string());

        let hidden = Volume::new(r"\\?\Volume{hidden}\", DriveType::Fixed).unwrap();

        Self::new(vec![c, d, e, hidden])
    }

    pub fn add_snapshot(&self, id: &str, volume_device_id: &str) {
        let mut snapshot = Snapshot::new(id, volume_device_id).unwrap();
        snapshot.persistent = true;
        snapshot.client_accessible = true;
        snapshot.state = 9;
        snapshot.created_at_utc = Some(now_utc_rfc3339());
        self.snapshots.borrow_mut().push(snapshot);
    }

    pub fn fail_delete_of(&self, snapshot_id: &str) {
        self.fail_delete.borrow_mut().insert(snapshot_id.to_string());
    }
}

impl SnapshotProvider for FakeProvider {
    fn enumerate_volumes(&self) -> Result<Vec<Volume>, ShadowError> {
        if self.fail_enumeration {
            return Err(ShadowError::PlatformQueryFailed(
                "injected enumeration failure".to_string(),
            ));
        }
        Ok(self.volumes.clone())
    }

    fn enumerate_snapshots(&self) -> Result<Vec<Snapshot>, ShadowError> {
        if self.fail_enumeration {
            return Err(ShadowError::PlatformQueryFailed(
                "injected enumeration failure".to_string(),
            ));
        }
        Ok(self.snapshots.borrow().clone())
    }

    fn create_snapshot(
        &self,
        device_id: &str,
        mode: CreateMode,
    ) -> Result<String, ShadowError> {
        if self.create_returns_empty {
            return Ok(String::new());
        }
        let sequence = self.next_id.get() + 1;
        self.next_id.set(sequence);
        let id = format!("{{FAKE-SHADOW-{sequence}}}");

        let mut snapshot = Snapshot::new(id.clone(), device_id)?;
        snapshot.persistent = true;
        snapshot.client_accessible = mode == CreateMode::ClientAccessible;
        snapshot.state = 9;
        snapshot.created_at_utc = Some(now_utc_rfc3339());
        self.snapshots.borrow_mut().push(snapshot);
        Ok(id)
    }

    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), ShadowError> {
        if self.fail_delete.borrow().contains(snapshot_id) {
            return Err(ShadowError::DeletionFailed {
                snapshot_id: snapshot_id.to_string(),
                reason: "access denied".to_string(),
            });
        }
        let mut snapshots = self.snapshots.borrow_mut();
        let before = snapshots.len();
        snapshots.retain(|snapshot| snapshot.id != snapshot_id);
        if snapshots.len() == before {
            return Err(ShadowError::DeletionFailed {
                snapshot_id: snapshot_id.to_string(),
                reason: "no such snapshot".to_string(),
            });
        }
        Ok(())
    }
}

/// Gate with a fixed answer that records how many snapshots were presented.
pub struct ScriptedGate {
    accept: bool,
    pub presented: usize,
}

impl ScriptedGate {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            presented: 0,
        }
    }

    pub fn declining() -> Self {
        Self {
            accept: false,
            presented: 0,
        }
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm(&mut self, pending: &[Snapshot]) -> bool {
        self.presented = pending.len();
        self.accept
    }
}
