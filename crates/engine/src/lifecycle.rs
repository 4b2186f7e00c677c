use log::{info, warn};
use serde::Serialize;
use shadowforge_core::provider::{CreateMode, SnapshotProvider};
use shadowforge_core::{ShadowError, Snapshot};

use crate::directory::{self, MatchPolicy};

/// What a delete batch operates on: one exact snapshot identifier, or every
/// snapshot whose volume linkage matches a device identifier.
#[derive(Debug, Clone)]
pub enum DeleteCriteria {
    ById(String),
    ByVolume(String),
}

/// Interactive review of a pending delete batch. The full matching set is
/// presented before anything is deleted; declining aborts the entire batch.
pub trait ConfirmationGate {
    fn confirm(&mut self, pending: &[Snapshot]) -> bool;
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub snapshot_id: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteBatch {
    pub aborted: bool,
    pub outcomes: Vec<DeleteOutcome>,
}

impl DeleteBatch {
    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.deleted()
    }
}

/// Requests a client-accessible snapshot of the volume named by `device_id`
/// and returns the new snapshot identifier.
///
/// The platform create method takes no description; free text supplied here
/// is recorded with the operation log only.
pub fn create_snapshot(
    provider: &dyn SnapshotProvider,
    device_id: &str,
    description: Option<&str>,
) -> Result<String, ShadowError> {
    match description {
        Some(text) if !text.is_empty() => {
            info!("creating snapshot of {} ({})", device_id, text)
        }
        _ => info!("creating snapshot of {}", device_id),
    }

    let snapshot_id = provider.create_snapshot(device_id, CreateMode::ClientAccessible)?;
    if snapshot_id.is_empty() {
        return Err(ShadowError::CreationFailed(
            "platform returned no snapshot identifier".to_string(),
        ));
    }
    info!("created snapshot {}", snapshot_id);
    Ok(snapshot_id)
}

/// Deletes every snapshot matching `criteria`.
///
/// When `gate` is present the matching set is put up for review first and a
/// decline aborts with zero deletions. Deletion is then attempted snapshot by
/// snapshot: one failure never stops the rest of the batch, each outcome is
/// reported individually, and nothing is rolled back.
pub fn delete_snapshots(
    provider: &dyn SnapshotProvider,
    criteria: &DeleteCriteria,
    policy: MatchPolicy,
    gate: Option<&mut dyn ConfirmationGate>,
) -> Result<DeleteBatch, ShadowError> {
    let matching: Vec<Snapshot> = match criteria {
        DeleteCriteria::ById(snapshot_id) => provider
            .enumerate_snapshots()?
            .into_iter()
            .filter(|snapshot| snapshot.id == *snapshot_id)
            .collect(),
        DeleteCriteria::ByVolume(device_id) => {
            directory::list_snapshots(provider, device_id, policy)?
        }
    };

    if let Some(gate) = gate {
        if !matching.is_empty() && !gate.confirm(&matching) {
            info!("delete batch of {} snapshots declined", matching.len());
            return Ok(DeleteBatch {
                aborted: true,
                outcomes: Vec::new(),
            });
        }
    }

    let mut outcomes = Vec::with_capacity(matching.len());
    for snapshot in &matching {
        match provider.delete_snapshot(&snapshot.id) {
            Ok(()) => {
                info!("deleted snapshot {}", snapshot.id);
                outcomes.push(DeleteOutcome {
                    snapshot_id: snapshot.id.clone(),
                    error: None,
                });
            }
            Err(err) => {
                warn!("failed to delete snapshot {}: {}", snapshot.id, err);
                outcomes.push(DeleteOutcome {
                    snapshot_id: snapshot.id.clone(),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Ok(DeleteBatch {
        aborted: false,
        outcomes,
    })
}
