use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};
use serde::Serialize;
use shadowforge_core::provider::SnapshotProvider;
use shadowforge_core::{now_utc_rfc3339, Snapshot, Volume};
use shadowforge_engine as engine;
use shadowforge_engine::{ConfirmationGate, DeleteCriteria, MatchPolicy, Selection};

#[derive(Serialize)]
struct VolumeListing {
    generated_at_utc: String,
    volumes: Vec<Volume>,
}

#[derive(Serialize)]
struct SnapshotListing {
    generated_at_utc: String,
    device_id: String,
    snapshots: Vec<Snapshot>,
}

pub fn list_volumes(provider: &dyn SnapshotProvider, pretty: bool) -> Result<()> {
    let volumes = engine::list_volumes(provider)?;
    print_json(
        &VolumeListing {
            generated_at_utc: now_utc_rfc3339(),
            volumes,
        },
        pretty,
    )
}

pub fn list_snapshots(
    provider: &dyn SnapshotProvider,
    selection: &mut Selection,
    reference: Option<String>,
    strict_match: bool,
    pretty: bool,
) -> Result<()> {
    let device_id = resolve_target(provider, selection, reference.as_deref())?;
    let snapshots = engine::list_snapshots(provider, &device_id, policy(strict_match))?;
    print_json(
        &SnapshotListing {
            generated_at_utc: now_utc_rfc3339(),
            device_id,
            snapshots,
        },
        pretty,
    )
}

pub fn create_snapshot(
    provider: &dyn SnapshotProvider,
    selection: &mut Selection,
    reference: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let device_id = resolve_target(provider, selection, reference.as_deref())?;
    let snapshot_id = engine::create_snapshot(provider, &device_id, description.as_deref())?;
    println!("created {snapshot_id}");
    Ok(())
}

pub fn delete_snapshot(
    provider: &dyn SnapshotProvider,
    selection: &mut Selection,
    reference: Option<String>,
    id: Option<String>,
    yes: bool,
    strict_match: bool,
) -> Result<()> {
    let criteria = match id {
        Some(snapshot_id) => {
            if let Some(raw) = reference.as_deref() {
                let device_id = engine::resolve_reference(provider, raw)?;
                selection.select(device_id);
            }
            DeleteCriteria::ById(snapshot_id)
        }
        None => {
            let device_id = resolve_target(provider, selection, reference.as_deref())?;
            DeleteCriteria::ByVolume(device_id)
        }
    };

    let mut gate = StdinGate;
    let batch = engine::delete_snapshots(
        provider,
        &criteria,
        policy(strict_match),
        if yes { None } else { Some(&mut gate) },
    )?;

    if batch.aborted {
        println!("aborted, no snapshots deleted");
        return Ok(());
    }
    if batch.outcomes.is_empty() {
        println!("no matching snapshots");
        return Ok(());
    }

    for outcome in &batch.outcomes {
        match &outcome.error {
            None => println!("deleted {}", outcome.snapshot_id),
            Some(reason) => println!("failed {}: {}", outcome.snapshot_id, reason),
        }
    }
    println!("{} deleted, {} failed", batch.deleted(), batch.failed());

    if batch.failed() > 0 {
        return Err(anyhow!(
            "{} of {} deletions failed",
            batch.failed(),
            batch.outcomes.len()
        ));
    }
    Ok(())
}

/// Resolves the command's target volume through the selection coordinator:
/// an explicit reference is resolved and becomes the new selection, no
/// reference falls back to whatever was selected earlier in the process.
fn resolve_target(
    provider: &dyn SnapshotProvider,
    selection: &mut Selection,
    reference: Option<&str>,
) -> Result<String> {
    match reference {
        Some(raw) => {
            let device_id = engine::resolve_reference(provider, raw)?;
            selection.select(device_id.clone());
            Ok(device_id)
        }
        None => Ok(selection.resolve_target(None)?),
    }
}

fn policy(strict_match: bool) -> MatchPolicy {
    if strict_match {
        MatchPolicy::Exact
    } else {
        MatchPolicy::Lenient
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&mut self, pending: &[Snapshot]) -> bool {
        eprintln!("{} snapshot(s) will be deleted:", pending.len());
        for snapshot in pending {
            eprintln!(
                "  {}  volume {}  created {}",
                snapshot.id,
                snapshot.volume_device_id,
                snapshot.created_at_utc.as_deref().unwrap_or("unknown")
            );
        }
        eprint!("Proceed? [y/N] ");
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
