use log::warn;
use shadowforge_core::provider::SnapshotProvider;
use shadowforge_core::{DriveType, ShadowError, Snapshot, Volume};

/// How a snapshot's recorded volume linkage is matched against a target
/// device identifier.
///
/// Identifiers are always compared with trailing separators stripped. The
/// different platform query paths do not agree on trailing-separator
/// formatting, so `Lenient` additionally accepts raw substring containment —
/// the historical behavior of this tool. That fallback can match an unrelated
/// volume whose identifier contains the target as a substring, so every hit
/// that only the fallback produced is logged at warn level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    #[default]
    Lenient,
    Exact,
}

/// Lists the volumes this tool supports operating on: fixed-type and
/// letter-assigned. Removable, network, and letterless volumes are excluded.
pub fn list_volumes(provider: &dyn SnapshotProvider) -> Result<Vec<Volume>, ShadowError> {
    let mut volumes = provider.enumerate_volumes()?;
    volumes.retain(|volume| {
        volume.drive_letter.is_some() && volume.drive_type == DriveType::Fixed
    });
    Ok(volumes)
}

/// Lists every snapshot whose volume linkage matches `device_id` under
/// `policy`. Each call re-queries the platform; nothing is cached.
pub fn list_snapshots(
    provider: &dyn SnapshotProvider,
    device_id: &str,
    policy: MatchPolicy,
) -> Result<Vec<Snapshot>, ShadowError> {
    let snapshots = provider.enumerate_snapshots()?;
    Ok(snapshots
        .into_iter()
        .filter(|snapshot| linkage_matches(&snapshot.volume_device_id, device_id, policy))
        .collect())
}

pub(crate) fn linkage_matches(linkage: &str, target: &str, policy: MatchPolicy) -> bool {
    if canonical(linkage) == canonical(target) {
        return true;
    }
    match policy {
        MatchPolicy::Exact => false,
        MatchPolicy::Lenient => {
            let hit = linkage.contains(target);
            if hit {
                warn!(
                    "substring linkage match: target {} matched snapshot volume {}",
                    target, linkage
                );
            }
            hit
        }
    }
}

fn canonical(id: &str) -> &str {
    id.trim_end_matches(['\\', '/'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeProvider;

    #[test]
    fn list_volumes_excludes_letterless_and_non_fixed() {
        let provider = FakeProvider::with_standard_volumes();
        let volumes = list_volumes(&provider).unwrap();

        assert!(!volumes.is_empty());
        for volume in &volumes {
            assert!(volume.drive_letter.is_some());
            assert_eq!(volume.drive_type, DriveType::Fixed);
        }
        assert!(volumes.iter().all(|v| v.drive_letter != Some('E')));
    }

    #[test]
    fn lenient_matching_is_substring_containment() {
        let provider = FakeProvider::with_standard_volumes();
        provider.add_snapshot("{SHADOW-1}", r"\\?\Volume{c111}\");
        provider.add_snapshot("{SHADOW-2}", r"\\?\Volume{d222}\");

        // Target without the trailing separator still matches by containment.
        let matched =
            list_snapshots(&provider, r"\\?\Volume{c111}", MatchPolicy::Lenient).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "{SHADOW-1}");

        let unmatched =
            list_snapshots(&provider, r"\\?\Volume{ffff}", MatchPolicy::Lenient).unwrap();
        assert!(unmatched.is_empty());
    }

    #[test]
    fn lenient_matching_accepts_known_false_positive() {
        // One identifier being a prefix of another is an accepted imprecision
        // of the lenient policy.
        let provider = FakeProvider::with_standard_volumes();
        provider.add_snapshot("{SHADOW-1}", r"\\?\Volume{1}\");
        provider.add_snapshot("{SHADOW-2}", r"\\?\Volume{12}\");

        let matched = list_snapshots(&provider, r"\\?\Volume{1}", MatchPolicy::Lenient).unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn exact_matching_rejects_the_fallback() {
        let provider = FakeProvider::with_standard_volumes();
        provider.add_snapshot("{SHADOW-1}", r"\\?\Volume{1}\");
        provider.add_snapshot("{SHADOW-2}", r"\\?\Volume{12}\");

        let matched = list_snapshots(&provider, r"\\?\Volume{1}", MatchPolicy::Exact).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "{SHADOW-1}");
    }

    #[test]
    fn exact_matching_tolerates_trailing_separators_both_ways() {
        assert!(linkage_matches(
            r"\\?\Volume{1}\",
            r"\\?\Volume{1}",
            MatchPolicy::Exact
        ));
        assert!(linkage_matches(
            r"\\?\Volume{1}",
            r"\\?\Volume{1}\",
            MatchPolicy::Exact
        ));
        assert!(!linkage_matches(
            r"\\?\Volume{1}",
            r"\\?\Volume{2}",
            MatchPolicy::Exact
        ));
    }

    #[test]
    fn enumeration_failure_surfaces_as_platform_query_failed() {
        let mut provider = FakeProvider::with_standard_volumes();
        provider.fail_enumeration = true;

        assert!(matches!(
            list_volumes(&provider),
            Err(ShadowError::PlatformQueryFailed(_))
        ));
        assert!(matches!(
            list_snapshots(&provider, r"\\?\Volume{c111}\", MatchPolicy::Lenient),
            Err(ShadowError::PlatformQueryFailed(_))
        ));
    }
}
