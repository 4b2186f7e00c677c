use shadowforge_core::provider::SnapshotProvider;
use shadowforge_core::ShadowError;

use crate::directory;

/// Resolves a user-supplied volume reference to the device identifier the
/// snapshot interface works with.
///
/// A reference that normalizes to a single alphabetic character is a drive
/// letter and is looked up against the supported volume set; any other input
/// passes through verbatim as an opaque matching key. The pass-through is
/// deliberate: identifiers in device form are not validated here, they are
/// handed to whatever lookup the caller performs next.
pub fn resolve_reference(
    provider: &dyn SnapshotProvider,
    reference: &str,
) -> Result<String, ShadowError> {
    let normalized = normalize(reference);
    if let Some(letter) = drive_letter_form(&normalized) {
        let volumes = directory::list_volumes(provider)?;
        return volumes
            .iter()
            .find(|volume| {
                volume
                    .drive_letter
                    .map(|assigned| assigned.eq_ignore_ascii_case(&letter))
                    .unwrap_or(false)
            })
            .map(|volume| volume.device_id.clone())
            .ok_or_else(|| ShadowError::VolumeNotFound(reference.trim().to_string()));
    }
    Ok(reference.to_string())
}

fn normalize(reference: &str) -> String {
    reference
        .trim()
        .trim_end_matches(|c| c == '\\' || c == '/' || c == ':')
        .to_string()
}

fn drive_letter_form(normalized: &str) -> Option<char> {
    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Some(letter),
        _ => None,
    }
}
