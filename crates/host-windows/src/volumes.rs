use shadowforge_core::{DriveType, ShadowError, Volume};

use windows::core::PCWSTR;
use windows::Win32::Storage::FileSystem::{
    GetDiskFreeSpaceExW, GetDriveTypeW, GetLogicalDrives, GetVolumeInformationW,
    GetVolumeNameForVolumeMountPointW,
};

fn wide(s: &str) -> Vec<u16> {
    use std::os::windows::prelude::*;
    std::ffi::OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

fn list_logical_drive_letters() -> Vec<char> {
    unsafe {
        let mask = GetLogicalDrives();
        let mut letters = Vec::new();
        for (idx, letter) in ('A'..='Z').enumerate() {
            if mask & (1u32 << idx) != 0 {
                letters.push(letter);
            }
        }
        letters
    }
}

/// Stable `\\?\Volume{...}\` name for a mounted root.
fn volume_device_id(root: &str) -> Result<String, ShadowError> {
    let wroot = wide(root);
    let mut name_buf = [0u16; 260];

    unsafe {
        GetVolumeNameForVolumeMountPointW(PCWSTR(wroot.as_ptr()), &mut name_buf).map_err(
            |err| {
                ShadowError::PlatformQueryFailed(format!(
                    "GetVolumeNameForVolumeMountPointW failed for {root}: {err}"
                ))
            },
        )?;
    }

    let device_id = String::from_utf16_lossy(&name_buf)
        .trim_end_matches('\0')
        .to_string();
    if device_id.is_empty() {
        return Err(ShadowError::PlatformQueryFailed(format!(
            "no volume name for {root}"
        )));
    }
    Ok(device_id)
}

fn get_volume_info(root: &str) -> Result<(Option<String>, Option<String>), ShadowError> {
    let wroot = wide(root);
    let mut name_buf = [0u16; 256];
    let mut fs_buf = [0u16; 256];

    unsafe {
        GetVolumeInformationW(
            PCWSTR(wroot.as_ptr()),
            Some(&mut name_buf),
            None,
            None,
            None,
            Some(&mut fs_buf),
        )
        .map_err(|err| {
            ShadowError::PlatformQueryFailed(format!(
                "GetVolumeInformationW failed for {root}: {err}"
            ))
        })?;
    }

    let label = String::from_utf16_lossy(&name_buf)
        .trim_end_matches('\0')
        .trim()
        .to_string();
    let fs = String::from_utf16_lossy(&fs_buf)
        .trim_end_matches('\0')
        .trim()
        .to_string();

    let label = if label.is_empty() { None } else { Some(label) };
    let fs = if fs.is_empty() { None } else { Some(fs) };

    Ok((label, fs))
}

fn get_volume_space(root: &str) -> Result<(u64, u64), ShadowError> {
    let wroot = wide(root);
    let mut free = 0u64;
    let mut total = 0u64;
    let mut total_free = 0u64;

    unsafe {
        GetDiskFreeSpaceExW(
            PCWSTR(wroot.as_ptr()),
            Some(&mut free),
            Some(&mut total),
            Some(&mut total_free),
        )
        .map_err(|err| {
            ShadowError::PlatformQueryFailed(format!(
                "GetDiskFreeSpaceExW failed for {root}: {err}"
            ))
        })?;
    }

    Ok((total, free))
}

pub fn enumerate_volume_mounts() -> Result<Vec<Volume>, ShadowError> {
    let mut volumes = Vec::new();

    for letter in list_logical_drive_letters() {
        let root = format!("{letter}:\\");
        let wroot = wide(&root);
        let drive_type = DriveType::from_code(unsafe { GetDriveTypeW(PCWSTR(wroot.as_ptr())) });

        // A root we cannot name is a root we cannot snapshot; skip it.
        let device_id = match volume_device_id(&root) {
            Ok(id) => id,
            Err(_) => continue,
        };

        let mut volume = Volume::new(device_id, drive_type)?;
        volume.drive_letter = Some(letter);

        if let Ok((label, fs)) = get_volume_info(&root) {
            volume.label = label;
            volume.filesystem = fs;
        }
        if let Ok((capacity, free)) = get_volume_space(&root) {
            volume.capacity_bytes = capacity;
            volume.free_bytes = free;
        }

        volumes.push(volume);
    }

    Ok(volumes)
}
