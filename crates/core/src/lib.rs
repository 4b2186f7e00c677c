use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

mod error;
pub mod provider;

pub use error::ShadowError;

/// Platform drive-type code, mapped from the numeric value the volume
/// enumeration reports (`GetDriveTypeW` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveType {
    Unknown,
    NoRootDir,
    Removable,
    Fixed,
    Network,
    CdRom,
    RamDisk,
}

impl DriveType {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => DriveType::NoRootDir,
            2 => DriveType::Removable,
            3 => DriveType::Fixed,
            4 => DriveType::Network,
            5 => DriveType::CdRom,
            6 => DriveType::RamDisk,
            _ => DriveType::Unknown,
        }
    }
}

/// A mounted filesystem instance as reported by the platform.
///
/// The device identifier is the stable platform name for the volume
/// (`\\?\Volume{...}\` form on Windows) and is independent of drive-letter
/// assignment; not every volume has a letter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub device_id: String,
    pub drive_letter: Option<char>,
    pub label: Option<String>,
    pub filesystem: Option<String>,
    pub capacity_bytes: u64,
    pub free_bytes: u64,
    pub drive_type: DriveType,
}

impl Volume {
    pub fn new(device_id: impl Into<String>, drive_type: DriveType) -> Result<Self, ShadowError> {
        let device_id = device_id.into();
        if device_id.is_empty() {
            return Err(ShadowError::InvalidRecord(
                "volume device identifier is empty".to_string(),
            ));
        }
        Ok(Self {
            device_id,
            drive_letter: None,
            label: None,
            filesystem: None,
            capacity_bytes: 0,
            free_bytes: 0,
            drive_type,
        })
    }
}

/// A point-in-time copy of a volume, owned by the platform snapshot service.
///
/// `volume_device_id` is the linkage string the platform recorded at creation
/// time; its formatting may differ from the identifier form returned by the
/// volume enumeration path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub volume_device_id: String,
    pub created_at_utc: Option<String>,
    pub persistent: bool,
    pub client_accessible: bool,
    pub state: u32,
}

impl Snapshot {
    pub fn new(
        id: impl Into<String>,
        volume_device_id: impl Into<String>,
    ) -> Result<Self, ShadowError> {
        let id = id.into();
        let volume_device_id = volume_device_id.into();
        if id.is_empty() {
            return Err(ShadowError::InvalidRecord(
                "snapshot identifier is empty".to_string(),
            ));
        }
        if volume_device_id.is_empty() {
            return Err(ShadowError::InvalidRecord(
                "snapshot volume linkage is empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            volume_device_id,
            created_at_utc: None,
            persistent: false,
            client_accessible: false,
            state: 0,
        })
    }

    pub fn state_label(&self) -> &'static str {
        match self.state {
            1 => "preparing",
            2 => "processing-prepare",
            3 => "prepared",
            4 => "processing-precommit",
            5 => "precommitted",
            6 => "processing-commit",
            7 => "committed",
            8 => "processing-postcommit",
            9 => "created",
            10 => "aborted",
            11 => "deleted",
            _ => "unknown",
        }
    }
}

pub fn now_utc_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Converts a platform CIM DATETIME string (`yyyymmddHHMMSS.ffffff±UUU`,
/// offset in minutes) into RFC 3339. Returns `None` for anything malformed,
/// including the `********`-masked fields some providers emit.
pub fn cim_datetime_to_rfc3339(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() != 25 || !raw.is_ascii() {
        return None;
    }
    let bytes = raw.as_bytes();
    if bytes[14] != b'.' {
        return None;
    }
    let sign = match bytes[21] {
        b'+' => 1i32,
        b'-' => -1i32,
        _ => return None,
    };

    let year: i32 = raw[0..4].parse().ok()?;
    let month: u8 = raw[4..6].parse().ok()?;
    let day: u8 = raw[6..8].parse().ok()?;
    let hour: u8 = raw[8..10].parse().ok()?;
    let minute: u8 = raw[10..12].parse().ok()?;
    let second: u8 = raw[12..14].parse().ok()?;
    let micros: u32 = raw[15..21].parse().ok()?;
    let offset_minutes: i32 = raw[22..25].parse().ok()?;

    let date =
        time::Date::from_calendar_date(year, time::Month::try_from(month).ok()?, day).ok()?;
    let clock = time::Time::from_hms_micro(hour, minute, second, micros).ok()?;
    let offset = time::UtcOffset::from_whole_seconds(sign * offset_minutes * 60).ok()?;

    time::PrimitiveDateTime::new(date, clock)
        .assume_offset(offset)
        .format(&Rfc3339)
        .ok()
}
