use shadowforge_core::ShadowError;

/// The most recently chosen volume, carried explicitly by the caller and
/// threaded through actions rather than held as process-wide state.
///
/// Two independently refreshable views share one of these so an action
/// triggered in either view targets the volume chosen in the other. The held
/// value changes only through `select`; it is never expired.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the held device identifier unconditionally.
    pub fn select(&mut self, device_id: impl Into<String>) {
        self.current = Some(device_id.into());
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Returns the explicit selection when the immediate context supplies
    /// one, else the held value. An explicit selection does not mutate the
    /// held state.
    pub fn resolve_target(&self, explicit: Option<&str>) -> Result<String, ShadowError> {
        if let Some(device_id) = explicit {
            return Ok(device_id.to_string());
        }
        self.current.clone().ok_or(ShadowError::NoVolumeSelected)
    }
}
