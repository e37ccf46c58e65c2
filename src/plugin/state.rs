//! Monitoring service states.

/// Service state reported to the monitoring system.
///
/// Variant order follows the exit codes. Use [`ServiceState::worst`] to combine
/// states; it ranks `Ok < Unknown < Warning < Critical`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum_macros::Display,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ServiceState {
    #[default]
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Process exit code for this state.
    pub fn exit_code(self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }

    /// Upper-case label used as the first word of plugin output.
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Picks the more severe of two states (critical > warning > unknown > ok).
    pub fn worst(self, other: ServiceState) -> ServiceState {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    fn severity(self) -> u8 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Unknown => 1,
            ServiceState::Warning => 2,
            ServiceState::Critical => 3,
        }
    }
}
