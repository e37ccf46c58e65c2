//! Common contract shared by every validator result.

use std::fmt;
use std::sync::Arc;

use crate::certs::Certificate;
use crate::error_handling::ValidationError;
use crate::plugin::ServiceState;

/// A chain shared read-only between validators and the aggregator.
pub type CertChain = Arc<[Certificate]>;

pub const CHECK_NAME_SANS: &str = "SANs List";
pub const CHECK_NAME_HOSTNAME: &str = "Hostname";
pub const CHECK_NAME_EXPIRATION: &str = "Expiration";
pub const CHECK_NAME_CHAIN_ORDER: &str = "Chain Order";
pub const CHECK_NAME_ROOT: &str = "Root";

pub(crate) const BASELINE_PRIORITY_SANS: u32 = 1;
pub(crate) const BASELINE_PRIORITY_HOSTNAME: u32 = 2;
pub(crate) const BASELINE_PRIORITY_EXPIRATION: u32 = 3;
pub(crate) const BASELINE_PRIORITY_CHAIN_ORDER: u32 = 4;
pub(crate) const BASELINE_PRIORITY_ROOT: u32 = 5;

/// Amount added to a validator's baseline priority when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityModifier {
    /// Success, or a failure class that is ignored.
    #[default]
    Baseline,
    /// Expiring soon or unexpected SANs only.
    Minimum,
    /// Recoverable failures with a known workaround.
    Medium,
    /// The check could not be evaluated, or a high severity failure.
    Maximum,
}

impl PriorityModifier {
    pub fn value(self) -> u32 {
        match self {
            PriorityModifier::Baseline => 0,
            PriorityModifier::Minimum => 1,
            PriorityModifier::Medium => 2,
            PriorityModifier::Maximum => 999,
        }
    }
}

/// Fields every validator result carries.
#[derive(Debug, Clone)]
pub struct ResultCore {
    pub(crate) check_name: &'static str,
    pub(crate) chain: CertChain,
    pub(crate) err: Option<ValidationError>,
    pub(crate) detail: Option<String>,
    pub(crate) ignored: bool,
    pub(crate) baseline: u32,
    pub(crate) modifier: PriorityModifier,
}

impl ResultCore {
    pub(crate) fn new(check_name: &'static str, baseline: u32, chain: CertChain, ignored: bool) -> Self {
        Self {
            check_name,
            chain,
            err: None,
            detail: None,
            ignored,
            baseline,
            modifier: PriorityModifier::Baseline,
        }
    }

    /// Records a failure with its priority modifier.
    pub(crate) fn fail(&mut self, err: ValidationError, modifier: PriorityModifier) {
        self.err = Some(err);
        self.modifier = modifier;
    }

    pub(crate) fn with_detail(&mut self, detail: impl Into<String>) {
        self.detail = Some(detail.into());
    }

    /// "successful", "failed" or "ignored", for status lines.
    pub(crate) fn outcome(&self) -> &'static str {
        if self.ignored {
            "ignored"
        } else if self.err.is_some() {
            "failed"
        } else {
            "successful"
        }
    }

    /// The error message, with its detail when present.
    pub(crate) fn error_text(&self) -> Option<String> {
        self.err.map(|err| match &self.detail {
            Some(detail) => format!("{err}: {detail}"),
            None => err.to_string(),
        })
    }
}

/// Behavior shared by all validator results.
///
/// Implementors provide their [`ResultCore`] plus the state and text renderings;
/// the remaining queries are derived from the core.
pub trait ValidationResult: fmt::Debug + Send + Sync {
    fn core(&self) -> &ResultCore;

    /// Monitoring state of this result on its own. Ignored results are always OK.
    fn state(&self) -> ServiceState;

    /// One line describing the outcome.
    fn status(&self) -> String;

    /// Short bracketed summary.
    fn overview(&self) -> String;

    /// Multi-line report, starting with the status line.
    fn report(&self) -> String;

    fn check_name(&self) -> &'static str {
        self.core().check_name
    }

    fn chain(&self) -> &[Certificate] {
        &self.core().chain
    }

    fn err(&self) -> Option<ValidationError> {
        self.core().err
    }

    fn is_ignored(&self) -> bool {
        self.core().ignored
    }

    fn priority_modifier(&self) -> PriorityModifier {
        self.core().modifier
    }

    /// Baseline priority, plus the modifier unless the result is ignored.
    fn priority(&self) -> u32 {
        let core = self.core();
        if core.ignored {
            core.baseline
        } else {
            core.baseline + core.modifier.value()
        }
    }

    /// An error was recorded and the result is not ignored.
    fn is_failed(&self) -> bool {
        self.err().is_some() && !self.is_ignored()
    }

    /// No error was recorded and the result is not ignored.
    fn is_succeeded(&self) -> bool {
        self.err().is_none() && !self.is_ignored()
    }

    fn is_ok_state(&self) -> bool {
        self.state() == ServiceState::Ok
    }

    fn is_warning_state(&self) -> bool {
        self.state() == ServiceState::Warning
    }

    fn is_critical_state(&self) -> bool {
        self.state() == ServiceState::Critical
    }

    fn is_unknown_state(&self) -> bool {
        self.state() == ServiceState::Unknown
    }
}

/// Indents every line of `text` with a tab.
pub(crate) fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
