//! Aggregation of validator results into one monitoring verdict.

use std::fmt::Write;

use super::result::{indent, ValidationResult, CHECK_NAME_EXPIRATION};
use crate::plugin::ServiceState;

const NONE_BULLET: &str = "* None";

/// Ordered collection of validator results.
#[derive(Debug, Default)]
pub struct CertChainValidationResults {
    results: Vec<Box<dyn ValidationResult>>,
}

impl CertChainValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: Box<dyn ValidationResult>) {
        self.results.push(result);
    }

    /// Stable sort by descending priority.
    pub fn sort(&mut self) {
        self.results
            .sort_by_key(|result| std::cmp::Reverse(result.priority()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ValidationResult> {
        self.results.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Finds a result by its check name.
    pub fn get(&self, check_name: &str) -> Option<&dyn ValidationResult> {
        self.iter().find(|r| r.check_name() == check_name)
    }

    pub fn has_critical_state(&self) -> bool {
        self.iter().any(|r| r.is_critical_state())
    }

    pub fn has_warning_state(&self) -> bool {
        self.iter().any(|r| r.is_warning_state())
    }

    /// No results at all, or a result in UNKNOWN state.
    pub fn has_unknown_state(&self) -> bool {
        self.is_empty() || self.iter().any(|r| r.is_unknown_state())
    }

    /// Every result is in OK state and there is at least one.
    pub fn is_ok_state(&self) -> bool {
        !self.is_empty() && self.iter().all(|r| r.is_ok_state())
    }

    pub fn has_succeeded(&self) -> bool {
        self.iter().any(|r| r.is_succeeded())
    }

    pub fn has_ignored(&self) -> bool {
        self.iter().any(|r| r.is_ignored())
    }

    pub fn has_failed(&self) -> bool {
        self.iter().any(|r| r.is_failed())
    }

    pub fn num_failed(&self) -> usize {
        self.iter().filter(|r| r.is_failed()).count()
    }

    pub fn num_ignored(&self) -> usize {
        self.iter().filter(|r| r.is_ignored()).count()
    }

    pub fn num_succeeded(&self) -> usize {
        self.iter().filter(|r| r.is_succeeded()).count()
    }

    pub fn num_ok_state(&self) -> usize {
        self.iter().filter(|r| r.is_ok_state()).count()
    }

    pub fn num_critical_state(&self) -> usize {
        self.iter().filter(|r| r.is_critical_state()).count()
    }

    pub fn num_warning_state(&self) -> usize {
        self.iter().filter(|r| r.is_warning_state()).count()
    }

    /// Overall state: critical over warning over OK, UNKNOWN when empty.
    pub fn state(&self) -> ServiceState {
        if self.is_empty() {
            ServiceState::Unknown
        } else if self.has_critical_state() {
            ServiceState::Critical
        } else if self.has_warning_state() {
            ServiceState::Warning
        } else {
            ServiceState::Ok
        }
    }

    fn names(&self, pred: impl Fn(&dyn ValidationResult) -> bool) -> String {
        self.iter()
            .filter(|r| pred(*r))
            .map(|r| r.check_name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Three bucket summary of check names.
    pub fn overview(&self) -> String {
        format!(
            "[IGNORED: {}], [FAILED: {}], [SUCCESSFUL: {}]",
            self.names(|r| r.is_ignored()),
            self.names(|r| r.is_failed()),
            self.names(|r| r.is_succeeded())
        )
    }

    /// State label plus the status of the highest priority failure.
    ///
    /// Without failures the expiration status is used since it carries the most useful
    /// information about a healthy chain.
    pub fn status(&self) -> String {
        let state = self.state();
        let highlight = self
            .iter()
            .filter(|r| r.is_failed())
            .min_by_key(|r| std::cmp::Reverse(r.priority()))
            .or_else(|| self.get(CHECK_NAME_EXPIRATION))
            .or_else(|| self.iter().next());

        match highlight {
            Some(result) => format!("{}: {}", state.label(), result.status()),
            None => format!("{}: no validation results", state.label()),
        }
    }

    /// Status followed by the overview, for the first line of plugin output.
    pub fn one_line_summary(&self) -> String {
        format!("{} {}", self.status(), self.overview())
    }

    /// Report with problem, ignored and success sections.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let sections: [(&str, &str, fn(&dyn ValidationResult) -> bool); 3] = [
            ("PROBLEM RESULTS", "[!!]", |r| r.is_failed()),
            ("IGNORED RESULTS", "[--]", |r| r.is_ignored()),
            ("SUCCESS RESULTS", "[OK]", |r| r.is_succeeded()),
        ];

        for (idx, (title, bullet, pred)) in sections.into_iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "{title}:\n");
            let mut any = false;
            for result in self.iter().filter(|r| pred(*r)) {
                any = true;
                let report = result.report();
                let mut lines = report.lines();
                if let Some(first) = lines.next() {
                    let _ = writeln!(out, "{bullet} {first}");
                }
                let rest = lines.collect::<Vec<_>>().join("\n");
                if !rest.trim().is_empty() {
                    let _ = writeln!(out, "{}", indent(&rest));
                }
                out.push('\n');
            }
            if !any {
                let _ = writeln!(out, "{NONE_BULLET}");
            }
        }

        out
    }
}
