//! Plugin output assembly.

use std::fmt::Write;

use super::state::ServiceState;

const ERRORS_HEADER: &str = "**ERRORS**";
const DETAILED_INFO_HEADER: &str = "**DETAILED INFO**";

/// Output of a monitoring plugin run.
///
/// The first line is the service output (`<STATE>: <status> <overview>`), followed
/// by an optional errors section and an optional long-form detail section.
#[derive(Debug, Clone, Default)]
pub struct PluginOutput {
    state: ServiceState,
    service_output: String,
    errors: Vec<String>,
    long_service_output: String,
}

impl PluginOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn set_state(&mut self, state: ServiceState) {
        self.state = state;
    }

    /// Sets the one-line service output.
    pub fn set_service_output(&mut self, output: impl Into<String>) {
        self.service_output = output.into();
    }

    pub fn add_error(&mut self, err: impl ToString) {
        self.errors.push(err.to_string());
    }

    pub fn set_long_service_output(&mut self, output: impl Into<String>) {
        self.long_service_output = output.into();
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(self.service_output.trim_end());
        out.push('\n');

        if !self.errors.is_empty() {
            let _ = write!(out, "\n{ERRORS_HEADER}\n\n");
            for err in &self.errors {
                let _ = writeln!(out, "* {err}");
            }
        }

        if !self.long_service_output.trim().is_empty() {
            let _ = write!(out, "\n{DETAILED_INFO_HEADER}\n\n");
            out.push_str(self.long_service_output.trim_end());
            out.push('\n');
        }

        out
    }

    /// Prints the output to stdout and exits with the state's exit code.
    pub fn exit(self) -> ! {
        print!("{}", self.render());
        std::process::exit(self.state.exit_code());
    }
}
