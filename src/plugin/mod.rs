//! Monitoring plugin states and output.

mod output;
mod state;

// Re-export public API
pub use output::PluginOutput;
pub use state::ServiceState;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ServiceState::Ok.exit_code(), 0);
        assert_eq!(ServiceState::Warning.exit_code(), 1);
        assert_eq!(ServiceState::Critical.exit_code(), 2);
        assert_eq!(ServiceState::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_worst_state() {
        assert_eq!(ServiceState::Ok.worst(ServiceState::Warning), ServiceState::Warning);
        assert_eq!(ServiceState::Critical.worst(ServiceState::Warning), ServiceState::Critical);
        assert_eq!(ServiceState::Unknown.worst(ServiceState::Ok), ServiceState::Unknown);
        assert_eq!(ServiceState::Unknown.worst(ServiceState::Warning), ServiceState::Warning);
        assert_eq!(ServiceState::Critical.worst(ServiceState::Unknown), ServiceState::Critical);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ServiceState::Ok.label(), "OK");
        assert_eq!(ServiceState::Warning.label(), "WARNING");
        assert_eq!(ServiceState::Critical.to_string(), "CRITICAL");
        assert_eq!(ServiceState::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_render_sections() {
        let mut output = PluginOutput::new();
        output.set_state(ServiceState::Unknown);
        output.set_service_output("UNKNOWN: failed to read cert file");
        output.add_error("no such file");
        output.set_long_service_output("details here\n");

        let rendered = output.render();
        assert!(rendered.starts_with("UNKNOWN: failed to read cert file\n"));
        assert!(rendered.contains("**ERRORS**\n\n* no such file\n"));
        assert!(rendered.ends_with("**DETAILED INFO**\n\ndetails here\n"));
    }

    #[test]
    fn test_render_without_optional_sections() {
        let mut output = PluginOutput::new();
        output.set_service_output("OK: all good");
        assert_eq!(output.render(), "OK: all good\n");
    }
}
