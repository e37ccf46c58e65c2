//! Main application modules.
//!
//! This module provides the pieces the command line tools share: chain
//! retrieval, the check, listing, summary and copy outputs, progress logging and
//! shutdown handling.

pub mod check;
pub mod copy;
pub mod listing;
pub mod logging;
pub mod retrieve;
pub mod shutdown;
pub mod summary;

// Re-export public API
pub use check::{config_error_output, failure_output, plugin_output, validate_chain};
pub use copy::{select_certs, write_pem_file};
pub use listing::chain_listing;
pub use logging::log_progress;
pub use retrieve::{resolve_server, retrieval_failure_state, retrieve_chain, sni_value};
pub use shutdown::shutdown_gracefully;
pub use summary::{discovery_summary, overall_state, summarize_chain, ChainSummary};
