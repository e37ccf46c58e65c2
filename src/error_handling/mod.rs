//! Error handling.
//!
//! This module provides the error enums for every layer of the crate:
//! - Initialization (logger, resolver)
//! - Certificate parsing and signature verification
//! - Validation sentinels recorded in validator results
//! - Host expansion, TLS retrieval and port checks
//! - Configuration validation

mod types;

// Re-export public API
pub use types::{
    CertError, ConfigError, FetchError, HostError, InitializationError, PortCheckError,
    RetrievalError, SignatureError, ValidationError,
};
