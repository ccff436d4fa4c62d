//! Hysteria server configuration
//!
//! Synthesis of the server's YAML document from stored state, writing it to
//! disk, and the apply cycle that restarts the service afterwards.

pub mod document;
pub mod writer;
pub mod apply;

pub use document::{synthesize, AuthPassword, HysteriaConfig, AUTH_PLACEHOLDER};
pub use writer::{ConfigWriter, SynthesisError};
pub use apply::{ApplyController, ApplyError, ApplyOutcome};
