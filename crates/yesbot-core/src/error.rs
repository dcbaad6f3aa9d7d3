//! Error types for the core layer.
//!
//! Registration and extraction errors live in `yesbot-framework`; the core
//! only fails when parsing external names into its closed enumerations.

use thiserror::Error;

/// Returned when a string does not name a known [`EventKind`](crate::EventKind).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: '{0}'")]
pub struct ParseEventKindError(pub String);
