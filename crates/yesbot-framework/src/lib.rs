//! # YesBot Framework
//!
//! Registration, permission gating and dispatch on top of `yesbot-core`.
//!
//! This layer provides:
//! - [`HandlerOptions`]: the declarative description of where a handler
//!   listens and who may invoke it
//! - Axum-style [`Handler`]s whose parameters are extracted from a
//!   [`HandlerContext`] via [`FromContext`]
//! - [`RegistryBuilder`], consumed into an immutable [`Dispatcher`]
//! - The [`PermissionGate`] applied before each invocation
//! - A tower [`Service`](tower::Service) wrapper around the dispatcher
//!
//! # Example
//!
//! ```rust,ignore
//! use yesbot_framework::prelude::*;
//!
//! async fn decline(event: Event<ReactionEvent>) -> anyhow::Result<()> {
//!     tracing::info!(message = %event.reaction.message.id, "declining ticket");
//!     Ok(())
//! }
//!
//! let mut registry = RegistryBuilder::new();
//! registry.register(
//!     HandlerOptions::reaction_add("🚫")
//!         .channel("travel-approvals")
//!         .allowed_role("Support"),
//!     decline,
//! )?;
//! let dispatcher = registry.build();
//! let report = dispatcher.dispatch(event).await;
//! ```

pub mod catalog;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod handler;
pub mod options;
pub mod permission;
pub mod registry;
pub mod services;

pub use catalog::HandlerSummary;
pub use context::HandlerContext;
pub use dispatcher::{DispatchReport, DispatchService, Dispatcher};
pub use error::{
    BoxError, ExtractError, ExtractResult, InvocationError, RegistrationError, RegistrationResult,
};
pub use extractor::{Event, FromContext, FromRawEvent, Member, Options, Routing};
pub use handler::{BoxedHandler, Handler, HandlerOutput, into_handler};
pub use options::HandlerOptions;
pub use permission::{DenialPolicy, PermissionGate};
pub use registry::{Binding, RegistryBuilder};
pub use services::{Inject, Services};

/// Prelude for handler authors.
pub mod prelude {
    pub use super::{
        DenialPolicy, DispatchReport, Dispatcher, Event, ExtractError, FromContext, Handler,
        HandlerContext, HandlerOptions, Inject, Member, Options, RegistrationError,
        RegistryBuilder, Routing,
    };
    pub use yesbot_core::prelude::*;
}
