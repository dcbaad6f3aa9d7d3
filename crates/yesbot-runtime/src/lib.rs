//! YesBot Runtime - Process orchestration for the YesBot event router.
//!
//! This crate provides:
//! - Layered configuration (`ConfigLoader`, `YesBotConfig`)
//! - Logging setup on top of `tracing-subscriber`
//! - Event sources the platform client feeds (`ChannelSource`, `ReplaySource`)
//! - The process lifecycle (`YesBotRuntime`)
//!
//! ```ignore
//! use yesbot_runtime::{ChannelSource, YesBotRuntime};
//! use yesbot_framework::HandlerOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = YesBotRuntime::new();
//!     runtime.register(HandlerOptions::command("!topic"), topic)?;
//!
//!     let (sender, source) = ChannelSource::new(runtime.config().runtime.event_buffer);
//!     tokio::spawn(client.forward_events(sender));
//!
//!     // Run until Ctrl+C or until the client drops the sender
//!     runtime.run(source).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod source;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, DistributionConfig, LoggingConfig, RuntimeConfig,
    YesBotConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, RuntimeStats, YesBotRuntime};
pub use source::{ChannelSource, EventSender, EventSource, ReplaySource};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros and the `Level` type.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
