//! # YesBot
//!
//! The event distribution core of a community chat bot: platform events come
//! in, every handler registered for the event's kind and routing keys runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌────────────┐     ┌──────────────────────────┐
//! │ EventSource  │────▶│   Runtime   │────▶│ Dispatcher │────▶│ handler "voice-up"       │
//! │ (platform    │     │ (lifecycle, │     │ (routing   │────▶│ handler "decline-ticket" │
//! │  client)     │     │  shutdown)  │     │  trees)    │────▶│ handler ...              │
//! └──────────────┘     └─────────────┘     └────────────┘     └──────────────────────────┘
//! ```
//!
//! - **Core**: platform model, key extraction and the routing tree
//! - **Framework**: handler options, extractors, permission gate, dispatcher
//! - **Runtime**: configuration, logging, event sources and process lifecycle
//!
//! Each event kind has its own routing tree. A message is keyed by
//! `[channel, trigger, sub-trigger]`, a reaction by `[channel, emoji]`, and
//! the empty segment is a wildcard. A handler registered without a channel
//! hears the trigger everywhere.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use yesbot::prelude::*;
//!
//! async fn voice_up(msg: Event<Message>, member: Member) -> anyhow::Result<()> {
//!     info!(user = %member.display_name(), "raising voice channel limit");
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = YesBotRuntime::new();
//!     runtime.register(
//!         HandlerOptions::command("!voice")
//!             .sub_trigger("up")
//!             .channel("bot-commands")
//!             .allowed_role("Yes Theory"),
//!         voice_up,
//!     )?;
//!
//!     let (sender, source) = ChannelSource::new(runtime.config().runtime.event_buffer);
//!     tokio::spawn(client.forward_events(sender));
//!     runtime.run(source).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use yesbot_core as core;
pub use yesbot_framework as framework;
pub use yesbot_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use yesbot::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use yesbot_runtime::{ChannelSource, EventSender, ReplaySource, RuntimeStats, YesBotRuntime};

    // Registration and dispatch
    pub use yesbot_framework::prelude::*;

    // Logging macros
    pub use yesbot_runtime::prelude::*;
}
