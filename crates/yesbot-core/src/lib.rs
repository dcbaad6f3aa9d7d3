//! # YesBot Core
//!
//! The leaf layer of the YesBot event distribution core.
//!
//! This crate knows nothing about handlers or runtimes. It provides:
//!
//! - **Platform model** ([`model`]): the boundary types the platform client
//!   hands us (users, members, guilds, channels, messages, reactions).
//! - **Raw events** ([`event`]): the closed set of [`EventKind`]s and the
//!   [`RawEvent`] tagged variant carrying one payload type per kind.
//! - **Routing** ([`routing`]): [`KeyPath`] and the [`RoutingTree`] that stores
//!   bindings by ordered key segments with wildcard fallback.
//! - **Key extraction** ([`extract`]): one [`KeyExtractor`] per payload type,
//!   turning a raw event into a key path plus a [`RoutingContext`].
//!
//! ```text
//! RawEvent ──extract()──▶ (KeyPath, RoutingContext) ──lookup()──▶ [bindings]
//! ```
//!
//! The framework layer (`yesbot-framework`) builds registration, permission
//! gating and dispatch on top of these pieces.

pub mod error;
pub mod event;
pub mod extract;
pub mod model;
pub mod routing;
pub mod testing;

pub use error::ParseEventKindError;
pub use event::{EventKind, KeyShape, MemberLeave, MemberUpdate, RawEvent, ReactionEvent, Ready};
pub use extract::{Extraction, KeyExtractor, RoutingContext};
pub use model::{
    Channel, ChannelId, DirectChannel, Emoji, EmojiId, Guild, GuildChannel, GuildId, GuildMember,
    Message, MessageId, Reaction, Role, RoleId, Snowflake, User, UserId,
};
pub use routing::{KeyPath, RoutingTree, WILDCARD};

/// Prelude for common imports.
pub mod prelude {
    pub use super::event::*;
    pub use super::extract::{Extraction, KeyExtractor, RoutingContext};
    pub use super::model::*;
    pub use super::routing::{KeyPath, RoutingTree, WILDCARD};
}
