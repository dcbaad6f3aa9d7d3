//! Raw platform events.
//!
//! The platform client delivers every occurrence as a [`RawEvent`]: a tagged
//! variant with exactly one payload type per [`EventKind`]. The kind decides
//! which key extractor runs and which routing tree is consulted.
//!
//! # Wire format
//!
//! ```json
//! { "kind": "reaction_add", "payload": { "reaction": { ... }, "user": { ... } } }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ParseEventKindError;
use crate::extract::{Extraction, KeyExtractor};
use crate::model::{GuildId, GuildMember, Message, Reaction, User};

// =============================================================================
// EventKind
// =============================================================================

/// The closed set of platform occurrences the router distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A message was posted.
    Message,
    /// A reaction was added to a message.
    ReactionAdd,
    /// A reaction was removed from a message.
    ReactionRemove,
    /// A guild member changed (roles, nickname).
    GuildMemberUpdate,
    /// A member left a guild.
    MemberLeave,
    /// The platform client finished connecting.
    Ready,
}

/// How handler keys are laid out for an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// `[channel, trigger, sub_trigger]`
    Command,
    /// `[channel, emoji]`
    Reaction,
    /// `[]`: everything lives in the root bucket.
    Root,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Message,
        EventKind::ReactionAdd,
        EventKind::ReactionRemove,
        EventKind::GuildMemberUpdate,
        EventKind::MemberLeave,
        EventKind::Ready,
    ];

    /// Stable snake_case name, used in logs and configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::ReactionAdd => "reaction_add",
            EventKind::ReactionRemove => "reaction_remove",
            EventKind::GuildMemberUpdate => "guild_member_update",
            EventKind::MemberLeave => "member_leave",
            EventKind::Ready => "ready",
        }
    }

    pub const fn key_shape(self) -> KeyShape {
        match self {
            EventKind::Message => KeyShape::Command,
            EventKind::ReactionAdd | EventKind::ReactionRemove => KeyShape::Reaction,
            EventKind::GuildMemberUpdate | EventKind::MemberLeave | EventKind::Ready => {
                KeyShape::Root
            }
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEventKindError(s.to_string()))
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Payload for [`EventKind::ReactionAdd`] and [`EventKind::ReactionRemove`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub reaction: Reaction,
    /// The user who added or removed the reaction.
    pub user: User,
}

/// Payload for [`EventKind::GuildMemberUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUpdate {
    /// State before the update, if the client had it cached.
    #[serde(default)]
    pub old: Option<GuildMember>,
    pub new: GuildMember,
    pub guild_id: GuildId,
}

/// Payload for [`EventKind::MemberLeave`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLeave {
    pub member: GuildMember,
    pub guild_id: GuildId,
}

/// Payload for [`EventKind::Ready`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ready {
    /// The bot's own account.
    pub user: User,
    #[serde(default)]
    pub guilds: Vec<GuildId>,
}

// =============================================================================
// RawEvent
// =============================================================================

/// A platform event as delivered to the dispatcher.
///
/// Payloads are reference counted so that the event can be cloned into every
/// handler context of a dispatch without copying message bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum RawEvent {
    Message(Arc<Message>),
    ReactionAdd(Arc<ReactionEvent>),
    ReactionRemove(Arc<ReactionEvent>),
    GuildMemberUpdate(Arc<MemberUpdate>),
    MemberLeave(Arc<MemberLeave>),
    Ready(Arc<Ready>),
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::Message(_) => EventKind::Message,
            RawEvent::ReactionAdd(_) => EventKind::ReactionAdd,
            RawEvent::ReactionRemove(_) => EventKind::ReactionRemove,
            RawEvent::GuildMemberUpdate(_) => EventKind::GuildMemberUpdate,
            RawEvent::MemberLeave(_) => EventKind::MemberLeave,
            RawEvent::Ready(_) => EventKind::Ready,
        }
    }

    /// Shorthand for `self.kind().as_str()`.
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Runs the key extractor matching this event's kind.
    pub fn extract(&self) -> Extraction {
        match self {
            RawEvent::Message(m) => m.extract_keys(),
            RawEvent::ReactionAdd(r) | RawEvent::ReactionRemove(r) => r.extract_keys(),
            RawEvent::GuildMemberUpdate(u) => u.extract_keys(),
            RawEvent::MemberLeave(l) => l.extract_keys(),
            RawEvent::Ready(r) => r.extract_keys(),
        }
    }
}

impl From<Message> for RawEvent {
    fn from(message: Message) -> Self {
        RawEvent::Message(Arc::new(message))
    }
}

impl From<MemberUpdate> for RawEvent {
    fn from(update: MemberUpdate) -> Self {
        RawEvent::GuildMemberUpdate(Arc::new(update))
    }
}

impl From<MemberLeave> for RawEvent {
    fn from(leave: MemberLeave) -> Self {
        RawEvent::MemberLeave(Arc::new(leave))
    }
}

impl From<Ready> for RawEvent {
    fn from(ready: Ready) -> Self {
        RawEvent::Ready(Arc::new(ready))
    }
}
