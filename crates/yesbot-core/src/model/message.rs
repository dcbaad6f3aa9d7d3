//! Messages, emoji and reactions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::ids::{EmojiId, MessageId};
use super::user::{GuildMember, User};

/// A message as delivered by the platform client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// The channel the message was posted in. `None` when the client could
    /// not resolve it (partial message).
    #[serde(default)]
    pub channel: Option<Arc<Channel>>,
    pub author: User,
    /// The author's guild membership, when the client attached it.
    #[serde(default)]
    pub member: Option<GuildMember>,
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Whitespace-separated words of the content.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.content.split_whitespace()
    }

    pub fn is_direct(&self) -> bool {
        self.channel.as_deref().is_some_and(Channel::is_direct)
    }
}

/// A unicode or custom emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Set for custom emoji only.
    #[serde(default)]
    pub id: Option<EmojiId>,
    /// The unicode character(s) or the custom emoji name. Missing for
    /// deleted custom emoji.
    #[serde(default)]
    pub name: Option<String>,
}

impl Emoji {
    /// A unicode emoji such as `"👍"`.
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// A reaction on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub message: Arc<Message>,
    pub emoji: Emoji,
}
