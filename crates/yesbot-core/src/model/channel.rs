//! Channels.
//!
//! A channel is either a named guild channel or a direct-message channel.
//! Direct-message channels have no name, which is why routing identifies them
//! by id (see [`Channel::routing_key`]).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::guild::Guild;
use super::ids::{ChannelId, GuildId};
use super::user::User;

/// A text-capable channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Channel {
    /// A named channel inside a guild.
    Guild(GuildChannel),
    /// A direct-message channel between the bot and one user.
    Direct(DirectChannel),
}

/// A named channel inside a guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildChannel {
    pub id: ChannelId,
    pub name: String,
    /// Name of the parent category, if any.
    #[serde(default)]
    pub parent: Option<String>,
    pub guild: Arc<Guild>,
}

/// A direct-message channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectChannel {
    pub id: ChannelId,
    pub recipient: User,
}

impl Channel {
    pub fn id(&self) -> ChannelId {
        match self {
            Self::Guild(c) => c.id,
            Self::Direct(c) => c.id,
        }
    }

    /// The channel name; `None` for direct messages.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Guild(c) => Some(&c.name),
            Self::Direct(_) => None,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }

    /// The owning guild; `None` for direct messages.
    pub fn guild(&self) -> Option<&Arc<Guild>> {
        match self {
            Self::Guild(c) => Some(&c.guild),
            Self::Direct(_) => None,
        }
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild().map(|g| g.id)
    }

    /// The segment this channel contributes to a key path.
    ///
    /// Guild channels are keyed by name, direct-message channels by their
    /// decimal id.
    pub fn routing_key(&self) -> String {
        match self {
            Self::Guild(c) => c.name.clone(),
            Self::Direct(c) => c.id.to_string(),
        }
    }
}
