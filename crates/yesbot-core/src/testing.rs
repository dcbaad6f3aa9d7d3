//! Fixture builders for tests.
//!
//! Shorthand constructors for the platform model so tests across the
//! workspace can describe a guild, a channel and an event in a couple of
//! lines. Ids are plain integers; the guild fixture always uses
//! [`GUILD_ID`].

use std::sync::Arc;

use crate::event::{RawEvent, ReactionEvent};
use crate::model::{
    Channel, DirectChannel, Emoji, Guild, GuildChannel, GuildMember, Message, Reaction, Role, User,
};

/// Id given to every guild built by [`guild`].
pub const GUILD_ID: u64 = 1000;

pub fn user(id: u64, name: &str) -> User {
    User {
        id: id.into(),
        name: name.to_string(),
        bot: false,
    }
}

/// A member holding the given role names. Role ids are derived from position.
pub fn member(id: u64, name: &str, roles: &[&str]) -> GuildMember {
    GuildMember {
        user: user(id, name),
        nickname: None,
        roles: roles
            .iter()
            .zip(1u64..)
            .map(|(role, i)| Role {
                id: (id * 100 + i).into(),
                name: role.to_string(),
            })
            .collect(),
    }
}

pub fn guild(name: &str, members: Vec<GuildMember>) -> Arc<Guild> {
    Arc::new(Guild {
        id: GUILD_ID.into(),
        name: name.to_string(),
        members,
    })
}

pub fn guild_channel(guild: &Arc<Guild>, id: u64, name: &str) -> Arc<Channel> {
    Arc::new(Channel::Guild(GuildChannel {
        id: id.into(),
        name: name.to_string(),
        parent: None,
        guild: Arc::clone(guild),
    }))
}

pub fn direct_channel(id: u64, recipient: User) -> Arc<Channel> {
    Arc::new(Channel::Direct(DirectChannel {
        id: id.into(),
        recipient,
    }))
}

pub fn message(channel: &Arc<Channel>, author: User, content: &str) -> Message {
    Message {
        id: (author.id.get() * 7 + 1).into(),
        channel: Some(Arc::clone(channel)),
        author,
        member: None,
        content: content.to_string(),
    }
}

/// A message event, boxed as a [`RawEvent`].
pub fn message_event(channel: &Arc<Channel>, author: User, content: &str) -> RawEvent {
    RawEvent::from(message(channel, author, content))
}

fn reaction(channel: &Arc<Channel>, emoji: &str, user: User) -> Arc<ReactionEvent> {
    let author = self::user(9999, "poster");
    Arc::new(ReactionEvent {
        reaction: Reaction {
            message: Arc::new(message(channel, author, "a post")),
            emoji: Emoji::unicode(emoji),
        },
        user,
    })
}

pub fn reaction_add(channel: &Arc<Channel>, emoji: &str, user: User) -> RawEvent {
    RawEvent::ReactionAdd(reaction(channel, emoji, user))
}

pub fn reaction_remove(channel: &Arc<Channel>, emoji: &str, user: User) -> RawEvent {
    RawEvent::ReactionRemove(reaction(channel, emoji, user))
}
