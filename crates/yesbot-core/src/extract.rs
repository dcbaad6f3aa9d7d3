//! Per-kind key extraction.
//!
//! Each payload type implements [`KeyExtractor`], turning an event into the
//! [`KeyPath`] used to walk its kind's routing tree plus a [`RoutingContext`]
//! describing who acted and where.
//!
//! | Payload | Key path |
//! |---|---|
//! | [`Message`] | `[channel, first word, second word]` |
//! | [`ReactionEvent`] | `[channel, emoji name]` |
//! | [`MemberUpdate`], [`MemberLeave`], [`Ready`] | `[]` |
//!
//! Extractors are total. Anything that cannot be resolved degrades to the
//! [`WILDCARD`] segment or an absent member.

use tracing::trace;

use crate::event::{MemberLeave, MemberUpdate, ReactionEvent, Ready};
use crate::model::{Channel, ChannelId, GuildId, GuildMember, Message, UserId};
use crate::routing::{KeyPath, WILDCARD};

/// Per-dispatch metadata derived from an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingContext {
    /// The guild member who caused the event, when resolvable.
    pub member: Option<GuildMember>,
    /// `true` exactly when the event happened in a direct-message channel.
    pub is_direct_message: bool,
    pub channel_id: Option<ChannelId>,
    pub guild_id: Option<GuildId>,
}

/// Output of a key extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub key_path: KeyPath,
    pub context: RoutingContext,
}

/// Turns a payload into its routing key path and context.
///
/// Implementations must be pure: no mutation, no platform calls.
pub trait KeyExtractor {
    fn extract_keys(&self) -> Extraction;
}

fn channel_segment(channel: Option<&Channel>) -> String {
    match channel {
        Some(channel) => channel.routing_key(),
        None => {
            trace!("Channel unresolved, routing on the wildcard channel");
            WILDCARD.to_string()
        }
    }
}

fn resolve_member(channel: Option<&Channel>, user_id: UserId) -> Option<GuildMember> {
    let member = channel
        .and_then(Channel::guild)
        .and_then(|guild| guild.member(user_id))
        .cloned();
    if member.is_none() {
        trace!(user = %user_id, "Acting user is not a known guild member");
    }
    member
}

fn channel_context(channel: Option<&Channel>, member: Option<GuildMember>) -> RoutingContext {
    RoutingContext {
        member,
        is_direct_message: channel.is_some_and(Channel::is_direct),
        channel_id: channel.map(Channel::id),
        guild_id: channel.and_then(Channel::guild_id),
    }
}

impl KeyExtractor for Message {
    fn extract_keys(&self) -> Extraction {
        let channel = self.channel.as_deref();
        let mut words = self.words();
        let trigger = words.next().unwrap_or(WILDCARD);
        let sub_trigger = words.next().unwrap_or(WILDCARD);

        let member = if channel.is_some_and(Channel::is_direct) {
            None
        } else {
            self.member
                .clone()
                .or_else(|| resolve_member(channel, self.author.id))
        };

        Extraction {
            key_path: KeyPath::new([channel_segment(channel), trigger.into(), sub_trigger.into()]),
            context: channel_context(channel, member),
        }
    }
}

impl KeyExtractor for ReactionEvent {
    fn extract_keys(&self) -> Extraction {
        let channel = self.reaction.message.channel.as_deref();
        let emoji = self.reaction.emoji.name.as_deref().unwrap_or(WILDCARD);
        let member = resolve_member(channel, self.user.id);

        Extraction {
            key_path: KeyPath::new([channel_segment(channel), emoji.to_string()]),
            context: channel_context(channel, member),
        }
    }
}

impl KeyExtractor for MemberUpdate {
    fn extract_keys(&self) -> Extraction {
        Extraction {
            key_path: KeyPath::root(),
            context: RoutingContext {
                member: Some(self.new.clone()),
                guild_id: Some(self.guild_id),
                ..Default::default()
            },
        }
    }
}

impl KeyExtractor for MemberLeave {
    fn extract_keys(&self) -> Extraction {
        Extraction {
            key_path: KeyPath::root(),
            context: RoutingContext {
                member: Some(self.member.clone()),
                guild_id: Some(self.guild_id),
                ..Default::default()
            },
        }
    }
}

impl KeyExtractor for Ready {
    fn extract_keys(&self) -> Extraction {
        Extraction {
            key_path: KeyPath::root(),
            context: RoutingContext::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::event::RawEvent;
    use crate::model::Emoji;
    use crate::testing;

    #[test]
    fn test_message_keys() {
        let ana = testing::member(1, "ana", &["Yes Theory"]);
        let guild = testing::guild("Yes Theory Fam", vec![ana.clone()]);
        let channel = testing::guild_channel(&guild, 10, "bot-commands");

        let ext = testing::message(&channel, ana.user.clone(), "!voice up 5").extract_keys();
        assert_eq!(ext.key_path, KeyPath::new(["bot-commands", "!voice", "up"]));
        assert_eq!(ext.context.member, Some(ana));
        assert!(!ext.context.is_direct_message);
        assert_eq!(ext.context.channel_id, Some(10.into()));
        assert_eq!(ext.context.guild_id, Some(guild.id));
    }

    #[test]
    fn test_message_without_sub_trigger() {
        let guild = testing::guild("g", vec![]);
        let channel = testing::guild_channel(&guild, 10, "general");

        let ext = testing::message(&channel, testing::user(1, "ana"), "  !topic  ").extract_keys();
        assert_eq!(ext.key_path, KeyPath::new(["general", "!topic", WILDCARD]));
        // Not in the member cache.
        assert_eq!(ext.context.member, None);

        let empty = testing::message(&channel, testing::user(1, "ana"), "").extract_keys();
        assert_eq!(empty.key_path, KeyPath::new(["general", WILDCARD, WILDCARD]));
    }

    #[test]
    fn test_message_attached_member_wins() {
        let guild = testing::guild("g", vec![testing::member(1, "ana", &[])]);
        let channel = testing::guild_channel(&guild, 10, "general");
        let mut msg = testing::message(&channel, testing::user(1, "ana"), "hi");
        msg.member = Some(testing::member(1, "ana", &["Support"]));

        let ext = msg.extract_keys();
        assert!(ext.context.member.is_some_and(|m| m.has_role("Support")));
    }

    #[test]
    fn test_reaction_in_guild_channel() {
        let ben = testing::member(2, "ben", &["Support"]);
        let guild = testing::guild("g", vec![ben.clone()]);
        let channel = testing::guild_channel(&guild, 20, "travel-approvals");

        let RawEvent::ReactionAdd(event) = testing::reaction_add(&channel, "🚫", ben.user.clone())
        else {
            unreachable!()
        };
        let ext = event.extract_keys();
        assert_eq!(ext.key_path, KeyPath::new(["travel-approvals", "🚫"]));
        assert_eq!(ext.context.member, Some(ben));
        assert!(!ext.context.is_direct_message);
    }

    #[test]
    fn test_reaction_in_direct_message() {
        let channel = testing::direct_channel(4242, testing::user(3, "cam"));
        let event = testing::reaction_add(&channel, "👍", testing::user(3, "cam"));

        let ext = event.extract();
        assert_eq!(ext.key_path, KeyPath::new(["4242", "👍"]));
        assert!(ext.context.is_direct_message);
        assert_eq!(ext.context.member, None);
        assert_eq!(ext.context.guild_id, None);
    }

    #[test]
    fn test_message_in_direct_message() {
        let cam = testing::member(3, "cam", &["Support"]);
        let channel = testing::direct_channel(4242, cam.user.clone());
        let mut message = testing::message(&channel, cam.user.clone(), "!topic now");
        message.member = Some(cam);

        let ext = message.extract_keys();
        assert_eq!(ext.key_path, KeyPath::new(["4242", "!topic", "now"]));
        assert!(ext.context.is_direct_message);
        assert_eq!(ext.context.member, None);
        assert_eq!(ext.context.channel_id, Some(4242.into()));
        assert_eq!(ext.context.guild_id, None);
    }

    #[test]
    fn test_reaction_with_unresolved_channel() {
        let message = Arc::new(Message {
            id: 1.into(),
            channel: None,
            author: testing::user(1, "ana"),
            member: None,
            content: String::new(),
        });
        let event = ReactionEvent {
            reaction: crate::model::Reaction {
                message,
                emoji: Emoji { id: Some(5.into()), name: None },
            },
            user: testing::user(2, "ben"),
        };

        let ext = event.extract_keys();
        assert_eq!(ext.key_path, KeyPath::new([WILDCARD, WILDCARD]));
        assert!(!ext.context.is_direct_message);
        assert_eq!(ext.context.member, None);
        assert_eq!(ext.context.channel_id, None);
    }

    #[test]
    fn test_member_kinds_use_root_path() {
        let ana = testing::member(1, "ana", &["Seek Discomfort"]);
        let update = MemberUpdate {
            old: None,
            new: ana.clone(),
            guild_id: 7.into(),
        };
        let ext = update.extract_keys();
        assert!(ext.key_path.is_empty());
        assert_eq!(ext.context.member, Some(ana.clone()));

        let leave = MemberLeave {
            member: ana.clone(),
            guild_id: 7.into(),
        };
        assert_eq!(leave.extract_keys().context.member, Some(ana));

        let ready = Ready {
            user: testing::user(99, "yesbot"),
            guilds: vec![],
        };
        assert_eq!(ready.extract_keys().context, RoutingContext::default());
    }
}
