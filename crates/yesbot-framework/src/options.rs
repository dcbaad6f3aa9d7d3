//! Handler options.
//!
//! [`HandlerOptions`] is the static description a handler is registered
//! with: which [`EventKind`] it reacts to, under which channels, triggers or
//! emoji, and which roles may invoke it.
//!
//! ```rust,ignore
//! // "!voice up" in #bot-commands, Yes Theory members only
//! let opts = HandlerOptions::command("!voice")
//!     .sub_trigger("up")
//!     .channel("bot-commands")
//!     .allowed_role("Yes Theory")
//!     .name("voice-up");
//!
//! // 🚫 on any message in #travel-approvals, Support only
//! let opts = HandlerOptions::reaction_add("🚫")
//!     .channel("travel-approvals")
//!     .allowed_role("Support");
//! ```

use serde::{Deserialize, Serialize};
use yesbot_core::{EventKind, KeyPath, KeyShape, WILDCARD};

use crate::error::{RegistrationError, RegistrationResult};

fn default_name() -> String {
    "unnamed".to_string()
}

/// Per-registration configuration of a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerOptions {
    /// Label used in logs and the handler catalog.
    #[serde(default = "default_name")]
    pub name: String,
    pub event: EventKind,
    /// Channels the handler listens in. Empty means every channel.
    #[serde(default)]
    pub channel_names: Vec<String>,
    /// Leading word of a message.
    #[serde(default)]
    pub trigger: Option<String>,
    /// Second word of a message. `None` accepts any second word.
    #[serde(default)]
    pub sub_trigger: Option<String>,
    /// Emoji name for reaction handlers.
    #[serde(default)]
    pub emoji: Option<String>,
    /// Role names allowed to invoke. Empty means unrestricted.
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl HandlerOptions {
    pub fn new(event: EventKind) -> Self {
        Self {
            name: default_name(),
            event,
            channel_names: Vec::new(),
            trigger: None,
            sub_trigger: None,
            emoji: None,
            allowed_roles: Vec::new(),
            description: None,
        }
    }

    /// A message handler keyed by its first word.
    pub fn command(trigger: impl Into<String>) -> Self {
        Self::new(EventKind::Message).trigger(trigger)
    }

    pub fn reaction_add(emoji: impl Into<String>) -> Self {
        Self::new(EventKind::ReactionAdd).emoji(emoji)
    }

    pub fn reaction_remove(emoji: impl Into<String>) -> Self {
        Self::new(EventKind::ReactionRemove).emoji(emoji)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a channel name. Duplicates are ignored.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        let channel = channel.into();
        if !self.channel_names.contains(&channel) {
            self.channel_names.push(channel);
        }
        self
    }

    pub fn channels<I, S>(self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        channels.into_iter().fold(self, Self::channel)
    }

    pub fn trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn sub_trigger(mut self, sub_trigger: impl Into<String>) -> Self {
        self.sub_trigger = Some(sub_trigger.into());
        self
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn allowed_role(mut self, role: impl Into<String>) -> Self {
        let role = role.into();
        if !self.allowed_roles.contains(&role) {
            self.allowed_roles.push(role);
        }
        self
    }

    pub fn allowed_roles<I, S>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        roles.into_iter().fold(self, Self::allowed_role)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks that the keys match the event kind's key shape.
    pub fn validate(&self) -> RegistrationResult<()> {
        let name = || self.name.clone();
        let kind = self.event;

        if self.trigger.is_some() && self.emoji.is_some() {
            return Err(RegistrationError::ConflictingKeys { name: name() });
        }
        if self.channel_names.iter().any(|c| c == WILDCARD) {
            return Err(RegistrationError::EmptySegment {
                name: name(),
                field: "channel name",
            });
        }
        for (i, channel) in self.channel_names.iter().enumerate() {
            if self.channel_names[..i].contains(channel) {
                return Err(RegistrationError::DuplicateChannel {
                    name: name(),
                    channel: channel.clone(),
                });
            }
        }
        for (field, value) in [
            ("trigger", &self.trigger),
            ("sub-trigger", &self.sub_trigger),
            ("emoji", &self.emoji),
        ] {
            if let Some(value) = value.as_deref().filter(|v| v.contains(char::is_whitespace)) {
                return Err(RegistrationError::WhitespaceInSegment {
                    name: name(),
                    field,
                    value: value.to_string(),
                });
            }
        }

        match kind.key_shape() {
            KeyShape::Command => {
                if self.emoji.is_some() {
                    return Err(RegistrationError::EmojiOnMessage { name: name() });
                }
                match (&self.trigger, &self.sub_trigger) {
                    (None, Some(_)) => {
                        return Err(RegistrationError::SubTriggerWithoutTrigger { name: name() });
                    }
                    (None, None) => return Err(RegistrationError::MissingTrigger { name: name(), kind }),
                    (Some(t), _) if t == WILDCARD => {
                        return Err(RegistrationError::EmptySegment {
                            name: name(),
                            field: "trigger",
                        });
                    }
                    (_, Some(s)) if s == WILDCARD => {
                        return Err(RegistrationError::EmptySegment {
                            name: name(),
                            field: "sub-trigger",
                        });
                    }
                    _ => {}
                }
            }
            KeyShape::Reaction => {
                if self.trigger.is_some() || self.sub_trigger.is_some() {
                    return Err(RegistrationError::TriggerOnReaction { name: name(), kind });
                }
                match &self.emoji {
                    None => return Err(RegistrationError::MissingEmoji { name: name(), kind }),
                    Some(e) if e == WILDCARD => {
                        return Err(RegistrationError::EmptySegment {
                            name: name(),
                            field: "emoji",
                        });
                    }
                    Some(_) => {}
                }
            }
            KeyShape::Root => {
                if !self.channel_names.is_empty()
                    || self.trigger.is_some()
                    || self.sub_trigger.is_some()
                    || self.emoji.is_some()
                {
                    return Err(RegistrationError::KeysOnRootKind { name: name(), kind });
                }
                if kind == EventKind::Ready && !self.allowed_roles.is_empty() {
                    return Err(RegistrationError::RolesWithoutMember { name: name(), kind });
                }
            }
        }
        Ok(())
    }

    /// The key paths this handler is stored under, one per channel.
    ///
    /// Only meaningful for options that passed [`validate`](Self::validate).
    pub fn key_paths(&self) -> Vec<KeyPath> {
        let channels: Vec<&str> = if self.channel_names.is_empty() {
            vec![WILDCARD]
        } else {
            self.channel_names.iter().map(String::as_str).collect()
        };

        match self.event.key_shape() {
            KeyShape::Command => {
                let trigger = self.trigger.as_deref().unwrap_or(WILDCARD);
                let sub_trigger = self.sub_trigger.as_deref().unwrap_or(WILDCARD);
                channels
                    .into_iter()
                    .map(|channel| KeyPath::new([channel, trigger, sub_trigger]))
                    .collect()
            }
            KeyShape::Reaction => {
                let emoji = self.emoji.as_deref().unwrap_or(WILDCARD);
                channels
                    .into_iter()
                    .map(|channel| KeyPath::new([channel, emoji]))
                    .collect()
            }
            KeyShape::Root => vec![KeyPath::root()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_paths_per_channel() {
        let opts = HandlerOptions::command("!voice")
            .sub_trigger("up")
            .channels(["bot-commands", "voice-chat", "bot-commands"]);

        assert_eq!(opts.channel_names.len(), 2);
        assert_eq!(opts.validate(), Ok(()));
        assert_eq!(
            opts.key_paths(),
            vec![
                KeyPath::new(["bot-commands", "!voice", "up"]),
                KeyPath::new(["voice-chat", "!voice", "up"]),
            ]
        );
    }

    #[test]
    fn test_wildcard_defaults() {
        let opts = HandlerOptions::command("!topic");
        assert_eq!(opts.name, "unnamed");
        assert_eq!(opts.key_paths(), vec![KeyPath::new([WILDCARD, "!topic", WILDCARD])]);

        let opts = HandlerOptions::reaction_add("👍");
        assert_eq!(opts.key_paths(), vec![KeyPath::new([WILDCARD, "👍"])]);

        let opts = HandlerOptions::new(EventKind::Ready);
        assert_eq!(opts.validate(), Ok(()));
        assert_eq!(opts.key_paths(), vec![KeyPath::root()]);
    }

    #[test]
    fn test_rejects_conflicting_keys() {
        let opts = HandlerOptions::command("!x").emoji("👍").name("bad");
        assert_eq!(
            opts.validate(),
            Err(RegistrationError::ConflictingKeys { name: "bad".into() })
        );
    }

    #[test]
    fn test_rejects_missing_keys() {
        assert!(matches!(
            HandlerOptions::new(EventKind::Message).validate(),
            Err(RegistrationError::MissingTrigger { .. })
        ));
        assert!(matches!(
            HandlerOptions::new(EventKind::ReactionRemove).validate(),
            Err(RegistrationError::MissingEmoji { kind: EventKind::ReactionRemove, .. })
        ));
        assert!(matches!(
            HandlerOptions::new(EventKind::Message).sub_trigger("up").validate(),
            Err(RegistrationError::SubTriggerWithoutTrigger { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(matches!(
            HandlerOptions::reaction_add("👍").trigger("!x").validate(),
            Err(RegistrationError::ConflictingKeys { .. })
        ));
        assert!(matches!(
            HandlerOptions::reaction_add("👍").sub_trigger("x").validate(),
            Err(RegistrationError::TriggerOnReaction { .. })
        ));
        assert!(matches!(
            HandlerOptions::new(EventKind::Message).emoji("👍").validate(),
            Err(RegistrationError::EmojiOnMessage { .. })
        ));
        assert!(matches!(
            HandlerOptions::new(EventKind::MemberLeave).channel("general").validate(),
            Err(RegistrationError::KeysOnRootKind { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_segments() {
        for opts in [
            HandlerOptions::command(""),
            HandlerOptions::command("!voice").sub_trigger(""),
            HandlerOptions::reaction_add(""),
            HandlerOptions::reaction_add("👍").channel(""),
        ] {
            assert!(
                matches!(opts.validate(), Err(RegistrationError::EmptySegment { .. })),
                "{opts:?}"
            );
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let opts: HandlerOptions = serde_json::from_str(
            r#"{ "event": "reaction_add", "emoji": "🚫", "channel_names": ["travel-approvals"] }"#,
        )
        .unwrap();
        assert_eq!(opts.name, "unnamed");
        assert_eq!(opts.key_paths(), vec![KeyPath::new(["travel-approvals", "🚫"])]);
    }

    #[test]
    fn test_rejects_duplicate_channels_from_config() {
        let opts: HandlerOptions = serde_json::from_str(
            r#"{ "event": "reaction_add", "emoji": "👍", "channel_names": ["general", "general"] }"#,
        )
        .unwrap();
        assert_eq!(
            opts.validate(),
            Err(RegistrationError::DuplicateChannel {
                name: "unnamed".into(),
                channel: "general".into(),
            })
        );
    }

    #[test]
    fn test_rejects_multi_word_segments() {
        for opts in [
            HandlerOptions::command("!voice up"),
            HandlerOptions::command("!voice").sub_trigger("up now"),
            HandlerOptions::reaction_add("thumbs up"),
        ] {
            assert!(
                matches!(opts.validate(), Err(RegistrationError::WhitespaceInSegment { .. })),
                "{opts:?}"
            );
        }
    }

    #[test]
    fn test_rejects_roles_on_ready() {
        assert_eq!(
            HandlerOptions::new(EventKind::Ready)
                .allowed_role("Support")
                .name("greet")
                .validate(),
            Err(RegistrationError::RolesWithoutMember {
                name: "greet".into(),
                kind: EventKind::Ready,
            })
        );
        assert_eq!(
            HandlerOptions::new(EventKind::MemberLeave)
                .allowed_role("Support")
                .validate(),
            Ok(())
        );
    }
}
