//! Error types for the YesBot framework.

use thiserror::Error;
use yesbot_core::EventKind;

pub use tower::BoxError;

/// Errors raised while registering a handler.
///
/// All of these are startup-fatal: the bootstrap is expected to propagate
/// them with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Both a trigger and an emoji were given.
    #[error("handler '{name}': trigger and emoji are mutually exclusive")]
    ConflictingKeys { name: String },

    /// A message handler without a trigger.
    #[error("handler '{name}': {kind} handlers require a trigger")]
    MissingTrigger { name: String, kind: EventKind },

    /// A reaction handler without an emoji.
    #[error("handler '{name}': {kind} handlers require an emoji")]
    MissingEmoji { name: String, kind: EventKind },

    #[error("handler '{name}': {kind} handlers cannot have a trigger or sub-trigger")]
    TriggerOnReaction { name: String, kind: EventKind },

    #[error("handler '{name}': message handlers cannot have an emoji")]
    EmojiOnMessage { name: String },

    #[error("handler '{name}': sub-trigger given without a trigger")]
    SubTriggerWithoutTrigger { name: String },

    /// Channel names, trigger or emoji on a kind that routes from the root.
    #[error("handler '{name}': {kind} events carry no routing keys")]
    KeysOnRootKind { name: String, kind: EventKind },

    /// An empty string where a routing segment is expected. The empty string
    /// is reserved as the wildcard.
    #[error("handler '{name}': {field} must not be empty")]
    EmptySegment { name: String, field: &'static str },

    /// The same channel listed twice would store the handler twice under one path.
    #[error("handler '{name}': channel '{channel}' is listed more than once")]
    DuplicateChannel { name: String, channel: String },

    /// A trigger, sub-trigger or emoji containing whitespace. Messages are
    /// split into words, so such a segment never matches.
    #[error("handler '{name}': {field} {value:?} must be a single word")]
    WhitespaceInSegment {
        name: String,
        field: &'static str,
        value: String,
    },

    /// Role restrictions on a kind whose events never carry a member.
    #[error("handler '{name}': {kind} events have no acting member, allowed_roles can never pass")]
    RolesWithoutMember { name: String, kind: EventKind },

    /// Registration attempted after dispatch started.
    #[error("handler '{name}': registry is frozen, register handlers before starting the runtime")]
    Frozen { name: String },
}

/// Result type for registration.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors that can occur while extracting handler parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The handler asked for a payload the event does not carry.
    #[error("event type mismatch: expected '{expected}', got '{got}'")]
    EventTypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// The handler asked for the acting member but none was resolved.
    #[error("no guild member resolved for this event")]
    MissingMember,

    /// The handler injects a service nobody provided.
    #[error("service '{0}' was not provided")]
    MissingService(&'static str),

    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Why a single handler invocation failed.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("parameter extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("handler returned an error: {0}")]
    Failed(BoxError),

    #[error("handler panicked: {0}")]
    Panicked(String),
}
