//! Extractor system for handler parameters.
//!
//! Any type implementing [`FromContext`] can appear as a handler parameter.
//! The built-in extractors cover everything a routed handler usually needs:
//!
//! | Extractor | Yields |
//! |---|---|
//! | [`Event<T>`] | the typed payload (`Message`, `ReactionEvent`, ...) |
//! | [`RawEvent`] | the untyped event |
//! | [`Member`] | the acting guild member (fails when unresolved) |
//! | [`Routing`] | the full routing context |
//! | [`Options`] | the handler's own options |
//! | [`Inject<T>`](crate::services::Inject) | a provided service |
//! | `Option<T>` | any of the above, never failing |
//!
//! When an extractor fails the handler is not run and the failure is logged
//! by the dispatcher.

use std::ops::Deref;
use std::sync::Arc;

use yesbot_core::{
    GuildMember, MemberLeave, MemberUpdate, Message, RawEvent, ReactionEvent, Ready, RoutingContext,
};

use crate::context::HandlerContext;
use crate::error::{ExtractError, ExtractResult};
use crate::options::HandlerOptions;

/// A type that can be extracted from a [`HandlerContext`].
///
/// ```rust,ignore
/// struct Words(Vec<String>);
///
/// impl FromContext for Words {
///     fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
///         let msg = Event::<Message>::from_context(ctx)?;
///         Ok(Words(msg.words().map(str::to_string).collect()))
///     }
/// }
/// ```
pub trait FromContext: Sized {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self>;
}

impl FromContext for RawEvent {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        Ok(ctx.event().clone())
    }
}

impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

// =============================================================================
// Event<T>
// =============================================================================

/// Payload types that can be pulled out of a [`RawEvent`].
pub trait FromRawEvent: Sized {
    fn from_raw(event: &RawEvent) -> Option<Arc<Self>>;
}

impl FromRawEvent for Message {
    fn from_raw(event: &RawEvent) -> Option<Arc<Self>> {
        match event {
            RawEvent::Message(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }
}

/// Matches both reaction-add and reaction-remove events.
impl FromRawEvent for ReactionEvent {
    fn from_raw(event: &RawEvent) -> Option<Arc<Self>> {
        match event {
            RawEvent::ReactionAdd(r) | RawEvent::ReactionRemove(r) => Some(Arc::clone(r)),
            _ => None,
        }
    }
}

impl FromRawEvent for MemberUpdate {
    fn from_raw(event: &RawEvent) -> Option<Arc<Self>> {
        match event {
            RawEvent::GuildMemberUpdate(u) => Some(Arc::clone(u)),
            _ => None,
        }
    }
}

impl FromRawEvent for MemberLeave {
    fn from_raw(event: &RawEvent) -> Option<Arc<Self>> {
        match event {
            RawEvent::MemberLeave(l) => Some(Arc::clone(l)),
            _ => None,
        }
    }
}

impl FromRawEvent for Ready {
    fn from_raw(event: &RawEvent) -> Option<Arc<Self>> {
        match event {
            RawEvent::Ready(r) => Some(Arc::clone(r)),
            _ => None,
        }
    }
}

/// The typed payload of the current event.
///
/// ```rust,ignore
/// async fn on_voice(msg: Event<Message>) {
///     tracing::info!(content = %msg.content, "voice command");
/// }
/// ```
#[derive(Debug)]
pub struct Event<T>(pub Arc<T>);

impl<T> Deref for Event<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for Event<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: FromRawEvent> FromContext for Event<T> {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        T::from_raw(ctx.event())
            .map(Event)
            .ok_or_else(|| ExtractError::EventTypeMismatch {
                expected: std::any::type_name::<T>(),
                got: ctx.event().name(),
            })
    }
}

// =============================================================================
// Routing data
// =============================================================================

/// The acting guild member. Use `Option<Member>` when it may be absent.
#[derive(Debug, Clone)]
pub struct Member(pub GuildMember);

impl Deref for Member {
    type Target = GuildMember;

    fn deref(&self) -> &GuildMember {
        &self.0
    }
}

impl FromContext for Member {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        ctx.member().cloned().map(Member).ok_or(ExtractError::MissingMember)
    }
}

/// The routing context produced by the key extractor.
#[derive(Debug, Clone)]
pub struct Routing(pub RoutingContext);

impl Deref for Routing {
    type Target = RoutingContext;

    fn deref(&self) -> &RoutingContext {
        &self.0
    }
}

impl FromContext for Routing {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        Ok(Routing(ctx.routing().clone()))
    }
}

/// The options the invoked handler was registered with.
#[derive(Debug, Clone)]
pub struct Options(pub Arc<HandlerOptions>);

impl Deref for Options {
    type Target = HandlerOptions;

    fn deref(&self) -> &HandlerOptions {
        &self.0
    }
}

impl FromContext for Options {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        Ok(Options(Arc::clone(ctx.options())))
    }
}
