//! The context handed to handlers.
//!
//! One [`HandlerContext`] is built for every handler invocation. It bundles
//! the original [`RawEvent`], the [`RoutingContext`] the key extractor
//! produced, the handler's own [`HandlerOptions`] and the shared
//! [`Services`]. Handler parameters are extracted from it through
//! [`FromContext`](crate::extractor::FromContext).

use std::sync::Arc;

use yesbot_core::{GuildMember, RawEvent, RoutingContext};

use crate::error::{ExtractError, ExtractResult};
use crate::options::HandlerOptions;
use crate::services::Services;

#[derive(Debug, Clone)]
pub struct HandlerContext {
    event: RawEvent,
    routing: RoutingContext,
    options: Arc<HandlerOptions>,
    services: Arc<Services>,
}

impl HandlerContext {
    pub fn new(
        event: RawEvent,
        routing: RoutingContext,
        options: Arc<HandlerOptions>,
        services: Arc<Services>,
    ) -> Self {
        Self {
            event,
            routing,
            options,
            services,
        }
    }

    /// The event exactly as the platform client delivered it.
    pub fn event(&self) -> &RawEvent {
        &self.event
    }

    pub fn routing(&self) -> &RoutingContext {
        &self.routing
    }

    /// The acting member, if the extractor resolved one.
    pub fn member(&self) -> Option<&GuildMember> {
        self.routing.member.as_ref()
    }

    pub fn is_direct_message(&self) -> bool {
        self.routing.is_direct_message
    }

    /// Options of the handler being invoked.
    pub fn options(&self) -> &Arc<HandlerOptions> {
        &self.options
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Looks up a provided service by type.
    pub fn get_service<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.services.get::<T>()
    }

    pub fn require_service<T: ?Sized + 'static>(&self) -> ExtractResult<Arc<T>> {
        self.get_service::<T>()
            .ok_or(ExtractError::MissingService(std::any::type_name::<T>()))
    }
}
