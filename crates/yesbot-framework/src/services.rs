//! Injected collaborators.
//!
//! Handlers never reach for globals. Whatever they need (a platform client,
//! a database pool, a clock) is provided once at startup and looked up by type
//! through the [`Inject`] extractor.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::context::HandlerContext;
use crate::error::{ExtractError, ExtractResult};
use crate::extractor::FromContext;

/// Type-erased service entry. The inner `dyn Any` is an `Arc<T>`, which keeps
/// trait-object services (`Arc<dyn Trait>`) retrievable.
type ServiceArc = Arc<dyn Any + Send + Sync>;

/// A map of services keyed by type.
#[derive(Default, Clone)]
pub struct Services {
    map: HashMap<TypeId, ServiceArc>,
    names: Vec<&'static str>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `service`, replacing any previous service of the same type.
    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) {
        if self
            .map
            .insert(TypeId::of::<T>(), Arc::new(service) as ServiceArc)
            .is_none()
        {
            self.names.push(type_name::<T>());
        }
    }

    pub fn get<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.downcast_ref::<Arc<T>>().map(Arc::clone))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.names).finish()
    }
}

/// Extractor for a provided service.
///
/// ```rust,ignore
/// async fn decline(event: Event<ReactionEvent>, client: Inject<dyn PlatformClient>) {
///     client.delete_message(event.reaction.message.id).await;
/// }
/// ```
pub struct Inject<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized + Send + Sync + 'static> FromContext for Inject<T> {
    fn from_context(ctx: &HandlerContext) -> ExtractResult<Self> {
        ctx.get_service::<T>()
            .map(Inject)
            .ok_or(ExtractError::MissingService(type_name::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    #[test]
    fn test_concrete_and_trait_object_services() {
        let mut services = Services::new();
        services.insert(Arc::new(42u32));
        services.insert::<dyn Greeter>(Arc::new(English));

        assert_eq!(services.get::<u32>().as_deref(), Some(&42));
        assert_eq!(services.get::<dyn Greeter>().map(|g| g.greet()), Some("hello".into()));
        assert!(services.get::<String>().is_none());
        assert_eq!(services.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut services = Services::new();
        services.insert(Arc::new(1u8));
        services.insert(Arc::new(2u8));
        assert_eq!(services.get::<u8>().as_deref(), Some(&2));
        assert_eq!(services.len(), 1);
    }
}
