//! Handler registration.
//!
//! Registration is an explicit startup phase: handlers are added to a
//! [`RegistryBuilder`], which is then consumed into an immutable
//! [`Dispatcher`]. Nothing can be registered once dispatch begins.
//!
//! ```rust,ignore
//! let mut registry = RegistryBuilder::new();
//! registry
//!     .register(HandlerOptions::command("!voice").sub_trigger("up"), voice_up)?
//!     .register(HandlerOptions::reaction_add("🚫").channel("travel-approvals"), decline)?
//!     .provide::<dyn PlatformClient>(client);
//!
//! let dispatcher = registry.build();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use yesbot_core::{EventKind, RoutingTree};

use crate::catalog::HandlerSummary;
use crate::dispatcher::Dispatcher;
use crate::error::RegistrationResult;
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::options::HandlerOptions;
use crate::permission::{DenialPolicy, PermissionGate};
use crate::services::Services;

/// A handler unit together with its options, as stored in the routing tree.
///
/// One binding is shared by every key path its options expand to.
pub struct Binding {
    pub options: Arc<HandlerOptions>,
    pub handler: BoxedHandler,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Routing trees, one per event kind.
pub(crate) type Trees = HashMap<EventKind, RoutingTree<Arc<Binding>>>;

/// Collects handler registrations and services during startup.
#[derive(Default)]
pub struct RegistryBuilder {
    trees: Trees,
    catalog: Vec<HandlerSummary>,
    services: Services,
    denial_policy: DenialPolicy,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `options` and stores `handler` under every key path they
    /// expand to.
    pub fn register<H, T>(&mut self, options: HandlerOptions, handler: H) -> RegistrationResult<&mut Self>
    where
        H: Handler<T>,
        T: 'static,
    {
        if let Err(e) = options.validate() {
            warn!(handler = %options.name, error = %e, "Rejected handler registration");
            return Err(e);
        }

        let paths = options.key_paths();
        let summary = HandlerSummary::from_options(&options);
        let binding = Arc::new(Binding {
            options: Arc::new(options),
            handler: into_handler(handler),
        });

        let tree = self.trees.entry(binding.options.event).or_default();
        for path in &paths {
            tree.insert(path, Arc::clone(&binding));
        }

        debug!(
            handler = %summary.name,
            event = %summary.event,
            paths = ?summary.key_paths,
            "Registered handler"
        );
        self.catalog.push(summary);
        Ok(self)
    }

    /// Makes `service` available to handlers through
    /// [`Inject<T>`](crate::services::Inject).
    pub fn provide<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) -> &mut Self {
        debug!(service = std::any::type_name::<T>(), "Provided service");
        self.services.insert(service);
        self
    }

    pub fn denial_policy(&mut self, policy: DenialPolicy) -> &mut Self {
        self.denial_policy = policy;
        self
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    pub fn catalog(&self) -> &[HandlerSummary] {
        &self.catalog
    }

    /// Freezes the registry into a dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher::new(
            self.trees,
            self.catalog,
            Arc::new(self.services),
            PermissionGate::new(self.denial_policy),
        )
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("handlers", &self.catalog.len())
            .field("services", &self.services)
            .field("denial_policy", &self.denial_policy)
            .finish()
    }
}
