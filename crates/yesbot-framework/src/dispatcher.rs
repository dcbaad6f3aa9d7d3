//! Event dispatcher.
//!
//! The [`Dispatcher`] is the frozen result of registration. For every raw
//! event it:
//!
//! 1. runs the key extractor for the event's kind,
//! 2. looks the key path up in that kind's routing tree,
//! 3. filters the matches through the [`PermissionGate`],
//! 4. invokes the surviving handlers one after another in registration order.
//!
//! Handler invocations are isolated from each other. An `Err` return, a
//! failed parameter extraction or a panic is logged and counted, and the
//! remaining handlers still run. Nothing is ever propagated back to the
//! caller; [`dispatch`](Dispatcher::dispatch) returns a [`DispatchReport`].
//!
//! The dispatcher holds no locks and is shared as `Arc<Dispatcher>`.

use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, debug, debug_span, error, trace};
use yesbot_core::{EventKind, Extraction, KeyPath, RawEvent, RoutingContext};

use crate::catalog::HandlerSummary;
use crate::context::HandlerContext;
use crate::error::InvocationError;
use crate::permission::PermissionGate;
use crate::registry::{Binding, Trees};
use crate::services::Services;

/// Outcome counters for one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub kind: EventKind,
    /// Bindings found in the routing tree.
    pub matched: usize,
    /// Matches rejected by the permission gate.
    pub denied: usize,
    pub succeeded: usize,
    /// Invocations that returned `Err`, failed extraction or panicked.
    pub failed: usize,
}

impl DispatchReport {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            matched: 0,
            denied: 0,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Handlers that were actually run.
    pub fn invoked(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Routes raw events to registered handlers.
pub struct Dispatcher {
    trees: Trees,
    catalog: Vec<HandlerSummary>,
    services: Arc<Services>,
    gate: PermissionGate,
}

impl Dispatcher {
    pub(crate) fn new(
        trees: Trees,
        catalog: Vec<HandlerSummary>,
        services: Arc<Services>,
        gate: PermissionGate,
    ) -> Self {
        Self {
            trees,
            catalog,
            services,
            gate,
        }
    }

    /// Every registered handler, in registration order.
    pub fn catalog(&self) -> &[HandlerSummary] {
        &self.catalog
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Bindings matching `path` for `kind`, before permission checks.
    pub fn lookup(&self, kind: EventKind, path: &KeyPath) -> Vec<Arc<Binding>> {
        self.trees
            .get(&kind)
            .map(|tree| tree.lookup(path).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Dispatches one event to every matching, permitted handler.
    pub async fn dispatch(&self, event: RawEvent) -> DispatchReport {
        let kind = event.kind();
        let Extraction { key_path, context } = event.extract();
        let span = debug_span!("dispatch", event = %kind, path = %key_path);

        self.run(event, &key_path, context).instrument(span).await
    }

    async fn run(&self, event: RawEvent, key_path: &KeyPath, routing: RoutingContext) -> DispatchReport {
        let kind = event.kind();
        let mut report = DispatchReport::new(kind);

        let candidates = self.lookup(kind, key_path);
        report.matched = candidates.len();
        if candidates.is_empty() {
            trace!("No handler matched");
            return report;
        }

        for binding in candidates {
            if !self.gate.check(&binding.options, &routing) {
                report.denied += 1;
                continue;
            }

            let ctx = Arc::new(HandlerContext::new(
                event.clone(),
                routing.clone(),
                Arc::clone(&binding.options),
                Arc::clone(&self.services),
            ));

            let span = debug_span!("handler", name = %binding.options.name);
            match invoke(&binding, ctx).instrument(span).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(handler = %binding.options.name, event = %kind, error = %e, "Handler failed");
                }
            }
        }

        debug!(
            matched = report.matched,
            denied = report.denied,
            succeeded = report.succeeded,
            failed = report.failed,
            "Dispatch finished"
        );
        report
    }

    /// Wraps the dispatcher into a cloneable tower service.
    pub fn into_service(self: Arc<Self>) -> DispatchService {
        DispatchService { inner: self }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.catalog.len())
            .field("services", &self.services)
            .field("gate", &self.gate)
            .finish()
    }
}

async fn invoke(binding: &Binding, ctx: Arc<HandlerContext>) -> Result<(), InvocationError> {
    let handler = Arc::clone(&binding.handler);
    match AssertUnwindSafe(async move { handler(ctx).await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(InvocationError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// ============================================================================
// Tower integration
// ============================================================================

/// A [`tower::Service`] over a shared [`Dispatcher`].
///
/// Always ready; never fails. Lets event sources drive the dispatcher through
/// standard tower plumbing (`ServiceExt::oneshot`, buffers, and so on).
#[derive(Debug, Clone)]
pub struct DispatchService {
    inner: Arc<Dispatcher>,
}

impl DispatchService {
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.inner
    }
}

impl Service<RawEvent> for DispatchService {
    type Response = DispatchReport;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<DispatchReport, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: RawEvent) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { Ok(inner.dispatch(event).await) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tower::ServiceExt;
    use yesbot_core::{MemberLeave, Message, Ready, testing};

    use super::*;
    use crate::extractor::{Event, Member, Routing};
    use crate::handler::Handler;
    use crate::options::HandlerOptions;
    use crate::registry::RegistryBuilder;
    use crate::services::Inject;

    fn counting(counter: &Arc<AtomicUsize>) -> impl Handler<()> {
        let counter = Arc::clone(counter);
        move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(Ordering::SeqCst)
    }

    struct Server {
        guild: Arc<yesbot_core::Guild>,
    }

    impl Server {
        fn new() -> Self {
            Self {
                guild: testing::guild(
                    "Yes Theory Fam",
                    vec![
                        testing::member(1, "ana", &["Yes Theory"]),
                        testing::member(2, "ben", &["Support"]),
                        testing::member(3, "cam", &[]),
                    ],
                ),
            }
        }

        fn say(&self, channel: &str, user: u64, content: &str) -> RawEvent {
            let channel = testing::guild_channel(&self.guild, 10, channel);
            testing::message_event(&channel, self.user(user), content)
        }

        fn react(&self, channel: &str, user: u64, emoji: &str) -> RawEvent {
            let channel = testing::guild_channel(&self.guild, 20, channel);
            testing::reaction_add(&channel, emoji, self.user(user))
        }

        fn user(&self, id: u64) -> yesbot_core::User {
            self.guild
                .member(id.into())
                .map(|m| m.user.clone())
                .unwrap_or_else(|| testing::user(id, "stranger"))
        }
    }

    #[tokio::test]
    async fn test_voice_command_scenario() {
        let (a, b) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let mut registry = RegistryBuilder::new();
        registry
            .register(
                HandlerOptions::command("!voice").sub_trigger("up").channel("bot-commands"),
                counting(&a),
            )
            .unwrap()
            .register(
                HandlerOptions::command("!voice").sub_trigger("down").channel("bot-commands"),
                counting(&b),
            )
            .unwrap();
        let dispatcher = registry.build();
        let server = Server::new();

        let report = dispatcher.dispatch(server.say("bot-commands", 1, "!voice up")).await;
        assert_eq!((count(&a), count(&b)), (1, 0));
        assert_eq!(report.succeeded, 1);

        let report = dispatcher.dispatch(server.say("general", 1, "!voice up")).await;
        assert_eq!((count(&a), count(&b)), (1, 0));
        assert_eq!(report.matched, 0);

        dispatcher.dispatch(server.say("bot-commands", 1, "!voice down")).await;
        assert_eq!((count(&a), count(&b)), (1, 1));
    }

    #[tokio::test]
    async fn test_wildcard_channel_reaction_runs_once_everywhere() {
        let c = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry.register(HandlerOptions::reaction_add("👍"), counting(&c)).unwrap();
        let dispatcher = registry.build();
        let server = Server::new();

        for (i, channel) in ["general", "random", "bot-commands"].into_iter().enumerate() {
            let report = dispatcher.dispatch(server.react(channel, 3, "👍")).await;
            assert_eq!(report.succeeded, 1);
            assert_eq!(count(&c), i + 1);
        }

        let dm = testing::direct_channel(4242, testing::user(3, "cam"));
        dispatcher
            .dispatch(testing::reaction_add(&dm, "👍", testing::user(3, "cam")))
            .await;
        assert_eq!(count(&c), 4);

        dispatcher.dispatch(server.react("general", 3, "🎉")).await;
        assert_eq!(count(&c), 4);
    }

    #[tokio::test]
    async fn test_named_channels_are_not_reached_from_others() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry
            .register(
                HandlerOptions::reaction_add("🚫").channel("travel-approvals"),
                counting(&hits),
            )
            .unwrap();
        let dispatcher = registry.build();
        let server = Server::new();

        dispatcher.dispatch(server.react("general", 2, "🚫")).await;
        dispatcher.dispatch(server.react("travel-approvals-old", 2, "🚫")).await;
        assert_eq!(count(&hits), 0);

        dispatcher.dispatch(server.react("travel-approvals", 2, "🚫")).await;
        assert_eq!(count(&hits), 1);
    }

    #[tokio::test]
    async fn test_repeated_channel_runs_handler_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();

        let from_config: HandlerOptions = serde_json::from_str(
            r#"{ "event": "reaction_add", "emoji": "👍", "channel_names": ["general", "general"] }"#,
        )
        .unwrap();
        assert!(matches!(
            registry.register(from_config, counting(&hits)),
            Err(crate::error::RegistrationError::DuplicateChannel { .. })
        ));

        registry
            .register(
                HandlerOptions::reaction_add("👍").channels(["general", "general"]),
                counting(&hits),
            )
            .unwrap();
        let dispatcher = registry.build();

        let report = dispatcher.dispatch(Server::new().react("general", 3, "👍")).await;
        assert_eq!(report.matched, 1);
        assert_eq!(count(&hits), 1);
    }

    #[tokio::test]
    async fn test_disjoint_paths_and_distinct_reaction_kinds() {
        let (topic, add, remove) = (
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        );
        let mut registry = RegistryBuilder::new();
        registry
            .register(HandlerOptions::command("!topic"), counting(&topic))
            .unwrap()
            .register(HandlerOptions::reaction_add("⭐"), counting(&add))
            .unwrap()
            .register(HandlerOptions::reaction_remove("⭐"), counting(&remove))
            .unwrap();
        let dispatcher = registry.build();
        let server = Server::new();

        dispatcher.dispatch(server.say("general", 3, "!topic please")).await;
        dispatcher.dispatch(server.react("general", 3, "⭐")).await;
        assert_eq!((count(&topic), count(&add), count(&remove)), (1, 1, 0));

        let channel = testing::guild_channel(&server.guild, 20, "general");
        dispatcher
            .dispatch(testing::reaction_remove(&channel, "⭐", server.user(3)))
            .await;
        assert_eq!((count(&topic), count(&add), count(&remove)), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_redispatch_reinvokes() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry.register(HandlerOptions::command("!topic"), counting(&hits)).unwrap();
        let dispatcher = registry.build();

        let event = Server::new().say("general", 1, "!topic");
        dispatcher.dispatch(event.clone()).await;
        dispatcher.dispatch(event).await;
        assert_eq!(count(&hits), 2);
    }

    #[tokio::test]
    async fn test_permission_gate() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry
            .register(
                HandlerOptions::reaction_add("🚫")
                    .channel("travel-approvals")
                    .allowed_role("Support"),
                counting(&hits),
            )
            .unwrap();
        let dispatcher = registry.build();
        let server = Server::new();

        let report = dispatcher.dispatch(server.react("travel-approvals", 2, "🚫")).await;
        assert_eq!((report.matched, report.denied, report.succeeded), (1, 0, 1));

        // No roles.
        let report = dispatcher.dispatch(server.react("travel-approvals", 3, "🚫")).await;
        assert_eq!((report.matched, report.denied, report.failed), (1, 1, 0));

        // Not resolvable in the guild.
        let report = dispatcher.dispatch(server.react("travel-approvals", 77, "🚫")).await;
        assert_eq!((report.denied, report.failed), (1, 0));

        assert_eq!(count(&hits), 1);
    }

    #[tokio::test]
    async fn test_failing_handlers_do_not_stop_siblings() {
        async fn fails() -> anyhow::Result<()> {
            anyhow::bail!("channel not found")
        }
        async fn panics() {
            panic!("boom")
        }

        let sibling = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry
            .register(HandlerOptions::command("!voice").name("fails"), fails)
            .unwrap()
            .register(HandlerOptions::command("!voice").name("panics"), panics)
            .unwrap()
            .register(HandlerOptions::command("!voice").name("wrong-payload"), |_: Event<Ready>| async {})
            .unwrap()
            .register(HandlerOptions::command("!voice").name("sibling"), counting(&sibling))
            .unwrap();
        let dispatcher = registry.build();

        let report = dispatcher.dispatch(Server::new().say("general", 1, "!voice up")).await;
        assert_eq!(report.matched, 4);
        assert_eq!(report.failed, 3);
        assert_eq!(report.succeeded, 1);
        assert_eq!(count(&sibling), 1);
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = RegistryBuilder::new();
        for (name, channel) in [("first", Some("general")), ("second", None), ("third", Some("general"))] {
            let mut opts = HandlerOptions::reaction_add("👍").name(name);
            if let Some(channel) = channel {
                opts = opts.channel(channel);
            }
            let order = Arc::clone(&order);
            registry
                .register(opts, move |opts: crate::extractor::Options| {
                    let order = Arc::clone(&order);
                    async move {
                        order.lock().unwrap().push(opts.name.clone());
                    }
                })
                .unwrap();
        }
        let dispatcher = registry.build();

        dispatcher.dispatch(Server::new().react("general", 1, "👍")).await;
        assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_direct_message_routing() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let named = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        let seen_in = Arc::clone(&seen);
        registry
            .register(HandlerOptions::reaction_add("👍"), move |routing: Routing| {
                let seen = Arc::clone(&seen_in);
                async move {
                    *seen.lock().unwrap() = Some(routing.0);
                }
            })
            .unwrap()
            .register(HandlerOptions::reaction_add("👍").channel("general"), counting(&named))
            .unwrap();
        let dispatcher = registry.build();

        let dm = testing::direct_channel(4242, testing::user(3, "cam"));
        dispatcher
            .dispatch(testing::reaction_add(&dm, "👍", testing::user(3, "cam")))
            .await;

        let routing = seen.lock().unwrap().clone().unwrap();
        assert!(routing.is_direct_message);
        assert_eq!(routing.member, None);
        assert_eq!(routing.channel_id, Some(4242.into()));
        assert_eq!(count(&named), 0);
    }

    #[tokio::test]
    async fn test_root_kinds_run_every_handler() {
        let (ready, left) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        let mut registry = RegistryBuilder::new();
        let left_in = Arc::clone(&left);
        registry
            .register(HandlerOptions::new(EventKind::Ready), counting(&ready))
            .unwrap()
            .register(HandlerOptions::new(EventKind::Ready), counting(&ready))
            .unwrap()
            .register(
                HandlerOptions::new(EventKind::MemberLeave),
                move |event: Event<MemberLeave>, member: Member| {
                    let left = Arc::clone(&left_in);
                    async move {
                        assert_eq!(event.member, member.0);
                        left.fetch_add(1, Ordering::SeqCst);
                    }
                },
            )
            .unwrap();
        let dispatcher = registry.build();

        let report = dispatcher
            .dispatch(RawEvent::from(Ready {
                user: testing::user(99, "yesbot"),
                guilds: vec![],
            }))
            .await;
        assert_eq!(report.succeeded, 2);
        assert_eq!(count(&ready), 2);

        dispatcher
            .dispatch(RawEvent::from(MemberLeave {
                member: testing::member(5, "dee", &[]),
                guild_id: testing::GUILD_ID.into(),
            }))
            .await;
        assert_eq!(count(&left), 1);
    }

    #[tokio::test]
    async fn test_injected_service() {
        struct Limits {
            max: u32,
        }

        let mut registry = RegistryBuilder::new();
        registry
            .provide(Arc::new(Limits { max: 99 }))
            .register(
                HandlerOptions::command("!voice").sub_trigger("limit"),
                |msg: Event<Message>, limits: Inject<Limits>| async move {
                    let requested: u32 = msg.words().nth(2).unwrap_or("0").parse()?;
                    anyhow::ensure!(requested <= limits.max, "limit too high");
                    Ok::<_, anyhow::Error>(())
                },
            )
            .unwrap()
            .register(
                HandlerOptions::command("!voice").sub_trigger("limit"),
                |_: Inject<String>| async {},
            )
            .unwrap();
        let dispatcher = registry.build();
        let server = Server::new();

        let report = dispatcher.dispatch(server.say("general", 1, "!voice limit 5")).await;
        assert_eq!((report.succeeded, report.failed), (1, 1));

        let report = dispatcher.dispatch(server.say("general", 1, "!voice limit 500")).await;
        assert_eq!((report.succeeded, report.failed), (0, 2));
    }

    #[tokio::test]
    async fn test_tower_service() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = RegistryBuilder::new();
        registry.register(HandlerOptions::command("!topic"), counting(&hits)).unwrap();
        let service = Arc::new(registry.build()).into_service();

        let event = Server::new().say("general", 1, "!topic");
        let report = service.clone().oneshot(event).await.unwrap();
        assert_eq!(report.invoked(), 1);
        assert_eq!(service.dispatcher().catalog().len(), 1);
    }

    #[test]
    fn test_lookup_without_dispatch() {
        let mut registry = RegistryBuilder::new();
        registry
            .register(HandlerOptions::reaction_add("👍").name("thumbs"), || async {})
            .unwrap();
        let dispatcher = registry.build();

        let found = dispatcher.lookup(EventKind::ReactionAdd, &KeyPath::new(["anywhere", "👍"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].options.name, "thumbs");
        assert!(dispatcher.lookup(EventKind::ReactionRemove, &KeyPath::new(["x", "👍"])).is_empty());
    }
}
