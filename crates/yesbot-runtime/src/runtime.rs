//! Runtime orchestration.
//!
//! [`YesBotRuntime`] owns the process lifecycle of the router:
//!
//! 1. **Startup**: configuration is loaded, logging is initialized and
//!    handlers and services are registered.
//! 2. **Run**: the registry is frozen into a [`Dispatcher`], and every event
//!    pulled from the [`EventSource`] is dispatched on its own tokio task.
//! 3. **Shutdown**: on Ctrl+C, SIGTERM, [`YesBotRuntime::shutdown`] or an
//!    exhausted source, the loop stops taking events and in-flight dispatches
//!    get `runtime.shutdown_grace_secs` to finish.
//!
//! Registering after the run has started fails with
//! [`RegistrationError::Frozen`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! let runtime = YesBotRuntime::new();
//! runtime.register(HandlerOptions::command("!topic"), topic)?;
//!
//! let (sender, source) = ChannelSource::new(runtime.config().runtime.event_buffer);
//! spawn_platform_client(sender);
//! runtime.run(source).await?;
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, error, info, warn};
use yesbot_framework::{
    DispatchReport, Dispatcher, Handler, HandlerOptions, HandlerSummary, RegistrationError,
    RegistrationResult, RegistryBuilder,
};

use crate::config::{ConfigLoader, ConfigResult, YesBotConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::source::EventSource;

// =============================================================================
// Stats
// =============================================================================

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events pulled from the source.
    pub events_received: u64,
    /// Events whose dispatch finished.
    pub events_dispatched: u64,
    /// Events that matched no handler.
    pub events_unmatched: u64,
    pub handlers_succeeded: u64,
    pub handlers_failed: u64,
    pub handlers_denied: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    events_received: AtomicU64,
    events_dispatched: AtomicU64,
    events_unmatched: AtomicU64,
    handlers_succeeded: AtomicU64,
    handlers_failed: AtomicU64,
    handlers_denied: AtomicU64,
}

impl StatsCounters {
    fn record(&self, report: &DispatchReport) {
        self.events_dispatched.fetch_add(1, Ordering::Relaxed);
        if report.matched == 0 {
            self.events_unmatched.fetch_add(1, Ordering::Relaxed);
        }
        self.handlers_succeeded
            .fetch_add(report.succeeded as u64, Ordering::Relaxed);
        self.handlers_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);
        self.handlers_denied
            .fetch_add(report.denied as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RuntimeStats {
        RuntimeStats {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_dispatched: self.events_dispatched.load(Ordering::Relaxed),
            events_unmatched: self.events_unmatched.load(Ordering::Relaxed),
            handlers_succeeded: self.handlers_succeeded.load(Ordering::Relaxed),
            handlers_failed: self.handlers_failed.load(Ordering::Relaxed),
            handlers_denied: self.handlers_denied.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// YesBotRuntime
// =============================================================================

/// The YesBot process runtime.
pub struct YesBotRuntime {
    config: YesBotConfig,
    /// `Some` during startup, taken when the run begins.
    registry: Mutex<Option<RegistryBuilder>>,
    dispatcher: OnceLock<Arc<Dispatcher>>,
    running: AtomicBool,
    shutdown: CancellationToken,
    stats: Arc<StatsCounters>,
}

impl YesBotRuntime {
    /// Creates a runtime from the configuration found in the current
    /// directory, falling back to defaults when it cannot be loaded.
    pub fn new() -> Self {
        match ConfigLoader::new().with_current_dir().load() {
            Ok(config) => Self::from_config(&config),
            Err(e) => {
                let runtime = Self::from_config(&YesBotConfig::default());
                warn!(error = %e, "Failed to load configuration, using defaults");
                runtime
            }
        }
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration and initializes logging.
    pub fn from_config(config: &YesBotConfig) -> Self {
        logging::init_from_config(&config.logging);

        let mut registry = RegistryBuilder::new();
        registry.denial_policy(config.distribution.denial_policy);

        info!(
            log_level = %config.logging.level,
            denial_policy = ?config.distribution.denial_policy,
            event_buffer = config.runtime.event_buffer,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            registry: Mutex::new(Some(registry)),
            dispatcher: OnceLock::new(),
            running: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            stats: Arc::new(StatsCounters::default()),
        }
    }

    pub fn config(&self) -> &YesBotConfig {
        &self.config
    }

    /// Registers a handler. Only possible before [`run`](Self::run).
    pub fn register<H, T>(&self, options: HandlerOptions, handler: H) -> RegistrationResult<()>
    where
        H: Handler<T>,
        T: 'static,
    {
        let mut guard = self.registry.lock();
        let Some(registry) = guard.as_mut() else {
            error!(
                handler = %options.name,
                "Handler registered after the runtime started; register all handlers before run()"
            );
            return Err(RegistrationError::Frozen { name: options.name });
        };
        registry.register(options, handler)?;
        Ok(())
    }

    /// Provides a service for [`Inject<T>`](yesbot_framework::Inject).
    pub fn provide<T: ?Sized + Send + Sync + 'static>(&self, service: Arc<T>) -> RuntimeResult<()> {
        let mut guard = self.registry.lock();
        let registry = guard
            .as_mut()
            .ok_or(RuntimeError::Frozen(std::any::type_name::<T>()))?;
        registry.provide(service);
        Ok(())
    }

    /// Number of handlers registered so far.
    pub fn handler_count(&self) -> usize {
        match (self.registry.lock().as_ref(), self.dispatcher.get()) {
            (Some(registry), _) => registry.len(),
            (None, Some(dispatcher)) => dispatcher.catalog().len(),
            (None, None) => 0,
        }
    }

    /// Every registered handler, in registration order.
    pub fn catalog(&self) -> Vec<HandlerSummary> {
        match (self.registry.lock().as_ref(), self.dispatcher.get()) {
            (Some(registry), _) => registry.catalog().to_vec(),
            (None, Some(dispatcher)) => dispatcher.catalog().to_vec(),
            (None, None) => Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The frozen dispatcher, once the run has started.
    pub fn dispatcher(&self) -> Option<&Arc<Dispatcher>> {
        self.dispatcher.get()
    }

    /// A token that stops the run when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Requests a graceful shutdown.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats.snapshot()
    }

    /// Ends the startup phase.
    fn freeze(&self) -> RuntimeResult<Arc<Dispatcher>> {
        let registry = self
            .registry
            .lock()
            .take()
            .ok_or(RuntimeError::AlreadyStarted)?;

        let dispatcher = Arc::new(registry.build());
        for handler in dispatcher.catalog() {
            info!(
                handler = %handler.name,
                event = %handler.event,
                paths = ?handler.key_paths,
                roles = ?handler.allowed_roles,
                "Handler ready"
            );
        }
        let _ = self.dispatcher.set(Arc::clone(&dispatcher));
        Ok(dispatcher)
    }

    /// Runs until the source is exhausted or a shutdown signal arrives.
    pub async fn run<S: EventSource>(&self, source: S) -> RuntimeResult<RuntimeStats> {
        self.run_until(source, wait_for_signal()).await
    }

    /// Runs until the source is exhausted, `shutdown` completes or the
    /// shutdown token is cancelled.
    pub async fn run_until<S, F>(&self, mut source: S, shutdown: F) -> RuntimeResult<RuntimeStats>
    where
        S: EventSource,
        F: Future<Output = ()>,
    {
        let service = self.freeze()?.into_service();
        let source_name = source.name().to_string();
        self.running.store(true, Ordering::SeqCst);
        info!(
            source = %source_name,
            handlers = service.dispatcher().catalog().len(),
            "YesBot runtime is now running"
        );

        let mut tasks = JoinSet::new();
        let mut outcome = Ok(());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                next = source.next_event() => match next {
                    Ok(Some(event)) => {
                        self.stats.events_received.fetch_add(1, Ordering::Relaxed);
                        debug!(event = event.name(), "Event received");
                        let service = service.clone();
                        let stats = Arc::clone(&self.stats);
                        tasks.spawn(async move {
                            let report = service
                                .oneshot(event)
                                .await
                                .unwrap_or_else(|never| match never {});
                            stats.record(&report);
                        });
                    }
                    Ok(None) => {
                        info!(source = %source_name, "Event source exhausted");
                        break;
                    }
                    Err(e) => {
                        error!(source = %source_name, error = %e, "Event source failed");
                        outcome = Err(e);
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Dispatch task failed");
                    }
                }
            }
        }

        self.drain(&mut tasks).await;
        self.running.store(false, Ordering::SeqCst);

        let stats = self.stats();
        info!(
            received = stats.events_received,
            dispatched = stats.events_dispatched,
            failed = stats.handlers_failed,
            "Runtime stopped"
        );
        outcome.map(|()| stats)
    }

    /// Waits for in-flight dispatches, aborting what is left after the grace
    /// period.
    async fn drain(&self, tasks: &mut JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }
        let grace = self.config.runtime.shutdown_grace();
        debug!(in_flight = tasks.len(), grace_secs = grace.as_secs(), "Draining dispatches");

        let finished = tokio::time::timeout(grace, async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Dispatch task failed");
                }
            }
        })
        .await;

        if finished.is_err() {
            warn!(aborted = tasks.len(), "Grace period elapsed, aborting dispatches");
            tasks.abort_all();
        }
    }
}

impl Default for YesBotRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C, running until the source ends");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builds a [`YesBotRuntime`] from a customized [`ConfigLoader`].
///
/// ```rust,ignore
/// let runtime = YesBotRuntime::builder()
///     .config_file("config/yesbot.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: YesBotConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads and validates the configuration, then creates the runtime.
    pub fn build(self) -> ConfigResult<YesBotRuntime> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(YesBotRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
