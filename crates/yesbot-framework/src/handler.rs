//! Handler system.
//!
//! A handler is any async function whose parameters implement
//! [`FromContext`] and whose return value implements [`HandlerOutput`]. The
//! [`Handler`] trait is implemented for such functions through blanket
//! implementations, one per arity.
//!
//! ```rust,ignore
//! // No parameters, no result
//! async fn on_ready() {
//!     tracing::info!("connected");
//! }
//!
//! // Typed payload plus the acting member
//! async fn voice_up(msg: Event<Message>, member: Member) -> anyhow::Result<()> {
//!     tracing::info!(user = %member.display_name(), "raising limit");
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::HandlerContext;
use crate::error::{BoxError, InvocationError};
use crate::extractor::FromContext;

// ============================================================================
// HandlerOutput
// ============================================================================

/// Return types a handler may produce.
///
/// `()` always succeeds. `Result<(), E>` fails with the error, which the
/// dispatcher logs; `anyhow::Result<()>` is covered by this impl.
pub trait HandlerOutput: Send {
    fn into_result(self) -> Result<(), BoxError>;
}

impl HandlerOutput for () {
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> HandlerOutput for Result<(), E>
where
    E: Into<BoxError> + Send,
{
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Handler trait
// ============================================================================

/// An async function usable as a handler unit.
///
/// `T` is a marker for the parameter tuple and is inferred at registration.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Extracts the parameters from `ctx` and runs the handler.
    async fn call(self, ctx: Arc<HandlerContext>) -> Result<(), InvocationError>;
}

/// A type-erased handler as stored in the routing tree.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<HandlerContext>) -> BoxFuture<'static, Result<(), InvocationError>> + Send + Sync>;

/// Erases a handler's parameter types.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T>,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandlerOutput + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<HandlerContext>) -> Result<(), InvocationError> {
                let _ = &ctx;
                $(
                    let $ty = $ty::from_context(&ctx)?;
                )*

                (self)($($ty,)*).await.into_result().map_err(InvocationError::Failed)
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use yesbot_core::{EventKind, Message, testing};

    use super::*;
    use crate::extractor::{Event, Member};
    use crate::options::HandlerOptions;
    use crate::services::Services;

    fn message_ctx(content: &str) -> Arc<HandlerContext> {
        let guild = testing::guild("g", vec![testing::member(1, "ana", &[])]);
        let channel = testing::guild_channel(&guild, 10, "general");
        let event = testing::message_event(&channel, testing::user(1, "ana"), content);
        let routing = event.extract().context;
        Arc::new(HandlerContext::new(
            event,
            routing,
            Arc::new(HandlerOptions::new(EventKind::Message)),
            Arc::new(Services::new()),
        ))
    }

    #[tokio::test]
    async fn test_zero_arity_handler() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn handler() {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let boxed = into_handler(handler);
        boxed(message_ctx("hi")).await.unwrap();
        boxed(message_ctx("hi")).await.unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_extracting_handler() {
        async fn handler(msg: Event<Message>, member: Member) -> Result<(), std::io::Error> {
            assert_eq!(msg.content, "!voice up");
            assert_eq!(member.user.name, "ana");
            Ok(())
        }

        into_handler(handler)(message_ctx("!voice up")).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_result_is_reported() {
        async fn handler() -> anyhow::Result<()> {
            anyhow::bail!("database unavailable")
        }

        let err = into_handler(handler)(message_ctx("x")).await.unwrap_err();
        assert!(matches!(err, InvocationError::Failed(_)));
        assert!(err.to_string().contains("database unavailable"));
    }

    #[tokio::test]
    async fn test_extract_failure_skips_body() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        async fn handler(_: Event<yesbot_core::Ready>) {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let err = into_handler(handler)(message_ctx("x")).await.unwrap_err();
        assert!(matches!(err, InvocationError::Extract(_)));
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_closure_handler_outside_runtime() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in = Arc::clone(&seen);
        let boxed = into_handler(move |msg: Event<Message>| {
            let seen = Arc::clone(&seen_in);
            async move {
                seen.fetch_add(msg.words().count(), Ordering::SeqCst);
            }
        });

        tokio_test::block_on(boxed(message_ctx("!voice limit 5"))).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
