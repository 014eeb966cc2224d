//! Route resolution as a single-shot asynchronous operation.
//!
//! [`RouteResolver`] is the future-based form: one call, one outcome, by value.
//! [`CallbackResolver`] adapts resolvers written in callback style. The callback
//! receives a [`Completion`] that can fire exactly once, since every completing
//! method takes `self`, and the middleware awaits the other end of a oneshot
//! channel. A completion dropped without firing still completes the request,
//! as an error.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::outcome::{Location, RenderOutcome, RenderProps};

#[async_trait]
pub trait RouteResolver: Send + Sync {
    async fn resolve(&self, location: &Location) -> RenderOutcome;
}

#[async_trait]
impl<R: RouteResolver + ?Sized> RouteResolver for Arc<R> {
    async fn resolve(&self, location: &Location) -> RenderOutcome {
        (**self).resolve(location).await
    }
}

pub(crate) const DROPPED_COMPLETION: &str = "route resolution finished without an outcome";

/// Producer side of one resolution.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<RenderOutcome>,
}

impl Completion {
    pub fn complete(self, outcome: RenderOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::trace!("request abandoned before resolution completed");
        }
    }

    pub fn error(self, message: impl Into<String>) {
        self.complete(RenderOutcome::error(message));
    }

    pub fn redirect(self, target: Location) {
        self.complete(RenderOutcome::Redirect(target));
    }

    pub fn matched(self, props: RenderProps) {
        self.complete(RenderOutcome::Matched(props));
    }

    pub fn not_found(self) {
        self.complete(RenderOutcome::NotFound);
    }
}

/// Adapts `Fn(Location, Completion)` into a [`RouteResolver`].
///
/// The callback may complete synchronously or hand the completion to another
/// task.
pub struct CallbackResolver<F> {
    callback: F,
}

impl<F> CallbackResolver<F>
where
    F: Fn(Location, Completion) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> RouteResolver for CallbackResolver<F>
where
    F: Fn(Location, Completion) + Send + Sync,
{
    async fn resolve(&self, location: &Location) -> RenderOutcome {
        let (tx, rx) = oneshot::channel();
        (self.callback)(location.clone(), Completion { tx });

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => RenderOutcome::error(DROPPED_COMPLETION),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn synchronous_completion() {
        let resolver = CallbackResolver::new(|_loc, done: Completion| done.not_found());
        let outcome = resolver.resolve(&Location::parse("/nope")).await;
        assert!(matches!(outcome, RenderOutcome::NotFound));
    }

    #[tokio::test]
    async fn completion_from_another_task() {
        let resolver = CallbackResolver::new(|loc: Location, done: Completion| {
            tokio::spawn(async move {
                done.error(format!("cannot resolve {loc}"));
            });
        });
        match resolver.resolve(&Location::parse("/x?y=1")).await {
            RenderOutcome::Error(message) => assert_eq!(message, "cannot resolve /x?y=1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_completion_is_an_error() {
        let resolver = CallbackResolver::new(|_loc, done: Completion| drop(done));
        match resolver.resolve(&Location::parse("/")).await {
            RenderOutcome::Error(message) => assert_eq!(message, DROPPED_COMPLETION),
            other => panic!("unexpected {other:?}"),
        }
    }
}
