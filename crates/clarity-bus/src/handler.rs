//! Subscriber handlers.

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use clarity_types::Event;

/// Failure inside a subscriber handler.
///
/// Handler errors never escape the bus boundary: the bus logs them and
/// continues dispatching to other subscribers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler could not process the event.
    #[error("handler failure: {0}")]
    Failure(String),
}

impl HandlerError {
    /// Build a failure with a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }
}

/// A subscriber's event handler.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one delivered event.
    async fn handle(&self, event: Event) -> Result<(), HandlerError>;
}

/// Adapter turning an async closure into an [`EventHandler`].
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    /// Wrap an async closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, event: Event) -> Result<(), HandlerError> {
        (self.func)(event).await
    }
}
