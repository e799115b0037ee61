//! Privileged operations reachable through the gateway.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// Failure reported by a privileged operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One privileged operation. Only ever receives arguments that passed every
/// gateway check, already sanitized.
#[async_trait]
pub trait PrivilegedHandler: Send + Sync {
    async fn handle(&self, args: Vec<Value>) -> Result<Value, HandlerError>;
}

/// Adapter turning an async closure into a [`PrivilegedHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> PrivilegedHandler for FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn handle(&self, args: Vec<Value>) -> Result<Value, HandlerError> {
        (self.0)(args).await
    }
}

/// Channel → handler table, fixed once the gateway is built.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn PrivilegedHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `channel`, replacing any previous one.
    pub fn register(
        &mut self,
        channel: impl Into<String>,
        handler: impl PrivilegedHandler + 'static,
    ) -> &mut Self {
        self.handlers.insert(channel.into(), Arc::new(handler));
        self
    }

    /// Register an async closure.
    pub fn register_fn<F, Fut>(&mut self, channel: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.register(channel, FnHandler(f))
    }

    pub fn get(&self, channel: &str) -> Option<Arc<dyn PrivilegedHandler>> {
        self.handlers.get(channel).cloned()
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    /// Registered channels, sorted.
    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        channels.sort_unstable();
        channels
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
