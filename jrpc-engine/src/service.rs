//! Service facade tying the pipeline together
//!
//! A [`Service`] owns a dispatcher over a configured registry and runs the
//! whole pipeline for one input: parse, dispatch, build. Transports call
//! [`Service::handle`] with raw text (or [`Service::handle_value`] with an
//! already-decoded value) and send whatever comes back; `None` means the
//! protocol says nothing is sent.
//!
//! Registration happens through the fail-fast [`ServiceBuilder`] before any
//! traffic is processed; the builder also installs
//! [`CallHook`]s around each call.

use crate::dispatch::{BatchMode, Dispatcher};
use crate::handler::Handler;
use crate::hooks::{CallHook, HookChain};
use crate::registry::{ParamSpec, Registry};
use jrpc_core::{codec, parser, Output, Result};
use serde_json::Value;

/// A configured JSON-RPC service
///
/// Cheaply cloneable; clones share the same registry snapshot, so one
/// service can serve many connections or tasks.
#[derive(Clone)]
pub struct Service {
    dispatcher: Dispatcher,
}

impl Service {
    /// Start building a service.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    /// Create a service over an already-populated registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry),
        }
    }

    /// Process raw JSON text into the serialized output to send back.
    ///
    /// `Ok(None)` means no output at all: the input was a notification, or
    /// a batch whose responses all filtered out.
    pub async fn handle(&self, text: &str) -> Result<Option<String>> {
        let incoming = parser::parse_text(text);
        match self.dispatcher.dispatch(incoming).await {
            Some(output) => Ok(Some(codec::encode_output(&output)?)),
            None => Ok(None),
        }
    }

    /// Process an already-decoded JSON value into the output value to send
    /// back, for transports that do their own encoding.
    pub async fn handle_value(&self, value: Value) -> Result<Option<Value>> {
        let incoming = parser::parse_value(value);
        match self.dispatcher.dispatch(incoming).await {
            Some(output) => Ok(Some(codec::output_to_value(&output)?)),
            None => Ok(None),
        }
    }

    /// Process parsed input into a structured output, for callers that want
    /// the typed responses rather than JSON.
    pub async fn dispatch(&self, incoming: parser::Incoming) -> Option<Output> {
        self.dispatcher.dispatch(incoming).await
    }

    /// The registry backing this service.
    pub fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }
}

/// Builder for [`Service`]
///
/// Registration failures (empty or duplicate method name) surface
/// immediately from [`method`](ServiceBuilder::method), before the service
/// ever sees traffic.
pub struct ServiceBuilder {
    registry: Registry,
    mode: BatchMode,
    hooks: HookChain,
}

impl ServiceBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            mode: BatchMode::default(),
            hooks: HookChain::new(),
        }
    }

    /// Register a method.
    pub fn method(
        mut self,
        name: impl Into<String>,
        spec: ParamSpec,
        handler: Box<dyn Handler>,
    ) -> Result<Self> {
        self.registry.register(name, spec, handler)?;
        Ok(self)
    }

    /// Set how batch members are executed.
    pub fn batch_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Install a hook around each call. Hooks run in installation order on
    /// the way in and reverse order on the way out.
    pub fn hook(mut self, hook: impl CallHook + 'static) -> Self {
        self.hooks.add(hook);
        self
    }

    /// Build the service.
    pub fn build(self) -> Service {
        Service {
            dispatcher: Dispatcher::with_hooks(self.registry, self.mode, self.hooks),
        }
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
