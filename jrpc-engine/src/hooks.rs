//! Call hooks for cross-cutting concerns
//!
//! Hooks wrap handler invocation without touching the handlers themselves:
//! parameter injection, result decoration, translating domain errors into
//! declared application errors. [`CallHook::before_call`] runs before
//! registry lookup, so a hook may rewrite the method name or the parameters;
//! [`CallHook::after_call`] observes every call outcome, including Method
//! not found and Invalid params, and may replace it.
//!
//! Hooks run around calls and notifications; envelope errors never reach
//! them. `before_call` hooks run in registration order and `after_call`
//! hooks in reverse, so the first hook installed observes the final outcome.

use async_trait::async_trait;
use jrpc_core::{Id, Params, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-call state passed through the hook chain
///
/// Built once per request, before registry lookup. `method` and `params`
/// are what the dispatcher will actually resolve and invoke with, so
/// mutating them in `before_call` redirects the call.
#[derive(Debug)]
pub struct CallContext {
    /// Method name to resolve against the registry.
    pub method: String,
    /// Parameters the handler will receive.
    pub params: Option<Params>,
    /// Request id, `None` for notifications. Correlation data only; the
    /// response id is fixed by the request envelope.
    pub id: Option<Id>,
    /// Scratch space for hooks to hand data to later stages.
    pub metadata: HashMap<String, Value>,
}

impl CallContext {
    pub fn new(method: String, params: Option<Params>, id: Option<Id>) -> Self {
        Self {
            method,
            params,
            id,
            metadata: HashMap::new(),
        }
    }

    /// Store a metadata entry for hooks running later in the chain.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Read a metadata entry stored by an earlier hook.
    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// What a `before_call` hook decides about the rest of the pipeline.
#[derive(Debug, Clone)]
pub enum HookAction {
    /// Proceed to the next hook, then the handler.
    Continue,
    /// Skip the remaining `before_call` hooks and the handler; the value
    /// becomes the call's successful result. `after_call` hooks still run.
    ShortCircuit(Value),
}

/// Hook around handler invocation
///
/// Both methods default to pass-through, so an implementation only writes
/// the side it needs. Errors returned from either method travel through the
/// same mapping as handler errors: a declared
/// [`Error::Rpc`](jrpc_core::Error::Rpc) reaches the wire verbatim,
/// anything else is downgraded to an opaque Internal error.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use jrpc_engine::{CallContext, CallHook};
/// use serde_json::{json, Value};
///
/// struct Stamp;
///
/// #[async_trait]
/// impl CallHook for Stamp {
///     async fn after_call(
///         &self,
///         _ctx: &CallContext,
///         outcome: jrpc_core::Result<Value>,
///     ) -> jrpc_core::Result<Value> {
///         outcome.map(|result| json!({"result": result, "stamped": true}))
///     }
/// }
/// ```
#[async_trait]
pub trait CallHook: Send + Sync {
    /// Runs before registry lookup. May mutate the context or short-circuit
    /// the call.
    async fn before_call(&self, _ctx: &mut CallContext) -> Result<HookAction> {
        Ok(HookAction::Continue)
    }

    /// Runs after invocation with the call's outcome and returns the
    /// outcome to use in its place.
    async fn after_call(&self, _ctx: &CallContext, outcome: Result<Value>) -> Result<Value> {
        outcome
    }
}

/// Ordered collection of hooks applied around each call
///
/// Cheaply cloneable; clones share the installed hooks.
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<Arc<dyn CallHook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Order matters: `before_call` runs first-to-last,
    /// `after_call` last-to-first.
    pub fn add(&mut self, hook: impl CallHook + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Run the `before_call` side. The first short-circuit wins and skips
    /// the remaining hooks.
    pub(crate) async fn run_before(&self, ctx: &mut CallContext) -> Result<HookAction> {
        for hook in &self.hooks {
            if let HookAction::ShortCircuit(value) = hook.before_call(ctx).await? {
                return Ok(HookAction::ShortCircuit(value));
            }
        }
        Ok(HookAction::Continue)
    }

    /// Thread the outcome through the `after_call` side in reverse order.
    pub(crate) async fn run_after(
        &self,
        ctx: &CallContext,
        mut outcome: Result<Value>,
    ) -> Result<Value> {
        for hook in self.hooks.iter().rev() {
            outcome = hook.after_call(ctx, outcome).await;
        }
        outcome
    }
}
