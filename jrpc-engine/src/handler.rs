//! Handler traits and adapters for registered methods
//!
//! A [`Handler`] is the callable behind a registered method name. Handlers
//! are async and type-erased: they receive the request's already-validated
//! parameter shape and return a pinned future resolving to a JSON value or
//! an error.
//!
//! # Creating handlers
//!
//! - [`from_fn`]: wrap an async closure working with raw [`Params`]
//! - [`from_typed_fn`]: wrap an async closure with automatic serde
//!   conversion of params and result
//!
//! # Error contract
//!
//! The error a handler returns decides what goes on the wire:
//!
//! - `Err(Error::Rpc(data))` is a **declared** application failure; its
//!   code, message, and data pass through to the response verbatim
//! - `Err(Error::InvalidParams(..))` maps to -32602
//! - any other error (and any panic) is downgraded by the dispatcher to an
//!   opaque -32603 Internal error

use jrpc_core::{Error, Params, Result};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Pinned, boxed future returned by handlers
///
/// Boxing gives the registry a uniform type to store; the `Send` bound lets
/// batch members run on separate tasks.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// Trait for registered method implementations
///
/// Handlers must be `Send + Sync`: the registry hands out shared references
/// across tasks, so handlers should be stateless or use interior mutability.
///
/// You typically don't implement this trait directly; use [`from_fn`] or
/// [`from_typed_fn`].
pub trait Handler: Send + Sync {
    /// Invoke the method with the request's parameters.
    ///
    /// The parameter shape has already been checked against the method's
    /// declared [`ParamSpec`](crate::ParamSpec) when this is called.
    fn call(&self, params: Option<Params>) -> HandlerFuture;
}

/// Adapter that turns an async function into a [`Handler`]
pub struct AsyncHandler<F, Fut>
where
    F: Fn(Option<Params>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    func: F,
}

impl<F, Fut> AsyncHandler<F, Fut>
where
    F: Fn(Option<Params>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Handler for AsyncHandler<F, Fut>
where
    F: Fn(Option<Params>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    fn call(&self, params: Option<Params>) -> HandlerFuture {
        Box::pin((self.func)(params))
    }
}

/// Create a handler from an async function working with raw params.
///
/// # Examples
///
/// ```rust
/// use jrpc_engine::from_fn;
///
/// let handler = from_fn(|params| async move {
///     Ok(serde_json::json!({"echo": params.map(|p| p.into_value())}))
/// });
/// ```
pub fn from_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(Option<Params>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Box::new(AsyncHandler::new(func))
}

/// Create a handler with automatic serde conversion of params and result.
///
/// Positional params deserialize from a JSON array (tuples and `Vec` work),
/// named params from a JSON object (derive `Deserialize` on a struct), and
/// absent params from JSON null (use `()`). A deserialization failure maps
/// to Invalid params; a result serialization failure is an internal error.
///
/// # Examples
///
/// ```rust
/// use jrpc_engine::from_typed_fn;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct AddParams { a: i64, b: i64 }
///
/// let handler = from_typed_fn(|p: AddParams| async move { Ok(p.a + p.b) });
/// ```
pub fn from_typed_fn<P, R, F, Fut>(func: F) -> Box<dyn Handler>
where
    P: serde::de::DeserializeOwned + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    use std::sync::Arc;
    // Closures aren't Clone; Arc lets each invocation share the function.
    let func = Arc::new(func);

    from_fn(move |params: Option<Params>| {
        let func = Arc::clone(&func);
        async move {
            let raw = params.map(Params::into_value).unwrap_or(Value::Null);
            let params: P =
                serde_json::from_value(raw).map_err(|e| Error::InvalidParams(e.to_string()))?;

            let result = func(params).await?;

            serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))
        }
    })
}
