//! Request dispatching
//!
//! Resolves each parsed unit against the registry, invokes the handler, and
//! produces a response (or none, for notifications). The dispatcher is the
//! boundary where all failure modes terminate in a well-formed response:
//!
//! - inline envelope errors from the parser are emitted as-is, even when
//!   the member carried no id (a malformed envelope cannot be trusted to
//!   mark a notification)
//! - a registry miss becomes Method not found
//! - a parameter-shape mismatch becomes Invalid params, without invoking
//!   the handler
//! - a declared application error from the handler passes through verbatim
//! - any other error or panic escaping the handler is downgraded to an
//!   opaque Internal error; the detail is logged, never transmitted
//!
//! Installed [`CallHook`](crate::CallHook)s run around each call:
//! `before_call` ahead of registry lookup, so hooks may rewrite the method
//! or parameters, and `after_call` over the outcome, including lookup and
//! shape failures. Hook panics and undeclared hook errors are downgraded
//! the same way handler ones are.
//!
//! Notifications never produce output, including on error; their failures
//! surface only in the log.
//!
//! # Batches
//!
//! Batch members are independent: one member's failure or panic cannot
//! prevent siblings from being dispatched. Members run sequentially or on
//! parallel tasks per [`BatchMode`]; either way the output order matches the
//! input order, with notifications omitted. A batch that produces no
//! responses at all yields no output rather than an empty array.

use crate::hooks::{CallContext, HookAction, HookChain};
use crate::registry::Registry;
use futures::FutureExt;
use jrpc_core::{Error, Id, Incoming, Output, ParsedUnit, Request, Response, Result, RpcErrorData};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinError;

/// Execution mode for batch members
///
/// Parallel is the default: members are logically independent, and a slow
/// handler in one slot should not delay the others. Sequential is for
/// handlers with ordering side effects between members of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Run members on parallel tasks; responses are still collected in
    /// input order
    #[default]
    Parallel,
    /// Run members one after another in input order
    Sequential,
}

/// Dispatcher processing parsed units against a registry
///
/// Cheaply cloneable; clones share the registry snapshot taken at
/// construction time.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Registry,
    mode: BatchMode,
    hooks: HookChain,
}

impl Dispatcher {
    /// Create a dispatcher with the default (parallel) batch mode.
    pub fn new(registry: Registry) -> Self {
        Self::with_mode(registry, BatchMode::default())
    }

    /// Create a dispatcher with an explicit batch mode.
    pub fn with_mode(registry: Registry, mode: BatchMode) -> Self {
        Self::with_hooks(registry, mode, HookChain::new())
    }

    /// Create a dispatcher with hooks applied around each call.
    pub fn with_hooks(registry: Registry, mode: BatchMode, hooks: HookChain) -> Self {
        Self {
            registry,
            mode,
            hooks,
        }
    }

    /// The registry this dispatcher resolves methods against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Process one parsed input end to end.
    ///
    /// Returns `None` when the protocol says no output is sent: a single
    /// notification, or a batch whose responses all filtered out.
    #[tracing::instrument(skip_all, fields(batch = matches!(incoming, Incoming::Batch(_))))]
    pub async fn dispatch(&self, incoming: Incoming) -> Option<Output> {
        match incoming {
            Incoming::Single(unit) => self.dispatch_unit(unit).await.map(Output::Single),
            Incoming::Batch(units) => {
                let responses = match self.mode {
                    BatchMode::Parallel => self.dispatch_parallel(units).await,
                    BatchMode::Sequential => self.dispatch_sequential(units).await,
                };
                tracing::debug!(response_count = responses.len(), "batch dispatched");
                Output::from_batch(responses)
            }
        }
    }

    /// Process one unit, yielding its response if the protocol requires one.
    pub async fn dispatch_unit(&self, unit: ParsedUnit) -> Option<Response> {
        match unit {
            // Envelope errors always get a response; without a valid
            // envelope the id's absence proves nothing about notification
            // intent.
            ParsedUnit::Invalid(invalid) => Some(Response::error(invalid.error, invalid.id)),
            ParsedUnit::Request(request) => self.dispatch_request(request).await,
        }
    }

    async fn dispatch_parallel(&self, units: Vec<ParsedUnit>) -> Vec<Response> {
        let mut tasks = Vec::with_capacity(units.len());
        for unit in units {
            // Remember what this member is owed before handing it off: if
            // the task itself dies, a call member still gets an answer.
            let owed_id = match &unit {
                ParsedUnit::Invalid(invalid) => Some(invalid.id.clone()),
                ParsedUnit::Request(request) => request.id.clone(),
            };
            let dispatcher = self.clone();
            tasks.push((
                owed_id,
                tokio::spawn(async move { dispatcher.dispatch_unit(unit).await }),
            ));
        }

        // Awaiting the handles in spawn order keeps output order equal to
        // input order regardless of completion order.
        let mut responses = Vec::new();
        for (owed_id, task) in tasks {
            if let Some(response) = settle_member(owed_id, task.await) {
                responses.push(response);
            }
        }
        responses
    }

    async fn dispatch_sequential(&self, units: Vec<ParsedUnit>) -> Vec<Response> {
        let mut responses = Vec::new();
        for unit in units {
            if let Some(response) = self.dispatch_unit(unit).await {
                responses.push(response);
            }
        }
        responses
    }

    async fn dispatch_request(&self, request: Request) -> Option<Response> {
        let id = request.id.clone();
        let method = request.method.clone();

        let invocation = AssertUnwindSafe(self.run_call(request)).catch_unwind();
        let outcome = match invocation.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(Error::Rpc(declared))) => Err(declared),
            Ok(Err(Error::InvalidParams(detail))) => {
                Err(RpcErrorData::invalid_params_msg(detail))
            }
            Ok(Err(error)) => {
                tracing::error!(method = %method, error = %error, "handler failed");
                Err(RpcErrorData::internal_error())
            }
            Err(panic) => {
                tracing::error!(
                    method = %method,
                    panic = panic_message(panic.as_ref()),
                    "handler panicked"
                );
                Err(RpcErrorData::internal_error())
            }
        };

        finish(id, &method, outcome)
    }

    /// Run the hook chain and the handler for one call.
    ///
    /// Lookup and shape failures travel as declared errors so `after_call`
    /// hooks observe them like any other outcome.
    async fn run_call(&self, request: Request) -> Result<Value> {
        let mut ctx = CallContext::new(request.method, request.params, request.id);

        let outcome = match self.hooks.run_before(&mut ctx).await {
            Ok(HookAction::ShortCircuit(value)) => Ok(value),
            Ok(HookAction::Continue) => match self.registry.lookup(&ctx.method) {
                None => Err(Error::Rpc(RpcErrorData::method_not_found())),
                Some(entry) => match entry.spec.check(ctx.params.as_ref()) {
                    // Shape check before invocation: a mismatch is the
                    // caller's error, and the handler must not run at all.
                    Err(error) => Err(Error::Rpc(error)),
                    Ok(()) => entry.handler.call(ctx.params.take()).await,
                },
            },
            Err(error) => Err(error),
        };

        self.hooks.run_after(&ctx, outcome).await
    }
}

/// Settle one joined batch member.
///
/// A failed join means the member's task was cancelled or its panic escaped
/// the unwind guard; a call member is still owed an answer, so it gets an
/// opaque internal error under its id.
fn settle_member(
    owed_id: Option<Id>,
    joined: std::result::Result<Option<Response>, JoinError>,
) -> Option<Response> {
    match joined {
        Ok(response) => response,
        Err(join_error) => {
            tracing::error!(error = %join_error, "batch member task failed");
            owed_id.map(|id| Response::error(RpcErrorData::internal_error(), id))
        }
    }
}

/// Turn an invocation outcome into a response, or drop it for notifications.
fn finish(
    id: Option<Id>,
    method: &str,
    outcome: std::result::Result<Value, RpcErrorData>,
) -> Option<Response> {
    match id {
        Some(id) => Some(match outcome {
            Ok(result) => Response::success(result, id),
            Err(error) => Response::error(error, id),
        }),
        None => {
            // Notification outcomes are unobservable to the caller by
            // design; the log is the only side channel.
            if let Err(error) = outcome {
                tracing::warn!(method = %method, error = %error, "error in notification dropped");
            }
            None
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{from_fn, from_typed_fn};
    use crate::registry::ParamSpec;
    use jrpc_core::parser::parse_value;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dispatcher_with_add() -> Dispatcher {
        let mut registry = Registry::new();
        registry
            .register(
                "add",
                ParamSpec::positional(2),
                from_typed_fn(|(a, b): (i64, i64)| async move { Ok(a + b) }),
            )
            .unwrap();
        Dispatcher::new(registry)
    }

    #[tokio::test]
    async fn test_call_produces_response_with_matching_id() {
        let dispatcher = dispatcher_with_add();
        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "id": 7, "method": "add", "params": [1, 2]
        }));

        let output = dispatcher.dispatch(incoming).await.unwrap();
        match output {
            Output::Single(response) => {
                assert_eq!(response.id, Id::Number(7));
                assert_eq!(response.result, Some(json!(3)));
            }
            other => panic!("expected a single response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notification_produces_no_output() {
        let dispatcher = dispatcher_with_add();
        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "method": "add", "params": [1, 2]
        }));
        assert!(dispatcher.dispatch(incoming).await.is_none());
    }

    #[tokio::test]
    async fn test_notification_error_produces_no_output() {
        let dispatcher = dispatcher_with_add();
        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "method": "no_such_method"
        }));
        assert!(dispatcher.dispatch(incoming).await.is_none());
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let dispatcher = dispatcher_with_add();
        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "missing", "params": {"whatever": true}
        }));

        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found");
    }

    #[tokio::test]
    async fn test_unregistered_rpc_prefix_is_not_found() {
        let dispatcher = dispatcher_with_add();
        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "rpc.discover"
        }));

        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_param_mismatch_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = Registry::new();
        registry
            .register(
                "count",
                ParamSpec::positional(1),
                from_fn(move |_| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(json!(null))
                    }
                }),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "count", "params": [1, 2, 3]
        }));
        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };

        assert_eq!(response.error.unwrap().code, -32602);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_declared_application_error_passes_through() {
        let mut registry = Registry::new();
        registry
            .register(
                "fail",
                ParamSpec::None,
                from_fn(|_| async {
                    Err(Error::Rpc(
                        RpcErrorData::application(1200, "It was all in vain.")
                            .with_data(json!({"hint": "nothing helped"})),
                    ))
                }),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let incoming = parse_value(json!({"jsonrpc": "2.0", "id": 2, "method": "fail"}));
        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };
        let error = response.error.unwrap();
        assert_eq!(error.code, 1200);
        assert_eq!(error.message, "It was all in vain.");
        assert_eq!(error.data, Some(json!({"hint": "nothing helped"})));
    }

    #[tokio::test]
    async fn test_undeclared_failure_is_opaque_internal_error() {
        let mut registry = Registry::new();
        registry
            .register(
                "boom",
                ParamSpec::None,
                from_fn(|_| async { Err(Error::Internal("db password is hunter2".into())) }),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let incoming = parse_value(json!({"jsonrpc": "2.0", "id": 3, "method": "boom"}));
        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };
        let error = response.error.unwrap();
        assert_eq!(error.code, -32603);
        assert_eq!(error.message, "Internal error");
        assert!(error.data.is_none());
    }

    #[tokio::test]
    async fn test_handler_panic_is_internal_error() {
        let mut registry = Registry::new();
        registry
            .register(
                "panics",
                ParamSpec::None,
                from_fn(|_| async { panic!("handler bug") }),
            )
            .unwrap();
        let dispatcher = Dispatcher::with_mode(registry, BatchMode::Sequential);

        let incoming = parse_value(json!({"jsonrpc": "2.0", "id": 4, "method": "panics"}));
        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };
        assert_eq!(response.error.unwrap().code, -32603);
    }

    #[tokio::test]
    async fn test_inline_parse_error_answered_even_without_id() {
        let dispatcher = dispatcher_with_add();
        // Not an object; even though no id is extractable, the protocol
        // requires an error response with a null id.
        let incoming = parse_value(json!([42]));

        let Output::Batch(responses) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a batch response");
        };
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Id::Null);
        assert_eq!(responses[0].error.as_ref().unwrap().code, -32600);
    }

    async fn dead_member_task() -> std::result::Result<Option<Response>, tokio::task::JoinError> {
        let task = tokio::spawn(std::future::pending::<Option<Response>>());
        task.abort();
        task.await
    }

    #[tokio::test]
    async fn test_dead_member_task_still_answers_call() {
        let joined = dead_member_task().await;
        assert!(joined.is_err());

        let response = settle_member(Some(Id::Number(11)), joined).unwrap();
        assert_eq!(response.id, Id::Number(11));
        let error = response.error.unwrap();
        assert_eq!(error.code, -32603);
        assert_eq!(error.message, "Internal error");
    }

    #[tokio::test]
    async fn test_dead_member_task_stays_silent_for_notification() {
        let joined = dead_member_task().await;
        assert!(joined.is_err());
        assert!(settle_member(None, joined).is_none());
    }

    #[tokio::test]
    async fn test_null_id_call_is_answered_with_null_id() {
        let dispatcher = dispatcher_with_add();
        let incoming = parse_value(json!({
            "jsonrpc": "2.0", "id": null, "method": "add", "params": [2, 2]
        }));

        let Output::Single(response) = dispatcher.dispatch(incoming).await.unwrap() else {
            panic!("expected a single response");
        };
        assert_eq!(response.id, Id::Null);
        assert_eq!(response.result, Some(json!(4)));
    }
}
