//! Method registry and handler descriptors
//!
//! Maps method names to handlers plus the parameter shape each handler
//! accepts. Registration happens during setup and fails fast on
//! misconfiguration (empty or duplicate name); those failures never reach
//! the wire. Lookup is pure and never fails toward callers; absence is a
//! normal outcome the dispatcher turns into Method not found.
//!
//! # Snapshots
//!
//! The registry is cheaply cloneable: handlers live behind an
//! `Arc<HashMap>`, so a clone taken by a dispatch task observes a consistent
//! snapshot even if registration continues elsewhere. No lookup can see a
//! partially constructed entry.
//!
//! # Reserved names
//!
//! Method names starting with `rpc.` are reserved by the protocol for
//! internal extensions. The registry allows registering them (that is what
//! "explicitly recognized" means); unregistered `rpc.*` names simply miss
//! lookup like any other unknown method.

use crate::handler::Handler;
use jrpc_core::{Error, Params, Result, RpcErrorData};
use std::collections::HashMap;
use std::sync::Arc;

/// Declared parameter shape of a registered method
///
/// Checked by the dispatcher before the handler runs, so an argument
/// mismatch is classified as Invalid params (-32602) rather than surfacing
/// as an internal failure from inside the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSpec {
    /// The method takes no parameters. Absent params, an empty array, and
    /// an empty object all pass.
    None,
    /// Positional arguments: `required` must be present, up to `optional`
    /// more are accepted.
    Positional { required: usize, optional: usize },
    /// Named arguments: all of `required` must be present, `optional` may
    /// be, anything else is rejected.
    Named {
        required: Vec<String>,
        optional: Vec<String>,
    },
    /// No shape check; the handler takes the params as given (or absent).
    Raw,
}

impl ParamSpec {
    /// Exactly `count` positional arguments.
    pub fn positional(count: usize) -> Self {
        ParamSpec::Positional {
            required: count,
            optional: 0,
        }
    }

    /// `required` positional arguments plus up to `optional` more.
    pub fn positional_with_optional(required: usize, optional: usize) -> Self {
        ParamSpec::Positional { required, optional }
    }

    /// Exactly the given named arguments.
    pub fn named(names: &[&str]) -> Self {
        ParamSpec::Named {
            required: names.iter().map(|s| s.to_string()).collect(),
            optional: Vec::new(),
        }
    }

    /// The given required named arguments plus accepted optional ones.
    pub fn named_with_optional(required: &[&str], optional: &[&str]) -> Self {
        ParamSpec::Named {
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check the given params against this shape.
    pub fn check(&self, params: Option<&Params>) -> std::result::Result<(), RpcErrorData> {
        match self {
            ParamSpec::Raw => Ok(()),
            ParamSpec::None => match params {
                None => Ok(()),
                Some(p) if p.is_empty() => Ok(()),
                Some(_) => Err(RpcErrorData::invalid_params_msg(
                    "Method takes no parameters",
                )),
            },
            ParamSpec::Positional { required, optional } => {
                let given = match params {
                    None => 0,
                    Some(Params::Positional(args)) => args.len(),
                    Some(Params::Named(_)) => {
                        return Err(RpcErrorData::invalid_params_msg(
                            "Method takes positional parameters, named given",
                        ));
                    }
                };
                if given < *required || given > required + optional {
                    return Err(RpcErrorData::invalid_params_msg(if *optional == 0 {
                        format!("Method takes {} positional parameter(s), {} given", required, given)
                    } else {
                        format!(
                            "Method takes {} to {} positional parameter(s), {} given",
                            required,
                            required + optional,
                            given
                        )
                    }));
                }
                Ok(())
            }
            ParamSpec::Named { required, optional } => {
                let empty = serde_json::Map::new();
                let fields = match params {
                    None => &empty,
                    Some(Params::Named(fields)) => fields,
                    Some(Params::Positional(_)) => {
                        return Err(RpcErrorData::invalid_params_msg(
                            "Method takes named parameters, positional given",
                        ));
                    }
                };
                for name in required {
                    if !fields.contains_key(name) {
                        return Err(RpcErrorData::invalid_params_msg(format!(
                            "Missing required parameter \"{}\"",
                            name
                        )));
                    }
                }
                for name in fields.keys() {
                    if !required.contains(name) && !optional.contains(name) {
                        return Err(RpcErrorData::invalid_params_msg(format!(
                            "Unknown parameter \"{}\"",
                            name
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

/// A registered method: handler plus its declared parameter shape
pub struct MethodEntry {
    pub(crate) handler: Arc<dyn Handler>,
    pub(crate) spec: ParamSpec,
}

impl MethodEntry {
    /// The declared parameter shape.
    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }
}

/// Registry of named methods
///
/// Cheaply cloneable; clones share the underlying method table until one of
/// them registers, at which point it gets its own copy (`Arc::make_mut`).
/// Scope one registry per service instance rather than process-wide, so
/// multiple independently configured services can coexist.
#[derive(Clone, Default)]
pub struct Registry {
    methods: Arc<HashMap<String, Arc<MethodEntry>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name` with its declared parameter shape.
    ///
    /// Fails with a setup-time error if the name is empty or already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        spec: ParamSpec,
        handler: Box<dyn Handler>,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyMethodName);
        }
        if self.methods.contains_key(&name) {
            return Err(Error::DuplicateMethod(name));
        }
        if name.starts_with("rpc.") {
            tracing::debug!(method = %name, "registering a name in the rpc.-reserved prefix");
        }

        let methods = Arc::make_mut(&mut self.methods);
        methods.insert(
            name,
            Arc::new(MethodEntry {
                handler: Arc::from(handler),
                spec,
            }),
        );
        Ok(())
    }

    /// Register several methods at once under a common name prefix.
    ///
    /// Registration stops at the first failure, leaving earlier entries in
    /// place; setup code is expected to treat any failure as fatal.
    pub fn register_all(
        &mut self,
        prefix: &str,
        methods: Vec<(&str, ParamSpec, Box<dyn Handler>)>,
    ) -> Result<()> {
        for (name, spec, handler) in methods {
            self.register(format!("{}{}", prefix, name), spec, handler)?;
        }
        Ok(())
    }

    /// Look up a method by name. Absence is a normal outcome.
    pub fn lookup(&self, name: &str) -> Option<Arc<MethodEntry>> {
        self.methods.get(name).cloned()
    }

    /// Whether a method is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Names of all registered methods, in no particular order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }
}
