//! Method registry and the traits methods implement to be dispatchable.
//!
//! Typed methods implement [`JsonRpcMethod`]; a blanket impl turns every one of
//! them into a type-erased [`MethodDescriptor`] that decodes the opaque params
//! payload, validates it and runs the action. That decode is the only place
//! where the wire's `serde_json::Value` becomes a concrete type.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{DispatchError, RegistryError, ValidationError};
use crate::request::RequestContext;

/// Parameter shape of a method.
///
/// A fresh value is decoded for every invocation, so no state leaks between
/// requests.
pub trait RpcParams: DeserializeOwned + Send + 'static {
    /// Check decoded parameters before the action runs
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl RpcParams for Value {}

impl RpcParams for () {}

/// A typed JSON-RPC method
#[async_trait]
pub trait JsonRpcMethod: Send + Sync + 'static {
    type Params: RpcParams;
    type Output: Serialize + Send;
    /// The action's failure type; its `Display` text becomes the error message
    type Error: std::error::Error + Send + Sync + 'static;

    async fn call(
        &self,
        request: &RequestContext,
        params: Self::Params,
    ) -> Result<Self::Output, Self::Error>;
}

/// Type-erased method as stored in the registry
#[async_trait]
pub trait MethodDescriptor: Send + Sync {
    /// Decode, validate and execute against an opaque params payload
    async fn invoke(
        &self,
        request: &RequestContext,
        params: Option<Value>,
    ) -> Result<Value, DispatchError>;
}

#[async_trait]
impl<M> MethodDescriptor for M
where
    M: JsonRpcMethod,
{
    async fn invoke(
        &self,
        request: &RequestContext,
        params: Option<Value>,
    ) -> Result<Value, DispatchError> {
        // Absent params decode from `null`, so `()` and `Option<_>` accept them
        let params: M::Params = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(DispatchError::InvalidParams)?;
        params.validate()?;

        let output = self
            .call(request, params)
            .await
            .map_err(|err| DispatchError::Action(err.to_string()))?;

        serde_json::to_value(output).map_err(DispatchError::ResultEncoding)
    }
}

/// A method backed by an async closure over its parameters.
///
/// The closure does not see the transport request; implement
/// [`JsonRpcMethod`] directly when the action needs headers or the peer
/// address.
pub struct FunctionMethod<P, F> {
    func: F,
    _params: PhantomData<fn() -> P>,
}

/// Wrap an async closure as a registrable method
pub fn method_fn<P, F>(func: F) -> FunctionMethod<P, F> {
    FunctionMethod {
        func,
        _params: PhantomData,
    }
}

#[async_trait]
impl<P, F, Fut, T, E> JsonRpcMethod for FunctionMethod<P, F>
where
    P: RpcParams,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    type Params = P;
    type Output = T;
    type Error = E;

    async fn call(&self, _request: &RequestContext, params: P) -> Result<T, E> {
        (self.func)(params).await
    }
}

/// Name → method table.
///
/// Populated during setup, then moved behind an `Arc` by the service so it is
/// only ever read while requests are in flight.
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<String, Arc<dyn MethodDescriptor>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a method; an existing binding is never replaced
    pub fn register<D>(
        &mut self,
        name: impl Into<String>,
        descriptor: D,
    ) -> Result<(), RegistryError>
    where
        D: MethodDescriptor + 'static,
    {
        match self.methods.entry(name.into()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateMethod(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!("Registered JSON-RPC method: {}", entry.key());
                entry.insert(Arc::new(descriptor));
                Ok(())
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn MethodDescriptor>> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered names, sorted
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.method_names())
            .finish()
    }
}
