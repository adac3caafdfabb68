//! The channel the client sends calls through.
//!
//! [`Transport`] is the blocking dispatch seam. [`GrpcTransport`] is the
//! real one: a lazily connected tonic channel driven by a runtime it owns.
//! [`Intercepted`] composes a tonic [`Interceptor`] around any transport.

use adservice_protocol::*;
use parking_lot::{Mutex, RwLock};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tonic::service::Interceptor;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Response, Status};

use crate::config::ClientConfig;
use crate::error::{CallError, ClientError};

/// Status returned for calls issued after shutdown started
pub(crate) fn shutdown_status() -> Status {
    Status::unavailable("Channel shutdown invoked")
}

/// Blocking unary transport for the Ad Service
pub trait Transport: Send + Sync {
    fn get_ads(&self, request: Request<AdRequest>) -> Result<Response<AdResponse>, CallError>;

    /// Release the connection, waiting at most `grace` for it to close
    fn shutdown(&self, grace: Duration);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get_ads(&self, request: Request<AdRequest>) -> Result<Response<AdResponse>, CallError> {
        (**self).get_ads(request)
    }

    fn shutdown(&self, grace: Duration) {
        (**self).shutdown(grace)
    }
}

/// A transport with an interceptor run before every call
pub struct Intercepted<T, I> {
    inner: T,
    interceptor: I,
}

impl<T, I> Intercepted<T, I> {
    pub fn new(inner: T, interceptor: I) -> Self {
        Self { inner, interceptor }
    }
}

impl<T, I> Transport for Intercepted<T, I>
where
    T: Transport,
    I: Interceptor + Clone + Send + Sync,
{
    fn get_ads(&self, request: Request<AdRequest>) -> Result<Response<AdResponse>, CallError> {
        let (metadata, extensions, message) = request.into_parts();
        let mut interceptor = self.interceptor.clone();
        let (metadata, extensions, ()) = interceptor
            .call(Request::from_parts(metadata, extensions, ()))?
            .into_parts();
        self.inner
            .get_ads(Request::from_parts(metadata, extensions, message))
    }

    fn shutdown(&self, grace: Duration) {
        self.inner.shutdown(grace)
    }
}

/// Plaintext gRPC transport
///
/// Owns a small multi-threaded tokio runtime; [`Transport::get_ads`]
/// blocks the calling thread on it. Must not be called from within an
/// async context.
pub struct GrpcTransport {
    target: String,
    handle: Handle,
    runtime: Mutex<Option<Runtime>>,
    stub: RwLock<Option<AdServiceStub<Channel>>>,
}

impl GrpcTransport {
    /// Build the channel without connecting. The first call establishes
    /// the connection, so an unreachable server only surfaces there.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, ClientError> {
        let address = config.endpoint_uri();
        let mut endpoint =
            Endpoint::from_shared(address.clone()).map_err(|source| ClientError::ConnectionSetup {
                address: address.clone(),
                source,
            })?;
        if let Some(timeout) = config.call_timeout {
            endpoint = endpoint.timeout(timeout);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("adservice-grpc")
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;

        // The channel spawns its connection worker onto the current runtime
        let channel = {
            let _guard = runtime.enter();
            endpoint.connect_lazy()
        };

        tracing::debug!(endpoint = %address, "Created lazy gRPC channel");

        Ok(Self {
            target: address,
            handle: runtime.handle().clone(),
            runtime: Mutex::new(Some(runtime)),
            stub: RwLock::new(Some(AdServiceStub::new(channel))),
        })
    }
}

impl Transport for GrpcTransport {
    fn get_ads(&self, request: Request<AdRequest>) -> Result<Response<AdResponse>, CallError> {
        let Some(mut stub) = self.stub.read().clone() else {
            return Err(CallError::Status(shutdown_status()));
        };
        self.handle
            .block_on(stub.get_ads(request))
            .map_err(CallError::Status)
    }

    fn shutdown(&self, grace: Duration) {
        // Dropping the last stub closes the channel
        self.stub.write().take();
        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_timeout(grace);
            tracing::debug!(endpoint = %self.target, "gRPC channel shut down");
        }
    }
}

impl Drop for GrpcTransport {
    fn drop(&mut self) {
        // Never block in drop; pending work is abandoned
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}
