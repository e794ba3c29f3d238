//! Transport seam.
//!
//! A [`Transport`] performs the actual I/O for an already-built wire
//! [`Request`]. The client factory holds two of them: the ambient global
//! transport (a real HTTP client) and, optionally, a local in-process
//! transport used for same-origin server-side calls that can skip the
//! network hop. Both sit behind the same object-safe trait so they are
//! interchangeable at dispatch time.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Boxed future returned by [`Transport::execute`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'a>>;

/// Executes wire-level HTTP requests.
///
/// Implementations are expected to surface failures as [`crate::Error`]:
/// network errors as `Connection`, TLS problems as `Tls`, and timeouts as
/// `Timeout`. Status-code classification is not a transport concern; a
/// non-2xx response is still an `Ok` at this level.
pub trait Transport: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason: network errors,
    /// TLS errors, timeouts, or an invalid response.
    fn execute(&self, request: Request<Bytes>) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: Request<Bytes>) -> TransportFuture<'_> {
        (**self).execute(request)
    }
}
