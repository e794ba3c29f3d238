//! Data-fetch handles over a [`Client`].
//!
//! [`UseClient`] wraps a client with the call-site shape a data-layer
//! integration consumes: the same typed resolution as the client itself,
//! plus `immediate`, `default`, `transform`, and `pick` options. A call
//! yields a re-triggerable [`UseFetch`] handle instead of a bare value.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use openfetch_core::operation::{Operation, Resolve, verb};
use openfetch_core::{Error, Result};

use crate::client::{CallOptions, Client};

type Project<S, R> = Arc<dyn Fn(S) -> Result<R> + Send + Sync>;
type Fetcher<R> = Arc<dyn Fn() -> BoxFuture<'static, Result<R>> + Send + Sync>;

/// Options consumed by the wrapper, not by the client.
///
/// `S` is the operation's declared success type; `R` is the handle's result
/// type. They coincide unless a `transform` or `pick` projection overrides
/// the declared type.
pub struct UseFetchOptions<S, R> {
    immediate: bool,
    default: Option<R>,
    project: Project<S, R>,
}

impl<S, R> std::fmt::Debug for UseFetchOptions<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseFetchOptions")
            .field("immediate", &self.immediate)
            .field("default", &self.default.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: 'static> Default for UseFetchOptions<S, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> UseFetchOptions<S, S> {
    /// The declared result type, immediate execution, no default value.
    #[must_use]
    pub fn new() -> Self {
        Self {
            immediate: true,
            default: None,
            project: Arc::new(|value| Ok(value)),
        }
    }
}

impl<S, R> UseFetchOptions<S, R> {
    /// Override the declared result type with a mapping over the success
    /// value.
    #[must_use]
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(S) -> R + Send + Sync + 'static,
    {
        Self {
            immediate: true,
            default: None,
            project: Arc::new(move |value| Ok(f(value))),
        }
    }

    /// Whether the handle executes on creation. Defaults to `true`; with
    /// `false` the handle starts at its default value until
    /// [`UseFetch::refresh`] is called.
    #[must_use]
    pub const fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Initial value the handle carries before the first resolution.
    #[must_use]
    pub fn default_value(mut self, value: R) -> Self {
        self.default = Some(value);
        self
    }
}

impl<S, R> UseFetchOptions<S, R>
where
    S: serde::Serialize + 'static,
    R: serde::de::DeserializeOwned + 'static,
{
    /// Project the named fields out of an object-shaped success value.
    ///
    /// The result type is whatever the retained fields deserialize into,
    /// typically a narrower struct or a `serde_json::Value`.
    #[must_use]
    pub fn pick(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self {
            immediate: true,
            default: None,
            project: Arc::new(move |value| {
                let mut value = serde_json::to_value(value)?;
                if let serde_json::Value::Object(map) = &mut value {
                    map.retain(|key, _| keys.iter().any(|k| k == key));
                }
                serde_json::from_value(value).map_err(Error::from)
            }),
        }
    }
}

/// A wrapper exposing data-fetch handles for one client.
#[derive(Debug, Clone)]
pub struct UseClient {
    client: Arc<Client>,
}

/// Wrap a client for handle-style consumption.
#[must_use]
pub fn create_use_client(client: Arc<Client>) -> UseClient {
    UseClient { client }
}

impl UseClient {
    /// Handle for the operation a path declares for `get`.
    ///
    /// # Errors
    ///
    /// With `immediate` set, a failing first execution is returned here
    /// instead of producing a handle.
    pub async fn fetch<P, R>(
        &self,
        call: CallOptions<<P as Resolve<verb::Get>>::Op>,
        options: UseFetchOptions<<<P as Resolve<verb::Get>>::Op as Operation>::Success, R>,
    ) -> Result<UseFetch<R>>
    where
        P: Resolve<verb::Get> + 'static,
        <<P as Resolve<verb::Get>>::Op as Operation>::Success: Send,
        CallOptions<<P as Resolve<verb::Get>>::Op>: Clone + Send + Sync + 'static,
        R: Send + 'static,
    {
        self.request::<P, verb::Get, R>(call, options).await
    }

    /// Handle for the operation a path declares for an explicit verb.
    ///
    /// # Errors
    ///
    /// With `immediate` set, a failing first execution is returned here
    /// instead of producing a handle.
    pub async fn request<P, V, R>(
        &self,
        call: CallOptions<<P as Resolve<V>>::Op>,
        options: UseFetchOptions<<<P as Resolve<V>>::Op as Operation>::Success, R>,
    ) -> Result<UseFetch<R>>
    where
        V: verb::Verb + 'static,
        P: Resolve<V> + 'static,
        <<P as Resolve<V>>::Op as Operation>::Success: Send,
        CallOptions<<P as Resolve<V>>::Op>: Clone + Send + Sync + 'static,
        R: Send + 'static,
    {
        let UseFetchOptions {
            immediate,
            default,
            project,
        } = options;

        let client = Arc::clone(&self.client);
        let fetcher: Fetcher<R> = Arc::new(move || {
            let client = Arc::clone(&client);
            let call = call.clone();
            let project = Arc::clone(&project);
            Box::pin(async move {
                let value = client.request::<P, V>(call).await?;
                project(value)
            })
        });

        let mut handle = UseFetch {
            data: default,
            fetcher,
        };
        if immediate {
            handle.refresh().await?;
        }
        Ok(handle)
    }
}

/// A resolved-or-pending fetch with a re-trigger.
pub struct UseFetch<R> {
    data: Option<R>,
    fetcher: Fetcher<R>,
}

impl<R: std::fmt::Debug> std::fmt::Debug for UseFetch<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseFetch")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl<R> UseFetch<R> {
    /// The current value: the last resolution, or the default before one.
    #[must_use]
    pub const fn data(&self) -> Option<&R> {
        self.data.as_ref()
    }

    /// Consume the handle, keeping the current value.
    #[must_use]
    pub fn into_data(self) -> Option<R> {
        self.data
    }

    /// Execute the call again and replace the current value.
    ///
    /// A failed execution leaves the previous value in place.
    ///
    /// # Errors
    ///
    /// Returns the underlying fetch or projection error.
    pub async fn refresh(&mut self) -> Result<&R> {
        let value = (self.fetcher)().await?;
        Ok(self.data.insert(value))
    }
}
