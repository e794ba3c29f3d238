//! The typed client factory.
//!
//! A [`Client`] binds base options, a hook bus, and transports into a callable
//! fetcher for one API. Base options come either as a static [`FetchOptions`]
//! value, merged key by key under each call's options, or as a function that
//! receives the call's options and returns the options to use, in which case
//! that function performs the only merge.
//!
//! Dispatch is typed end to end: the path marker and verb pick the
//! [`Operation`] at compile time, the operation fixes the parameter, query,
//! body, and success types, and the response decodes into the declared
//! success type.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use openfetch_core::operation::{BodySpec, Operation, Resolve, ToPathParams, verb};
use openfetch_core::{Request, Response, Result, Transport, fill_path, to_query_string};

use crate::fetch::perform;
use crate::hooks::{FetchHooks, HookBus, HookChain};
use crate::transport::HyperTransport;

// ============================================================================
// Execution context
// ============================================================================

/// Where the client is running, for transport selection.
///
/// A server-side client with a registered local transport short-circuits
/// root-relative requests to it instead of going over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    /// Server-rendering or backend context; local dispatch is eligible.
    #[default]
    Server,
    /// Browser-like context; every request goes through the global transport.
    Client,
}

// ============================================================================
// Options
// ============================================================================

/// Untyped per-call options, also the shape of a client's base options.
///
/// Every field is optional so that merging base options under call options is
/// a plain per-key overlay. The four hook slots merge at hook-key granularity
/// through [`FetchHooks::overlay`].
#[derive(Clone, Default)]
pub struct FetchOptions {
    /// Base URL the operation path is appended to. Absent or root-relative
    /// means the request targets the local origin.
    pub base_url: Option<String>,
    /// Request headers.
    pub headers: Option<HashMap<String, String>>,
    /// Query parameters, as ordered pairs.
    pub query: Option<Vec<(String, String)>>,
    /// Request-scoped lifecycle hooks.
    pub hooks: Option<FetchHooks>,
}

impl std::fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOptions")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl FetchOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the query pairs.
    #[must_use]
    pub fn query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query = Some(query.into_iter().collect());
        self
    }

    /// Set the hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: FetchHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Per-key overlay: `call`'s value wins for every key it supplies.
    ///
    /// Hooks are the one composite key: both sides supplying hooks overlay at
    /// hook-key granularity.
    #[must_use]
    pub fn overlay(base: Self, call: Self) -> Self {
        let hooks = match (base.hooks, call.hooks) {
            (Some(base), Some(call)) => Some(FetchHooks::overlay(base, call)),
            (base, call) => call.or(base),
        };
        Self {
            base_url: call.base_url.or(base.base_url),
            headers: call.headers.or(base.headers),
            query: call.query.or(base.query),
            hooks,
        }
    }
}

/// A client's base options: a static value or a per-call function.
#[derive(Clone)]
pub enum Defaults {
    /// Fixed base options, overlaid under each call's options.
    Static(FetchOptions),
    /// A function of the call's options. Its return value is used as-is; no
    /// further merging happens.
    Dynamic(Arc<dyn Fn(&FetchOptions) -> FetchOptions + Send + Sync>),
}

impl Default for Defaults {
    fn default() -> Self {
        Self::Static(FetchOptions::default())
    }
}

impl std::fmt::Debug for Defaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(options) => f.debug_tuple("Static").field(options).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<fn>").finish(),
        }
    }
}

impl Defaults {
    fn resolve(&self, call: FetchOptions) -> FetchOptions {
        match self {
            Self::Static(base) => FetchOptions::overlay(base.clone(), call),
            Self::Dynamic(f) => f(&call),
        }
    }
}

// ============================================================================
// Typed call options
// ============================================================================

/// Typed options for one call to an operation.
///
/// The field types come from the operation's contract, so a call site cannot
/// pass parameters or a body the operation does not declare.
pub struct CallOptions<Op: Operation> {
    /// Path parameters.
    pub path: Op::PathParams,
    /// Query parameters.
    pub query: Option<Op::Query>,
    /// Request body payload, per the operation's body rule.
    pub body: <Op::Body as BodySpec>::Payload,
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    /// Base URL override for this call.
    pub base_url: Option<String>,
    /// Request-scoped hooks for this call.
    pub hooks: FetchHooks,
}

impl<Op: Operation> Clone for CallOptions<Op>
where
    Op::PathParams: Clone,
    Op::Query: Clone,
    <Op::Body as BodySpec>::Payload: Clone,
{
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            query: self.query.clone(),
            body: self.body.clone(),
            headers: self.headers.clone(),
            base_url: self.base_url.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<Op: Operation> Default for CallOptions<Op>
where
    Op::PathParams: Default,
    <Op::Body as BodySpec>::Payload: Default,
{
    fn default() -> Self {
        Self {
            path: Op::PathParams::default(),
            query: None,
            body: <Op::Body as BodySpec>::Payload::default(),
            headers: HashMap::new(),
            base_url: None,
            hooks: FetchHooks::new(),
        }
    }
}

impl<Op: Operation> CallOptions<Op> {
    /// Options with explicit path parameters and body payload.
    #[must_use]
    pub fn new(path: Op::PathParams, body: impl Into<<Op::Body as BodySpec>::Payload>) -> Self {
        Self {
            path,
            query: None,
            body: body.into(),
            headers: HashMap::new(),
            base_url: None,
            hooks: FetchHooks::new(),
        }
    }

    /// Set the query parameters.
    #[must_use]
    pub fn query(mut self, query: Op::Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Set a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the base URL for this call.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request-scoped hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: FetchHooks) -> Self {
        self.hooks = hooks;
        self
    }

    fn erase(
        headers: &HashMap<String, String>,
        base_url: Option<String>,
        hooks: FetchHooks,
        query: Option<Vec<(String, String)>>,
    ) -> FetchOptions {
        FetchOptions {
            base_url,
            headers: (!headers.is_empty()).then(|| headers.clone()),
            query: query.filter(|pairs| !pairs.is_empty()),
            hooks: (!hooks.is_empty()).then_some(hooks),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// A configured fetcher for one API.
pub struct Client {
    name: Option<String>,
    defaults: Defaults,
    bus: Option<Arc<HookBus>>,
    global: Arc<dyn Transport>,
    local: Option<Arc<dyn Transport>>,
    context: ExecutionContext,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("bus", &self.bus.is_some())
            .field("local", &self.local.is_some())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Client {
    /// Create a client builder.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The client's name, used for per-client hook channels.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Call the operation a path declares for `get`.
    ///
    /// Available exactly for paths with a `get` operation; this is the entry
    /// point for callers that do not name a method.
    ///
    /// # Errors
    ///
    /// Returns an error if a hook rejects the call, the transport fails, the
    /// response status is not 2xx, or the body does not decode.
    pub async fn fetch<P>(
        &self,
        call: CallOptions<<P as Resolve<verb::Get>>::Op>,
    ) -> Result<<<P as Resolve<verb::Get>>::Op as Operation>::Success>
    where
        P: Resolve<verb::Get>,
    {
        self.request::<P, verb::Get>(call).await
    }

    /// Call the operation a path declares for an explicit verb.
    ///
    /// # Errors
    ///
    /// Returns an error if a hook rejects the call, the transport fails, the
    /// response status is not 2xx, or the body does not decode.
    pub async fn request<P, V>(
        &self,
        call: CallOptions<<P as Resolve<V>>::Op>,
    ) -> Result<<<P as Resolve<V>>::Op as Operation>::Success>
    where
        V: verb::Verb,
        P: Resolve<V>,
    {
        let response = self.request_raw::<P, V>(call).await?;
        response.json()
    }

    /// Like [`Client::request`], but hands back the raw response instead of
    /// decoding the success type.
    ///
    /// # Errors
    ///
    /// Returns an error if a hook rejects the call, the transport fails, or
    /// the response status is not 2xx.
    pub async fn request_raw<P, V>(
        &self,
        call: CallOptions<<P as Resolve<V>>::Op>,
    ) -> Result<Response<Bytes>>
    where
        V: verb::Verb,
        P: Resolve<V>,
    {
        let CallOptions {
            path,
            query,
            body,
            headers,
            base_url,
            hooks,
        } = call;

        let method = <<P as Resolve<V>>::Op as Operation>::METHOD;
        let template = <<P as Resolve<V>>::Op as Operation>::PATH;
        let path = fill_path(template, &path.to_path_params());

        let query = match &query {
            Some(query) => Some(query_pairs(query)?),
            None => None,
        };
        let merged = self
            .defaults
            .resolve(CallOptions::<<P as Resolve<V>>::Op>::erase(
                &headers, base_url, hooks, query,
            ));

        let transport = self.select_transport(&path, merged.base_url.as_deref());
        let url = resolve_url(merged.base_url.as_deref(), &path)?;

        let mut builder = Request::builder(method, url);
        if let Some(headers) = merged.headers {
            builder = builder.headers(headers);
        }
        if let Some(query) = merged.query {
            builder = builder.query_pairs(query);
        }
        if let Some(body) =
            <<<P as Resolve<V>>::Op as Operation>::Body as BodySpec>::into_body(body)?
        {
            let (content_type, bytes) = body.encode()?;
            builder = builder.header("Content-Type", content_type).body(bytes);
        }
        let request = builder.build();

        let chain = HookChain::new(
            self.bus.clone(),
            self.name.clone(),
            merged.hooks.unwrap_or_default(),
        );
        perform(transport, request, &chain).await
    }

    /// Local dispatch applies only to in-origin requests from a server
    /// context; anything with an external base URL goes over the wire.
    fn select_transport(&self, path: &str, base_url: Option<&str>) -> &dyn Transport {
        if self.context == ExecutionContext::Server && path.starts_with('/') {
            let root_relative = base_url.is_none_or(|base| base.starts_with('/'));
            if root_relative {
                if let Some(local) = &self.local {
                    return local.as_ref();
                }
            }
        }
        self.global.as_ref()
    }
}

/// Serialize a typed query into ordered pairs.
fn query_pairs<Q: serde::Serialize>(query: &Q) -> Result<Vec<(String, String)>> {
    let encoded = to_query_string(query)?;
    Ok(url::form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect())
}

/// Join a base URL and a filled path into the wire URL.
///
/// An absent or root-relative base targets the local origin; those requests
/// normally short-circuit to the local transport, so the host is a
/// placeholder.
fn resolve_url(base: Option<&str>, path: &str) -> Result<url::Url> {
    let joined = match base {
        Some(base) if base.starts_with('/') => {
            format!("http://localhost{}{path}", base.trim_end_matches('/'))
        }
        Some(base) => format!("{}{path}", base.trim_end_matches('/')),
        None => format!("http://localhost{path}"),
    };
    url::Url::parse(&joined).map_err(Into::into)
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    name: Option<String>,
    defaults: Defaults,
    bus: Option<Arc<HookBus>>,
    global: Option<Arc<dyn Transport>>,
    local: Option<Arc<dyn Transport>>,
    context: ExecutionContext,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("bus", &self.bus.is_some())
            .field("global", &self.global.is_some())
            .field("local", &self.local.is_some())
            .field("context", &self.context)
            .finish()
    }
}

impl ClientBuilder {
    /// Name the client; per-client hook channels use this name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set static base options.
    #[must_use]
    pub fn defaults(mut self, options: FetchOptions) -> Self {
        self.defaults = Defaults::Static(options);
        self
    }

    /// Set base options as a function of each call's options.
    ///
    /// The function's return value is used directly; it is responsible for
    /// any merging it wants.
    #[must_use]
    pub fn defaults_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&FetchOptions) -> FetchOptions + Send + Sync + 'static,
    {
        self.defaults = Defaults::Dynamic(Arc::new(f));
        self
    }

    /// Attach the application hook bus.
    #[must_use]
    pub fn bus(mut self, bus: Arc<HookBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Set the global transport. Defaults to a [`HyperTransport`].
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.global = Some(transport);
        self
    }

    /// Register a local transport for in-origin dispatch.
    #[must_use]
    pub fn local_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.local = Some(transport);
        self
    }

    /// Set the execution context. Defaults to [`ExecutionContext::Server`].
    #[must_use]
    pub const fn context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> Client {
        Client {
            name: self.name,
            defaults: self.defaults,
            bus: self.bus,
            global: self
                .global
                .unwrap_or_else(|| Arc::new(HyperTransport::new())),
            local: self.local,
            context: self.context,
        }
    }
}
