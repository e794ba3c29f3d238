//! Fetch lifecycle hooks.
//!
//! Every call dispatches four lifecycle events through up to three tiers of
//! hooks: global bus subscribers (`openFetch:<event>`), per-client bus
//! subscribers (`openFetch:<event>:<clientName>`), and request-scoped hooks
//! supplied in the options. [`HookChain`] composes the tiers into one ordered
//! dispatch per event.
//!
//! The bus is an explicitly injected dependency owned by the application; a
//! client built without one simply skips the first two tiers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use futures_util::future::{BoxFuture, try_join_all};

use openfetch_core::{Request, Response, Result};

/// One of the four fetch lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchEvent {
    /// Before the transport performs the request.
    Request,
    /// The transport failed before a response was produced.
    RequestError,
    /// A response with a success status arrived.
    Response,
    /// A response with an error status arrived.
    ResponseError,
}

impl FetchEvent {
    /// The event name used in channel names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Request => "onRequest",
            Self::RequestError => "onRequestError",
            Self::Response => "onResponse",
            Self::ResponseError => "onResponseError",
        }
    }

    /// The global channel name: `openFetch:<event>`.
    #[must_use]
    pub const fn channel(self) -> &'static str {
        match self {
            Self::Request => "openFetch:onRequest",
            Self::RequestError => "openFetch:onRequestError",
            Self::Response => "openFetch:onResponse",
            Self::ResponseError => "openFetch:onResponseError",
        }
    }

    /// The per-client channel name: `openFetch:<event>:<clientName>`.
    #[must_use]
    pub fn client_channel(self, client_name: &str) -> String {
        format!("{}:{client_name}", self.channel())
    }
}

/// Context passed to every hook invocation.
///
/// Carries the wire request and, for response/error events, the outcome.
/// Hooks observe; they alter control flow only by returning an error, which
/// aborts the remaining chain for the call.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// The wire request being performed.
    pub request: Request<Bytes>,
    /// The response, for `onResponse`/`onResponseError`.
    pub response: Option<Response<Bytes>>,
    /// The failure message, for `onRequestError`.
    pub error: Option<String>,
}

impl HookContext {
    /// Context for the `onRequest` event.
    #[must_use]
    pub fn for_request(request: Request<Bytes>) -> Self {
        Self {
            request,
            response: None,
            error: None,
        }
    }

    /// Derive a context carrying a response.
    #[must_use]
    pub fn with_response(mut self, response: Response<Bytes>) -> Self {
        self.response = Some(response);
        self
    }

    /// Derive a context carrying a transport failure.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// A lifecycle hook: an async callback on a [`HookContext`].
pub type Hook = Arc<dyn Fn(HookContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Wrap an async closure into a [`Hook`].
pub fn hook_fn<F, Fut>(f: F) -> Hook
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

// ============================================================================
// Hook bus (global + per-client tiers)
// ============================================================================

/// Application-wide hook bus.
///
/// Channels are plain strings; subscribers on one channel run sequentially in
/// registration order when the channel is emitted. The bus is read-only at
/// call time from the client's perspective.
#[derive(Default)]
pub struct HookBus {
    channels: RwLock<HashMap<String, Vec<Hook>>>,
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("HookBus")
            .field("channels", &channels.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HookBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a hook to a channel.
    pub fn on<F, Fut>(&self, channel: impl Into<String>, f: F)
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.subscribe(channel, hook_fn(f));
    }

    /// Subscribe an already-boxed hook to a channel.
    pub fn subscribe(&self, channel: impl Into<String>, hook: Hook) {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(channel.into())
            .or_default()
            .push(hook);
    }

    /// Emit a context on a channel, awaiting every subscriber in order.
    ///
    /// # Errors
    ///
    /// Returns the first subscriber error; later subscribers do not run.
    pub async fn emit(&self, channel: &str, ctx: &HookContext) -> Result<()> {
        let hooks = {
            let channels = self
                .channels
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            channels.get(channel).cloned().unwrap_or_default()
        };
        for hook in hooks {
            hook(ctx.clone()).await?;
        }
        Ok(())
    }
}

// ============================================================================
// Local (request-scoped) tier
// ============================================================================

/// Request-scoped hooks: an ordered list per lifecycle event.
///
/// A single hook is just a one-element list. Within one event the entries run
/// concurrently; joint completion is awaited.
#[derive(Clone, Default)]
pub struct FetchHooks {
    request: Vec<Hook>,
    request_error: Vec<Hook>,
    response: Vec<Hook>,
    response_error: Vec<Hook>,
}

impl std::fmt::Debug for FetchHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHooks")
            .field("request", &self.request.len())
            .field("request_error", &self.request_error.len())
            .field("response", &self.response.len())
            .field("response_error", &self.response_error.len())
            .finish()
    }
}

impl FetchHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an `onRequest` hook.
    #[must_use]
    pub fn on_request<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.request.push(hook_fn(f));
        self
    }

    /// Add an `onRequestError` hook.
    #[must_use]
    pub fn on_request_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.request_error.push(hook_fn(f));
        self
    }

    /// Add an `onResponse` hook.
    #[must_use]
    pub fn on_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.response.push(hook_fn(f));
        self
    }

    /// Add an `onResponseError` hook.
    #[must_use]
    pub fn on_response_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.response_error.push(hook_fn(f));
        self
    }

    /// The hooks registered for an event.
    #[must_use]
    pub fn get(&self, event: FetchEvent) -> &[Hook] {
        match event {
            FetchEvent::Request => &self.request,
            FetchEvent::RequestError => &self.request_error,
            FetchEvent::Response => &self.response,
            FetchEvent::ResponseError => &self.response_error,
        }
    }

    /// Returns `true` if no hooks are registered for any event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.request.is_empty()
            && self.request_error.is_empty()
            && self.response.is_empty()
            && self.response_error.is_empty()
    }

    /// Shallow per-event overlay: for each event, `call`'s hook list replaces
    /// `base`'s when `call` supplies one.
    #[must_use]
    pub fn overlay(base: Self, call: Self) -> Self {
        let pick = |call: Vec<Hook>, base: Vec<Hook>| if call.is_empty() { base } else { call };
        Self {
            request: pick(call.request, base.request),
            request_error: pick(call.request_error, base.request_error),
            response: pick(call.response, base.response),
            response_error: pick(call.response_error, base.response_error),
        }
    }
}

// ============================================================================
// Composed chain
// ============================================================================

/// The composed hook chain for one client call.
///
/// Dispatch order per event: all global subscribers complete, then all
/// per-client subscribers complete, then the request-scoped tier runs (its
/// entries concurrently). Any hook error aborts the rest of the chain and
/// propagates to the caller unchanged; there is no tier isolation.
#[derive(Clone)]
pub struct HookChain {
    bus: Option<Arc<HookBus>>,
    client_name: Option<String>,
    local: FetchHooks,
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("bus", &self.bus.is_some())
            .field("client_name", &self.client_name)
            .field("local", &self.local)
            .finish()
    }
}

impl HookChain {
    /// Compose a chain from an optional bus, an optional client name, and the
    /// request-scoped hooks.
    #[must_use]
    pub fn new(bus: Option<Arc<HookBus>>, client_name: Option<String>, local: FetchHooks) -> Self {
        Self {
            bus,
            client_name,
            local,
        }
    }

    /// Dispatch one lifecycle event through the three tiers.
    ///
    /// # Errors
    ///
    /// Propagates the first hook error; remaining tiers do not run.
    pub async fn dispatch(&self, event: FetchEvent, ctx: &HookContext) -> Result<()> {
        if let Some(bus) = &self.bus {
            bus.emit(event.channel(), ctx).await?;
            if let Some(name) = &self.client_name {
                bus.emit(&event.client_channel(name), ctx).await?;
            }
        }

        let local = self.local.get(event);
        if !local.is_empty() {
            try_join_all(local.iter().map(|hook| hook(ctx.clone()))).await?;
        }
        Ok(())
    }
}
