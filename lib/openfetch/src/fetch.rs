//! The fetch pipeline: one wire request through hooks and a transport.
//!
//! Order per call: `onRequest` hooks, transport I/O, then either `onResponse`
//! (2xx) or `onResponseError` (any other status, surfaced as
//! [`Error::Http`]); a transport failure dispatches `onRequestError` instead.
//! The pipeline performs no retries and no response transformation.

use std::time::Instant;

use bytes::Bytes;
use tracing::{Instrument, Level, debug, info, span, warn};

use openfetch_core::{Error, Request, Response, Result, StatusCode, Transport};

use crate::hooks::{FetchEvent, HookChain, HookContext};

/// Execute a wire request through the composed hook chain and a transport.
///
/// Hook errors abort the call at the point they occur and propagate
/// unchanged; transport and HTTP-status errors dispatch their error event
/// first and then propagate.
pub(crate) async fn perform(
    transport: &dyn Transport,
    request: Request<Bytes>,
    chain: &HookChain,
) -> Result<Response<Bytes>> {
    let method = request.method();
    let url = request.url().to_string();
    let span = span!(Level::INFO, "fetch", %method, %url);

    async move {
        let ctx = HookContext::for_request(request.clone());
        chain.dispatch(FetchEvent::Request, &ctx).await?;

        debug!(%method, %url, "sending request");
        let start = Instant::now();
        let outcome = transport.execute(request).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Err(err) => {
                warn!(error = %err, elapsed_ms, "request failed");
                let ctx = ctx.with_error(err.to_string());
                chain.dispatch(FetchEvent::RequestError, &ctx).await?;
                Err(err)
            }
            Ok(response) if response.is_success() => {
                info!(status = response.status(), elapsed_ms, "request completed");
                let ctx = ctx.with_response(response.clone());
                chain.dispatch(FetchEvent::Response, &ctx).await?;
                Ok(response)
            }
            Ok(response) => {
                let status = response.status();
                warn!(status, elapsed_ms, "request failed with HTTP error");
                let ctx = ctx.with_response(response.clone());
                chain.dispatch(FetchEvent::ResponseError, &ctx).await?;
                Err(Error::http_with_body(
                    status,
                    reason_phrase(status),
                    response.into_body(),
                ))
            }
        }
    }
    .instrument(span)
    .await
}

fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("HTTP error")
        .to_string()
}
