//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use openfetch::prelude::*;
//! ```

pub use crate::operation::{
    BodySpec, Either, FormPayload, Json, Multipart, MultipartPayload, NoBody, OneOf, Operation,
    Optional, Resolve, ToPathParams, UrlEncoded, verb,
};
pub use crate::{
    Body, CallOptions, Client, ContentType, Error, ExecutionContext, FetchEvent, FetchHooks,
    FetchOptions, Form, FormPairs, HookBus, HookContext, HyperTransport, Method, Part, Request,
    Response, Result, StatusCode, Transport, UseFetch, UseFetchOptions, create_use_client,
    from_json, header, to_form, to_json,
};
pub use serde::{Deserialize, Serialize};
