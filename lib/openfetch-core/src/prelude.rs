//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use openfetch_core::prelude::*;
//! ```

pub use crate::multipart::{Form, Part};
pub use crate::operation::{
    BodySpec, Either, FormPayload, Json, Multipart, MultipartPayload, NoBody, OneOf, Operation,
    Optional, Resolve, ToPathParams, UrlEncoded, verb,
};
pub use crate::{
    Body, ContentType, Error, FormPairs, Method, Request, RequestBuilder, Response, Result,
    Transport, fill_path, from_json, to_form, to_json,
};
