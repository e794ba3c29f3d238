//! Core types and contract traits for the openfetch typed HTTP client.
//!
//! This crate provides the foundations the runtime client builds on:
//! - [`operation`] - Compile-time operation contracts emitted by the schema
//!   compiler ([`operation::Operation`], [`operation::Resolve`], body rules)
//! - [`fill_path`] - Path template substitution
//! - [`Body`] - Tagged runtime request body with its single encoding step
//! - [`multipart`] - Native multipart form escape hatch
//! - [`Method`] - HTTP method enum with case-insensitive parsing
//! - [`Request`] and [`Response`] - Wire-level request/response types
//! - [`Transport`] - Object-safe execution seam
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod body;
mod error;
mod method;
pub mod multipart;
pub mod operation;
mod path_template;
pub mod prelude;
mod request;
mod response;
mod transport;

pub use body::{
    Body, ContentType, FormBody, FormPairs, MultipartBody, from_json, to_form, to_json,
    to_query_string,
};
pub use error::{Error, Result};
pub use method::Method;
pub use multipart::{Form, Part};
pub use path_template::fill_path;
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use transport::{Transport, TransportFuture};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
