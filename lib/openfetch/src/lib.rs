//! Statically typed OpenAPI HTTP client runtime.
//!
//! A schema compiler turns an OpenAPI document into marker types; this crate
//! turns those markers into calls. A [`Client`] resolves the operation from a
//! path marker and a verb at compile time, fills the path template, merges
//! base and call options, dispatches the four lifecycle events through global,
//! per-client, and request-scoped hooks, and decodes the declared success
//! type.
//!
//! # Example
//!
//! ```ignore
//! use openfetch::prelude::*;
//!
//! let client = Client::builder()
//!     .name("pets")
//!     .defaults(FetchOptions::new().base_url("https://petstore.example.com/v3"))
//!     .build();
//!
//! let pet = client
//!     .fetch::<paths::PetById>(CallOptions::new(PetByIdParams { pet_id: 1 }, ()))
//!     .await?;
//! ```

mod client;
mod config;
mod connector;
mod fetch;
mod handle;
pub mod hooks;
pub mod prelude;
mod transport;

pub use client::{
    CallOptions, Client, ClientBuilder, Defaults, ExecutionContext, FetchOptions,
};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use handle::{UseClient, UseFetch, UseFetchOptions, create_use_client};
pub use hooks::{FetchEvent, FetchHooks, Hook, HookBus, HookChain, HookContext, hook_fn};
pub use transport::HyperTransport;

// Re-export core types
pub use openfetch_core::{
    Body, ContentType, Error, Form, FormPairs, Method, Part, Request, RequestBuilder, Response,
    Result, Transport, TransportFuture, fill_path, from_json, to_form, to_json, to_query_string,
};

/// Compile-time operation contracts consumed by generated code.
pub use openfetch_core::operation;

// Re-export http types for status codes and headers
pub use openfetch_core::{StatusCode, header};

// Re-export crates for generated code
pub use percent_encoding;
pub use serde_html_form;
pub use url;
