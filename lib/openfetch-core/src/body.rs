//! Request body representations and serialization utilities.
//!
//! A call site supplies a typed payload; by the time the transport sees it,
//! the payload has been erased to a tagged [`Body`]: a structured value the
//! transport must encode, or a native pre-built form it passes through
//! unchanged. [`Body::encode`] is the single encoding step, invoked by the
//! transport.

use bytes::Bytes;

use crate::multipart::{Form, Part};
use crate::Result;

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
    /// Multipart form content type (`multipart/form-data`).
    ///
    /// The wire header additionally carries a boundary parameter, see
    /// [`Form::content_type`].
    Multipart,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::Multipart => "multipart/form-data",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Native form representations
// ============================================================================

/// Ordered key-value pairs: the native representation of a URL-encoded form.
///
/// Callers may hand-build one of these instead of the structured schema shape
/// an operation declares for `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPairs(Vec<(String, String)>);

impl FormPairs {
    /// Create an empty pair list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a key-value pair.
    #[must_use]
    pub fn append(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// The pairs, in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl From<Vec<(String, String)>> for FormPairs {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl FromIterator<(String, String)> for FormPairs {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Tagged runtime body
// ============================================================================

/// A URL-encoded form body: structured value or native pairs.
#[derive(Debug, Clone)]
pub enum FormBody {
    /// Structured value the transport URL-encodes.
    Structured(serde_json::Value),
    /// Pre-built pairs passed through unchanged.
    Pairs(FormPairs),
}

/// A multipart form body: structured value or native form.
#[derive(Debug, Clone)]
pub enum MultipartBody {
    /// Structured value the transport turns into form parts.
    Structured(serde_json::Value),
    /// Pre-built multipart form passed through unchanged.
    Form(Form),
}

/// Type-erased request body, tagged by media type.
///
/// Which tags are legal for a given operation is decided at compile time by
/// the operation's [`BodySpec`](crate::operation::BodySpec); the transport
/// only performs the final wire encoding.
#[derive(Debug, Clone)]
pub enum Body {
    /// `application/json` body.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` body.
    UrlEncoded(FormBody),
    /// `multipart/form-data` body.
    Multipart(MultipartBody),
}

impl Body {
    /// Encode into a (`Content-Type` header value, body bytes) pair.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization of a structured value fails.
    pub fn encode(self) -> Result<(String, Bytes)> {
        match self {
            Self::Json(value) => Ok((ContentType::Json.as_str().to_string(), to_json(&value)?)),
            Self::UrlEncoded(FormBody::Structured(value)) => Ok((
                ContentType::FormUrlEncoded.as_str().to_string(),
                to_form(&value)?,
            )),
            Self::UrlEncoded(FormBody::Pairs(pairs)) => Ok((
                ContentType::FormUrlEncoded.as_str().to_string(),
                to_form(pairs.pairs())?,
            )),
            Self::Multipart(MultipartBody::Structured(value)) => {
                let (content_type, bytes) = structured_multipart(value)?.into_body();
                Ok((content_type, bytes))
            }
            Self::Multipart(MultipartBody::Form(form)) => {
                let (content_type, bytes) = form.into_body();
                Ok((content_type, bytes))
            }
        }
    }
}

/// Build a multipart [`Form`] from a structured object value.
///
/// String fields become text parts; other scalars are stringified; nested
/// arrays and objects become JSON parts.
fn structured_multipart(value: serde_json::Value) -> Result<Form> {
    let serde_json::Value::Object(fields) = value else {
        return Err(crate::Error::invalid_request(
            "multipart body must be an object",
        ));
    };

    let mut form = Form::new();
    for (name, field) in fields {
        form = match field {
            serde_json::Value::Null => form,
            serde_json::Value::String(text) => form.part(Part::text(name, text)),
            serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
                form.part(Part::text(name, field.to_string()))
            }
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => form.part(
                Part::new(name, to_json(&nested)?)
                    .with_content_type(ContentType::Json.as_str()),
            ),
        };
    }
    Ok(form)
}

// ============================================================================
// Serialization helpers
// ============================================================================

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to form URL-encoded bytes.
///
/// Uses `serde_html_form` which supports `Vec<T>` for repeated form fields
/// (e.g., `tags=a&tags=b&tags=c`).
///
/// # Errors
///
/// Returns an error if form serialization fails.
pub fn to_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Serialize a value to a query string.
///
/// Uses `serde_html_form` which supports `Vec<T>` for repeated query
/// parameters (e.g., `?tags=a&tags=b&tags=c`).
///
/// # Errors
///
/// Returns an error if query serialization fails.
pub fn to_query_string<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_html_form::to_string(value).map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so failures name the exact field that did not
/// deserialize (e.g., "pet.category.name").
///
/// # Errors
///
/// Returns an error if JSON deserialization fails.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
