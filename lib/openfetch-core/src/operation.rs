//! Compile-time operation contracts.
//!
//! A schema compiler turns an OpenAPI document into marker types implementing
//! the traits in this module: one marker per path template, one [`Operation`]
//! per (path, method) pair, wired together with [`Resolve`]. The client never
//! inspects a schema at runtime; a call site is checked entirely by type
//! inference:
//!
//! - an undeclared path or method has no [`Resolve`] impl and fails to
//!   compile;
//! - the accepted request-body shapes are the payload type of the operation's
//!   [`BodySpec`], a union of the structured schema shape and the native
//!   escape hatches for form encodings;
//! - the success response type is the operation's `Success` associated type.
//!
//! # Example
//!
//! What a generated paths module looks like, hand-written:
//!
//! ```
//! use openfetch_core::operation::{verb, Json, NoBody, Operation, Resolve, ToPathParams};
//! use openfetch_core::Method;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Pet {
//!     pub id: u64,
//!     pub name: String,
//! }
//!
//! /// Path marker for `/pet/{petId}`.
//! pub struct PetById;
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct PetByIdParams {
//!     pub pet_id: u64,
//! }
//!
//! impl ToPathParams for PetByIdParams {
//!     fn to_path_params(&self) -> Vec<(String, String)> {
//!         vec![("petId".to_string(), self.pet_id.to_string())]
//!     }
//! }
//!
//! pub struct GetPetById;
//!
//! impl Operation for GetPetById {
//!     const PATH: &'static str = "/pet/{petId}";
//!     const METHOD: Method = Method::Get;
//!     type PathParams = PetByIdParams;
//!     type Query = ();
//!     type Body = NoBody;
//!     type Success = Pet;
//! }
//!
//! impl Resolve<verb::Get> for PetById {
//!     type Op = GetPetById;
//! }
//! ```

use std::marker::PhantomData;

use crate::body::{Body, FormBody, FormPairs, MultipartBody};
use crate::multipart::Form;
use crate::{Method, Result};

// ============================================================================
// Verbs
// ============================================================================

/// Marker types for compile-time method selection.
pub mod verb {
    use crate::Method;

    /// A compile-time HTTP verb marker.
    pub trait Verb {
        /// The runtime method this marker stands for.
        const METHOD: Method;
    }

    /// `get` marker. Also the default when a call site omits the method.
    pub struct Get;
    /// `post` marker.
    pub struct Post;
    /// `put` marker.
    pub struct Put;
    /// `delete` marker.
    pub struct Delete;
    /// `patch` marker.
    pub struct Patch;
    /// `head` marker.
    pub struct Head;
    /// `options` marker.
    pub struct Options;

    impl Verb for Get {
        const METHOD: Method = Method::Get;
    }
    impl Verb for Post {
        const METHOD: Method = Method::Post;
    }
    impl Verb for Put {
        const METHOD: Method = Method::Put;
    }
    impl Verb for Delete {
        const METHOD: Method = Method::Delete;
    }
    impl Verb for Patch {
        const METHOD: Method = Method::Patch;
    }
    impl Verb for Head {
        const METHOD: Method = Method::Head;
    }
    impl Verb for Options {
        const METHOD: Method = Method::Options;
    }
}

// ============================================================================
// Operation & resolution
// ============================================================================

/// One (path, method) pair's full request/response contract.
///
/// Produced by the schema compiler; has no runtime representation beyond its
/// associated constants.
pub trait Operation {
    /// The path template, with `{param}` placeholders.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: Method;
    /// Path parameters, keyed by placeholder name.
    type PathParams: ToPathParams + Send;
    /// Query parameters. `()` when the operation declares none.
    type Query: serde::Serialize + Send;
    /// Accepted request-body media types and shapes.
    type Body: BodySpec;
    /// Response body type for the success status class.
    type Success: serde::de::DeserializeOwned;
}

/// Compile-time lookup of the operation a path defines for a verb.
///
/// The schema compiler emits one impl per method an operation object
/// declares, so `P: Resolve<verb::Post>` holds exactly when the path has a
/// `post` operation. A path with a `get` operation satisfies
/// `Resolve<verb::Get>`, which is what makes the method-omitted entry point
/// available for it.
pub trait Resolve<V: verb::Verb> {
    /// The resolved operation.
    type Op: Operation;
}

// ============================================================================
// Path parameters
// ============================================================================

/// Conversion of a typed parameter struct into the name/value map consumed by
/// [`fill_path`](crate::fill_path).
///
/// Implemented by generated parameter structs; `()` is the empty parameter
/// object for operations without path parameters.
pub trait ToPathParams {
    /// The (placeholder name, string value) pairs.
    fn to_path_params(&self) -> Vec<(String, String)>;
}

impl ToPathParams for () {
    fn to_path_params(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

impl ToPathParams for Vec<(String, String)> {
    fn to_path_params(&self) -> Vec<(String, String)> {
        self.clone()
    }
}

impl ToPathParams for std::collections::HashMap<String, String> {
    fn to_path_params(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

// ============================================================================
// Body classification
// ============================================================================

/// The request-body rule an operation declares.
///
/// Each implementor fixes the `Payload` a caller may pass (the union of
/// accepted representations for the declared media types) and owns the
/// erasure of that payload into the tagged runtime [`Body`]. Encoding into
/// wire bytes stays with the transport.
pub trait BodySpec {
    /// What a call site supplies for this body rule.
    type Payload: Send;

    /// Erase the payload into its tagged runtime body, or `None` when the
    /// call carries no body.
    ///
    /// # Errors
    ///
    /// Returns an error if serializing a structured value fails.
    fn into_body(payload: Self::Payload) -> Result<Option<Body>>;
}

/// No request body declared: the body field is absent from the call site.
pub struct NoBody;

impl BodySpec for NoBody {
    type Payload = ();

    fn into_body((): ()) -> Result<Option<Body>> {
        Ok(None)
    }
}

/// `application/json` with schema `S`: the accepted body is exactly `S`.
///
/// JSON is its own representation, so there is no native escape hatch.
pub struct Json<S>(PhantomData<S>);

impl<S: serde::Serialize + Send> BodySpec for Json<S> {
    type Payload = S;

    fn into_body(payload: S) -> Result<Option<Body>> {
        Ok(Some(Body::Json(serde_json::to_value(payload)?)))
    }
}

/// `application/x-www-form-urlencoded` with schema `S`: accepts `S` or
/// native ordered pairs.
pub struct UrlEncoded<S>(PhantomData<S>);

/// The accepted union for a URL-encoded body.
#[derive(Debug, Clone)]
pub enum FormPayload<S> {
    /// The structured schema shape, auto-encoded by the transport.
    Structured(S),
    /// Hand-built pairs, passed through unchanged.
    Pairs(FormPairs),
}

impl<S> From<FormPairs> for FormPayload<S> {
    fn from(pairs: FormPairs) -> Self {
        Self::Pairs(pairs)
    }
}

impl<S: serde::Serialize + Send> BodySpec for UrlEncoded<S> {
    type Payload = FormPayload<S>;

    fn into_body(payload: Self::Payload) -> Result<Option<Body>> {
        let form = match payload {
            FormPayload::Structured(value) => FormBody::Structured(serde_json::to_value(value)?),
            FormPayload::Pairs(pairs) => FormBody::Pairs(pairs),
        };
        Ok(Some(Body::UrlEncoded(form)))
    }
}

/// `multipart/form-data` with schema `S`: accepts `S` or a native
/// hand-built [`Form`].
pub struct Multipart<S>(PhantomData<S>);

/// The accepted union for a multipart body.
#[derive(Debug, Clone)]
pub enum MultipartPayload<S> {
    /// The structured schema shape, turned into form parts by the transport.
    Structured(S),
    /// A hand-built multipart form, passed through unchanged.
    Form(Form),
}

impl<S> From<Form> for MultipartPayload<S> {
    fn from(form: Form) -> Self {
        Self::Form(form)
    }
}

impl<S: serde::Serialize + Send> BodySpec for Multipart<S> {
    type Payload = MultipartPayload<S>;

    fn into_body(payload: Self::Payload) -> Result<Option<Body>> {
        let multipart = match payload {
            MultipartPayload::Structured(value) => {
                MultipartBody::Structured(serde_json::to_value(value)?)
            }
            MultipartPayload::Form(form) => MultipartBody::Form(form),
        };
        Ok(Some(Body::Multipart(multipart)))
    }
}

/// A schema-optional body: the call site may omit it.
pub struct Optional<K>(PhantomData<K>);

impl<K: BodySpec> BodySpec for Optional<K> {
    type Payload = Option<K::Payload>;

    fn into_body(payload: Self::Payload) -> Result<Option<Body>> {
        match payload {
            Some(inner) => K::into_body(inner),
            None => Ok(None),
        }
    }
}

/// An operation declaring two body media types: the accepted payload is the
/// union of both rules. Nest for three or more.
pub struct OneOf<A, B>(PhantomData<(A, B)>);

/// A value of one of two body rules' payloads.
#[derive(Debug, Clone)]
pub enum Either<A, B> {
    /// The first rule's payload.
    Left(A),
    /// The second rule's payload.
    Right(B),
}

impl<A: BodySpec, B: BodySpec> BodySpec for OneOf<A, B> {
    type Payload = Either<A::Payload, B::Payload>;

    fn into_body(payload: Self::Payload) -> Result<Option<Body>> {
        match payload {
            Either::Left(a) => A::into_body(a),
            Either::Right(b) => B::into_body(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::let_assert;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Pet {
        name: String,
        status: String,
    }

    struct PetById;

    #[derive(Debug, Clone, Default)]
    struct PetByIdParams {
        pet_id: u64,
    }

    impl ToPathParams for PetByIdParams {
        fn to_path_params(&self) -> Vec<(String, String)> {
            vec![("petId".to_string(), self.pet_id.to_string())]
        }
    }

    struct GetPetById;

    impl Operation for GetPetById {
        const PATH: &'static str = "/pet/{petId}";
        const METHOD: Method = Method::Get;
        type PathParams = PetByIdParams;
        type Query = ();
        type Body = NoBody;
        type Success = Pet;
    }

    struct UpdatePetWithForm;

    impl Operation for UpdatePetWithForm {
        const PATH: &'static str = "/pet/{petId}";
        const METHOD: Method = Method::Post;
        type PathParams = PetByIdParams;
        type Query = ();
        type Body = UrlEncoded<Pet>;
        type Success = Pet;
    }

    impl Resolve<verb::Get> for PetById {
        type Op = GetPetById;
    }

    impl Resolve<verb::Post> for PetById {
        type Op = UpdatePetWithForm;
    }

    // Resolution is pure type computation; this pins the (path, verb) ->
    // operation lookup used below.
    fn resolved_method<P, V>() -> Method
    where
        V: verb::Verb,
        P: Resolve<V>,
    {
        <P::Op as Operation>::METHOD
    }

    #[test]
    fn resolve_selects_declared_operations() {
        assert_eq!(resolved_method::<PetById, verb::Get>(), Method::Get);
        assert_eq!(resolved_method::<PetById, verb::Post>(), Method::Post);
        assert_eq!(<GetPetById as Operation>::PATH, "/pet/{petId}");
        // `PetById: Resolve<verb::Delete>` does not hold, so a delete call
        // site would not compile; nothing to assert at runtime.
    }

    #[test]
    fn path_params_map() {
        let params = PetByIdParams { pet_id: 9 };
        assert_eq!(
            params.to_path_params(),
            vec![("petId".to_string(), "9".to_string())]
        );
        assert!(().to_path_params().is_empty());
    }

    #[test]
    fn no_body_produces_none() {
        let body = NoBody::into_body(()).expect("no body");
        assert!(body.is_none());
    }

    #[test]
    fn json_body_tagged_json() {
        let pet = Pet {
            name: "Rex".to_string(),
            status: "available".to_string(),
        };
        let body = Json::<Pet>::into_body(pet).expect("encode");
        let_assert!(Some(Body::Json(value)) = body);
        assert_eq!(value["name"], "Rex");
    }

    #[test]
    fn urlencoded_accepts_structured_and_pairs() {
        let pet = Pet {
            name: "Rex".to_string(),
            status: "sold".to_string(),
        };
        let body = UrlEncoded::<Pet>::into_body(FormPayload::Structured(pet)).expect("encode");
        let_assert!(Some(Body::UrlEncoded(FormBody::Structured(_))) = body);

        let pairs = FormPairs::new().append("name", "Rex");
        let body = UrlEncoded::<Pet>::into_body(pairs.into()).expect("encode");
        let_assert!(Some(Body::UrlEncoded(FormBody::Pairs(_))) = body);
    }

    #[test]
    fn multipart_accepts_structured_and_native_form() {
        let pet = Pet {
            name: "Rex".to_string(),
            status: "sold".to_string(),
        };
        let body = Multipart::<Pet>::into_body(MultipartPayload::Structured(pet)).expect("encode");
        let_assert!(Some(Body::Multipart(MultipartBody::Structured(_))) = body);

        let form = Form::new().text("name", "Rex");
        let body = Multipart::<Pet>::into_body(form.into()).expect("encode");
        let_assert!(Some(Body::Multipart(MultipartBody::Form(_))) = body);
    }

    #[test]
    fn optional_body_may_be_omitted() {
        let body = Optional::<Json<Pet>>::into_body(None).expect("none");
        assert!(body.is_none());

        let pet = Pet::default();
        let body = Optional::<Json<Pet>>::into_body(Some(pet)).expect("some");
        assert!(body.is_some());
    }

    #[test]
    fn one_of_unions_two_rules() {
        let pet = Pet::default();
        let body = OneOf::<Json<Pet>, Multipart<Pet>>::into_body(Either::Left(pet))
            .expect("left");
        let_assert!(Some(Body::Json(_)) = body);

        let form = Form::new().text("name", "Rex");
        let body = OneOf::<Json<Pet>, Multipart<Pet>>::into_body(Either::Right(form.into()))
            .expect("right");
        let_assert!(Some(Body::Multipart(_)) = body);
    }
}
