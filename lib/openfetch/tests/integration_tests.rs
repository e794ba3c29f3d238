//! Integration tests for `Client` over the wire, using wiremock.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

use openfetch::operation::{Json, Multipart, MultipartPayload, NoBody, UrlEncoded};
use openfetch::prelude::*;
use openfetch::{CallOptions, FetchOptions, HookBus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pet {
    id: u64,
    name: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct StatusQuery {
    status: String,
}

// Markers a schema compiler would emit for a slice of the petstore document.

struct PetRoot;
struct PetById;
struct FindByStatus;
struct UploadImage;

#[derive(Debug, Clone, Default)]
struct PetByIdParams {
    pet_id: u64,
}

impl ToPathParams for PetByIdParams {
    fn to_path_params(&self) -> Vec<(String, String)> {
        vec![("petId".to_string(), self.pet_id.to_string())]
    }
}

struct AddPet;

impl Operation for AddPet {
    const PATH: &'static str = "/pet";
    const METHOD: Method = Method::Post;
    type PathParams = ();
    type Query = ();
    type Body = Json<Pet>;
    type Success = Pet;
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

struct FindPetsByStatus;

impl Operation for FindPetsByStatus {
    const PATH: &'static str = "/pet/findByStatus";
    const METHOD: Method = Method::Get;
    type PathParams = ();
    type Query = StatusQuery;
    type Body = NoBody;
    type Success = Vec<Pet>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ApiResponse {
    code: u32,
    message: String,
}

struct UploadPetImage;

impl Operation for UploadPetImage {
    const PATH: &'static str = "/pet/{petId}/uploadImage";
    const METHOD: Method = Method::Post;
    type PathParams = PetByIdParams;
    type Query = ();
    type Body = Multipart<serde_json::Value>;
    type Success = ApiResponse;
}

impl Resolve<verb::Post> for PetRoot {
    type Op = AddPet;
}

impl Resolve<verb::Get> for PetById {
    type Op = GetPetById;
}

impl Resolve<verb::Post> for PetById {
    type Op = UpdatePetWithForm;
}

impl Resolve<verb::Get> for FindByStatus {
    type Op = FindPetsByStatus;
}

impl Resolve<verb::Post> for UploadImage {
    type Op = UploadPetImage;
}

fn rex() -> Pet {
    Pet {
        id: 1,
        name: "Rex".to_string(),
        status: "available".to_string(),
    }
}

fn petstore_client(server: &MockServer) -> Client {
    Client::builder()
        .name("pets")
        .defaults(FetchOptions::new().base_url(server.uri()))
        .build()
}

#[tokio::test]
async fn get_pet_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rex()))
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let pet = client
        .fetch::<PetById>(CallOptions::new(PetByIdParams { pet_id: 1 }, ()))
        .await
        .expect("pet");

    assert_eq!(pet, rex());
}

#[tokio::test]
async fn post_pet_with_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pet"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(rex()))
        .respond_with(ResponseTemplate::new(200).set_body_json(rex()))
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let pet = client
        .request::<PetRoot, verb::Post>(CallOptions::new((), rex()))
        .await
        .expect("pet");

    assert_eq!(pet, rex());
}

#[tokio::test]
async fn post_pet_with_urlencoded_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pet/1"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rex()))
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let pairs = FormPairs::new()
        .append("name", "Rex")
        .append("status", "available");
    let pet = client
        .request::<PetById, verb::Post>(CallOptions::new(
            PetByIdParams { pet_id: 1 },
            pairs,
        ))
        .await
        .expect("pet");

    assert_eq!(pet, rex());
}

#[tokio::test]
async fn get_with_typed_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/findByStatus"))
        .and(query_param("status", "available"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![rex()]))
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let pets = client
        .fetch::<FindByStatus>(CallOptions::new((), ()).query(StatusQuery {
            status: "available".to_string(),
        }))
        .await
        .expect("pets");

    assert_eq!(pets, vec![rex()]);
}

#[tokio::test]
async fn upload_image_as_multipart() {
    let mock_server = MockServer::start().await;

    let api_response = ApiResponse {
        code: 200,
        message: "uploaded".to_string(),
    };
    Mock::given(method("POST"))
        .and(path("/pet/1/uploadImage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&api_response))
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let form = Form::new()
        .text("additionalMetadata", "profile picture")
        .file("file", "rex.png", b"\x89PNG".to_vec());
    let response = client
        .request::<UploadImage, verb::Post>(CallOptions::new(
            PetByIdParams { pet_id: 1 },
            MultipartPayload::Form(form),
        ))
        .await
        .expect("upload");

    assert_eq!(response, api_response);
}

#[tokio::test]
async fn http_error_carries_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/99"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"code":404,"message":"Pet not found"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let err = client
        .fetch::<PetById>(CallOptions::new(PetByIdParams { pet_id: 99 }, ()))
        .await
        .expect_err("should be an HTTP error");

    assert_eq!(err.status(), Some(404));
    assert!(err.is_not_found());
    let decoded: ApiResponse = err
        .decode_body()
        .expect("body present")
        .expect("body decodes");
    assert_eq!(decoded.message, "Pet not found");
}

#[tokio::test]
async fn hooks_fire_over_the_wire_in_tier_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rex()))
        .mount(&mock_server)
        .await;

    let log = Arc::new(Mutex::new(Vec::new()));
    let record = |log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str| {
        let log = Arc::clone(log);
        move |_ctx| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap_or_else(PoisonError::into_inner).push(tag);
                Ok(())
            }
        }
    };

    let bus = Arc::new(HookBus::new());
    bus.on(FetchEvent::Request.channel(), record(&log, "global-request"));
    bus.on(
        FetchEvent::Request.client_channel("pets"),
        record(&log, "client-request"),
    );
    bus.on(FetchEvent::Response.channel(), record(&log, "global-response"));

    let client = Client::builder()
        .name("pets")
        .defaults(FetchOptions::new().base_url(mock_server.uri()))
        .bus(Arc::clone(&bus))
        .build();

    let hooks = FetchHooks::new()
        .on_request(record(&log, "local-request"))
        .on_response(record(&log, "local-response"));
    client
        .fetch::<PetById>(CallOptions::new(PetByIdParams { pet_id: 1 }, ()).hooks(hooks))
        .await
        .expect("pet");

    let seen = log.lock().unwrap_or_else(PoisonError::into_inner).clone();
    assert_eq!(
        seen,
        vec![
            "global-request",
            "client-request",
            "local-request",
            "global-response",
            "local-response",
        ]
    );
}

#[tokio::test]
async fn failing_request_hook_prevents_network_io() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rex()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = petstore_client(&mock_server);
    let hooks =
        FetchHooks::new().on_request(|_ctx| async { Err(Error::hook("blocked by policy")) });
    let err = client
        .fetch::<PetById>(CallOptions::new(PetByIdParams { pet_id: 1 }, ()).hooks(hooks))
        .await
        .expect_err("hook error");

    assert_eq!(err.to_string(), "hook error: blocked by policy");
}

#[tokio::test]
async fn error_status_dispatches_response_error_hook() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pet/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&statuses);
    let hooks = FetchHooks::new().on_response_error(move |ctx| {
        let seen = Arc::clone(&seen);
        async move {
            if let Some(response) = &ctx.response {
                seen.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(response.status());
            }
            Ok(())
        }
    });

    let client = petstore_client(&mock_server);
    let err = client
        .fetch::<PetById>(CallOptions::new(PetByIdParams { pet_id: 1 }, ()).hooks(hooks))
        .await
        .expect_err("HTTP error");

    assert_eq!(err.status(), Some(500));
    let statuses = statuses.lock().unwrap_or_else(PoisonError::into_inner).clone();
    assert_eq!(statuses, vec![500]);
}
