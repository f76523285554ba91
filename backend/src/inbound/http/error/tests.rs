//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("store down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_body(error: Error) -> serde_json::Value {
    let response = ResponseError::error_response(&error);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error body is JSON")
}

#[actix_web::test]
async fn internal_errors_are_redacted() {
    let body = response_body(
        Error::internal("pool exhausted at 10.0.0.4").with_details(json!({ "secret": "x" })),
    )
    .await;
    assert_eq!(
        body,
        json!({ "code": "internal_error", "message": "Internal server error" })
    );
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let body = response_body(
        Error::invalid_request("unknown table").with_details(json!({ "tables": "widgets" })),
    )
    .await;
    assert_eq!(body["code"], json!("invalid_request"));
    assert_eq!(body["message"], json!("unknown table"));
    assert_eq!(body["details"], json!({ "tables": "widgets" }));
}

#[actix_web::test]
async fn unavailable_store_maps_to_503() {
    let body = response_body(Error::service_unavailable("sync store unavailable")).await;
    assert_eq!(body["code"], json!("service_unavailable"));
}
