//! REST Client Integration Tests
//!
//! Run `RestClient` against a local fake platform and check bodies, empty
//! responses and error classification.
//!
//! Run with: cargo test -p integration-tests --test rest_tests

use std::time::Duration;

use chat_api::{ApiResponse, Attachment, RestClient};
use chat_common::{ClientError, Token};
use integration_tests::TestServer;
use serde_json::json;

#[tokio::test]
async fn test_credential_and_user_agent_are_sent() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client().unwrap();

    let body = client.get("/users/@me").await.unwrap().into_body().unwrap();
    assert_eq!(body["username"], "mirror");
    assert_eq!(body["agent"], "chat-mirror-tests");
}

#[tokio::test]
async fn test_bad_credential_is_auth_error() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client_with_token("wrong").unwrap();

    let err = client.get("/users/@me").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(ref m) if m == "401: Unauthorized"), "{err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_post_json_body() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client().unwrap();

    let response = client
        .post("/channels/10/messages", &json!({ "content": "hello" }))
        .await
        .unwrap();
    let ApiResponse::Body(body) = response else {
        panic!("expected a body");
    };
    assert_eq!(body["channel_id"], "10");
    assert_eq!(body["content"], "hello");
}

#[tokio::test]
async fn test_validation_error_carries_code_and_fields() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client().unwrap();

    let err = client
        .post("/channels/10/messages", &json!({ "content": "far too long for this channel" }))
        .await
        .unwrap_err();
    let ClientError::Validation { code, message, errors } = err else {
        panic!("expected a validation error");
    };
    assert_eq!(code, 50035);
    assert_eq!(message, "Invalid Form Body");
    assert!(errors.is_some_and(|e| e["content"].is_object()));
}

#[tokio::test]
async fn test_empty_responses() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client().unwrap();

    assert_eq!(client.delete("/channels/10/messages/5").await.unwrap(), ApiResponse::NoContent);
    assert_eq!(
        client.put::<()>("/channels/10/pins/5", None).await.unwrap(),
        ApiResponse::NoContent
    );
}

#[tokio::test]
async fn test_multipart_upload() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client().unwrap();

    let file = Attachment::new("notes.txt", b"remember the milk".to_vec()).with_content_type("text/plain");
    let body = client
        .post_multipart("/channels/10/attachments", &json!({ "content": "see attached" }), vec![file])
        .await
        .unwrap()
        .into_body()
        .unwrap();

    assert_eq!(body["multipart"], true);
    assert_eq!(body["payload_json"], true);
    assert_eq!(body["file"], true);
    assert_eq!(body["metadata"], true);
}

#[tokio::test]
async fn test_error_classes() {
    let server = TestServer::start().await.expect("Failed to start server");
    let client = server.client().unwrap();

    let err = client
        .patch("/guilds/1/members/2", &json!({ "nick": "x" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Permission(ref m) if m == "Missing Permissions"));

    let err = client.get("/channels/404").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m == "Unknown Channel"));

    let err = client.get("/limited").await.unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_millis(250)));
    assert!(matches!(err, ClientError::RateLimited { global: false, .. }));

    let err = client.get("/broken").await.unwrap_err();
    assert!(matches!(err, ClientError::ServerFault { status: 502 }));
    assert!(err.is_retryable());

    let err = client.get("/teapot").await.unwrap_err();
    assert!(matches!(err, ClientError::Unclassified { status: 418, ref body } if body == "short and stout"));
}

#[tokio::test]
async fn test_unreachable_platform_is_transport_error() {
    let client = RestClient::with_base_url(&Token::bot("t"), "http://127.0.0.1:1", "chat-mirror-tests").unwrap();

    let err = client.get("/users/@me").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
