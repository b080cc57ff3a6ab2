//! Claim protocol against the HTTP queue client.

mod support;

use std::sync::Arc;

use chrono::Duration;
use futures::FutureExt;
use nimbus_core::{acquire_claim, delete_message, with_claim, MessageQueuePort};
use nimbus_domain::{ClaimId, ClaimRequest, MessageId, NimbusError, QueueName};
use serde_json::json;
use support::{queue_client, tenant, TOKEN};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_ID: &str = "3381af92-2b9e-11e3-b191-71861300734c";

fn demo() -> QueueName {
    QueueName::new("demo").unwrap()
}

fn port(server: &MockServer) -> Arc<dyn MessageQueuePort> {
    queue_client(server, Uuid::parse_str(CLIENT_ID).unwrap())
}

fn request() -> ClaimRequest {
    ClaimRequest::new(Duration::seconds(300), Duration::seconds(60)).with_limit(2)
}

fn claimed_message(id: &str, claim: &str) -> serde_json::Value {
    json!({
        "href": tenant(&format!("queues/demo/messages/{id}?claim_id={claim}")),
        "ttl": 800,
        "age": 12,
        "body": {"event": "ActivateAccount", "id": id}
    })
}

async fn mount_claim(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(tenant("queues/demo/claims")))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", tenant("queues/demo/claims/c1").as_str())
                .set_body_json(json!([claimed_message("m1", "c1"), claimed_message("m2", "c1")])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn acquire_reads_identity_from_location() {
    support::init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(tenant("queues/demo/claims")))
        .and(query_param("limit", "2"))
        .and(header("Client-ID", CLIENT_ID))
        .and(header("X-Auth-Token", TOKEN))
        .and(body_json(json!({"ttl": 300, "grace": 60})))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", tenant("queues/demo/claims/c1").as_str())
                .set_body_json(json!([claimed_message("m1", "c1"), claimed_message("m2", "c1")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let claim = acquire_claim(port(&server), &demo(), &request(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(claim.id().map(|id| id.as_str()), Some("c1"));
    assert_eq!(claim.messages().len(), 2);
    assert_eq!(claim.messages()[0].id().as_str(), "m1");
    assert_eq!(claim.ttl(), Duration::seconds(300));
    assert_eq!(claim.grace(), Duration::seconds(60));
    assert_eq!(claim.age(), Duration::zero());
}

#[tokio::test]
async fn no_content_yields_empty_claim_without_release_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(tenant("queues/demo/claims")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut claim = acquire_claim(port(&server), &demo(), &request(), &cancel).await.unwrap();

    assert!(claim.is_empty());
    assert!(claim.id().is_none());
    claim.renew(Duration::seconds(60), &cancel).await.unwrap();
    claim.release(&cancel).await.unwrap();
    assert!(claim.is_released());
}

#[tokio::test]
async fn release_is_sent_once() {
    let server = MockServer::start().await;
    mount_claim(&server).await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/claims/c1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut claim = acquire_claim(port(&server), &demo(), &request(), &cancel).await.unwrap();

    claim.release(&cancel).await.unwrap();
    claim.release(&cancel).await.unwrap();
    claim.release(&cancel).await.unwrap();

    assert!(matches!(claim.query(&cancel).await, Err(NimbusError::InvalidState(_))));
    assert!(matches!(
        claim.renew(Duration::seconds(60), &cancel).await,
        Err(NimbusError::InvalidState(_))
    ));
}

#[tokio::test]
async fn release_of_expired_claim_succeeds() {
    let server = MockServer::start().await;
    mount_claim(&server).await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/claims/c1")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut claim = acquire_claim(port(&server), &demo(), &request(), &cancel).await.unwrap();

    claim.release(&cancel).await.unwrap();
    assert!(claim.is_released());
}

#[tokio::test]
async fn query_replaces_snapshot() {
    let server = MockServer::start().await;
    mount_claim(&server).await;
    Mock::given(method("GET"))
        .and(path(tenant("queues/demo/claims/c1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "href": tenant("queues/demo/claims/c1"),
            "ttl": 300,
            "age": 45,
            "messages": [claimed_message("m2", "c1")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut claim = acquire_claim(port(&server), &demo(), &request(), &cancel).await.unwrap();
    claim.query(&cancel).await.unwrap();

    assert_eq!(claim.age(), Duration::seconds(45));
    assert_eq!(claim.messages().len(), 1);
    assert_eq!(claim.messages()[0].id().as_str(), "m2");

    claim.release(&cancel).await.unwrap();
}

#[tokio::test]
async fn renew_patches_ttl_and_resets_age() {
    let server = MockServer::start().await;
    mount_claim(&server).await;
    Mock::given(method("PATCH"))
        .and(path(tenant("queues/demo/claims/c1")))
        .and(body_json(json!({"ttl": 600})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut claim = acquire_claim(port(&server), &demo(), &request(), &cancel).await.unwrap();

    claim.renew(Duration::seconds(600), &cancel).await.unwrap();
    assert_eq!(claim.ttl(), Duration::seconds(600));
    assert_eq!(claim.age(), Duration::zero());

    claim.release(&cancel).await.unwrap();
}

#[tokio::test]
async fn delete_through_owning_claim_sends_claim_id() {
    let server = MockServer::start().await;
    mount_claim(&server).await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/messages/m1")))
        .and(query_param("claim_id", "c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/claims/c1")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let mut claim = acquire_claim(port(&server), &demo(), &request(), &cancel).await.unwrap();

    claim.delete_message(&MessageId::new("m1"), &cancel).await.unwrap();
    claim.release(&cancel).await.unwrap();
}

#[tokio::test]
async fn forbidden_delete_is_claim_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/messages/m7")))
        .respond_with(ResponseTemplate::new(403).set_body_string("claimed by someone else"))
        .expect(2)
        .mount(&server)
        .await;

    let queue = port(&server);
    let cancel = CancellationToken::new();

    let without_claim =
        delete_message(queue.as_ref(), &demo(), &MessageId::new("m7"), None, &cancel).await;
    assert!(matches!(without_claim, Err(NimbusError::ClaimMismatch(_))), "got {without_claim:?}");

    let other = ClaimId::new("other");
    let with_other =
        queue.delete_message(&demo(), &MessageId::new("m7"), Some(&other), &cancel).await;
    assert!(matches!(with_other, Err(NimbusError::ClaimMismatch(_))), "got {with_other:?}");
}

#[tokio::test]
async fn conflict_delete_is_claim_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/messages/m7")))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let err = port(&server)
        .delete_message(&demo(), &MessageId::new("m7"), None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NimbusError::ClaimMismatch(_)));
}

#[tokio::test]
async fn with_claim_releases_when_body_fails() {
    let server = MockServer::start().await;
    mount_claim(&server).await;
    Mock::given(method("DELETE"))
        .and(path(tenant("queues/demo/claims/c1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result: Result<(), NimbusError> =
        with_claim(port(&server), &demo(), &request(), &CancellationToken::new(), |claim| {
            async move {
                assert_eq!(claim.messages().len(), 2);
                Err(NimbusError::Internal("handler failed".into()))
            }
            .boxed()
        })
        .await;

    assert_eq!(result.unwrap_err(), NimbusError::Internal("handler failed".into()));
}

#[tokio::test]
async fn acquisition_failure_creates_no_claim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = acquire_claim(port(&server), &demo(), &request(), &CancellationToken::new()).await;
    assert!(matches!(result, Err(NimbusError::Http { status: 503, .. })), "got {result:?}");
}

#[tokio::test]
async fn claim_without_location_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([claimed_message("m1", "c1")])),
        )
        .mount(&server)
        .await;

    let result = acquire_claim(port(&server), &demo(), &request(), &CancellationToken::new()).await;
    assert!(matches!(result, Err(NimbusError::Decode(_))), "got {result:?}");
}
