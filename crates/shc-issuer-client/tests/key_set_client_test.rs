//! IssuerKeyClient against a wiremock issuer serving `.well-known/jwks.json`.

use shc_core::{IssuerUrl, Timestamp};
use shc_crypto::{CryptoError, Es256SigningKey, JwkSet};
use shc_issuer_client::{IssuerClientConfig, IssuerClientError, IssuerKeyClient};
use shc_vc::{CardIssuer, FhirBundle, HealthCard, VcError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JWKS_PATH: &str = "/issuer/.well-known/jwks.json";

fn test_client(cache_ttl_secs: u64) -> IssuerKeyClient {
    retrying_client(cache_ttl_secs, 0)
}

fn retrying_client(cache_ttl_secs: u64, max_retries: u32) -> IssuerKeyClient {
    IssuerKeyClient::new(&IssuerClientConfig {
        timeout_secs: 5,
        cache_ttl_secs,
        user_agent: "shc-test".into(),
        max_retries,
        retry_delay_ms: 1,
    })
    .unwrap()
}

fn issuer_url(mock_server: &MockServer) -> IssuerUrl {
    IssuerUrl::new(format!("{}/issuer", mock_server.uri())).unwrap()
}

fn bundle() -> FhirBundle {
    serde_json::from_value(serde_json::json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": [
            {"fullUrl": "resource:0", "resource": {
                "resourceType": "Patient",
                "name": [{"family": "Anyperson", "given": ["Jane", "C."]}],
                "birthDate": "1961-01-20"
            }},
            {"fullUrl": "resource:1", "resource": {
                "resourceType": "Immunization",
                "status": "completed",
                "vaccineCode": {"coding": [{"system": "http://hl7.org/fhir/sid/cvx", "code": "207"}]},
                "patient": {"reference": "resource:0"},
                "occurrenceDateTime": "2021-01-01",
                "performer": [{"actor": {"display": "ABC General Hospital"}}]
            }}
        ]
    }))
    .unwrap()
}

fn issue_card(issuer: &CardIssuer) -> HealthCard {
    issuer
        .issue(&issuer.payload(bundle(), Timestamp::now()))
        .unwrap()
}

async fn mount_key_set(mock_server: &MockServer, keys: &JwkSet, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(keys))
        .expect(expected_calls)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn fetch_key_set_reads_well_known_path() {
    let mock_server = MockServer::start().await;
    let issuer = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    let published = issuer.key_set().unwrap();
    mount_key_set(&mock_server, &published, 1).await;

    let keys = test_client(300)
        .fetch_key_set(&issuer_url(&mock_server))
        .await
        .unwrap();
    assert_eq!(keys, published);
}

#[tokio::test]
async fn fetch_key_set_is_cached_per_issuer() {
    let mock_server = MockServer::start().await;
    let issuer = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    mount_key_set(&mock_server, &issuer.key_set().unwrap(), 1).await;

    let client = test_client(300);
    let iss = issuer_url(&mock_server);
    client.fetch_key_set(&iss).await.unwrap();
    client.clone().fetch_key_set(&iss).await.unwrap();
}

#[tokio::test]
async fn zero_ttl_disables_cache() {
    let mock_server = MockServer::start().await;
    let issuer = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    mount_key_set(&mock_server, &issuer.key_set().unwrap(), 2).await;

    let client = test_client(0);
    let iss = issuer_url(&mock_server);
    client.fetch_key_set(&iss).await.unwrap();
    client.fetch_key_set(&iss).await.unwrap();
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let mock_server = MockServer::start().await;
    let issuer = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    mount_key_set(&mock_server, &issuer.key_set().unwrap(), 2).await;

    let client = test_client(300);
    let iss = issuer_url(&mock_server);
    client.fetch_key_set(&iss).await.unwrap();
    client.clear_cache();
    client.fetch_key_set(&iss).await.unwrap();
}

#[tokio::test]
async fn fetch_key_set_reports_http_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(300)
        .fetch_key_set(&issuer_url(&mock_server))
        .await
        .unwrap_err();
    match err {
        IssuerClientError::ApiError { url, status, body } => {
            assert!(url.ends_with(JWKS_PATH));
            assert_eq!(status, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_key_set_rejects_non_jwks_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"kty": "EC"})))
        .mount(&mock_server)
        .await;

    let err = test_client(300)
        .fetch_key_set(&issuer_url(&mock_server))
        .await
        .unwrap_err();
    assert!(matches!(err, IssuerClientError::InvalidKeySet { .. }));
}

#[tokio::test]
async fn transient_status_is_retried() {
    let mock_server = MockServer::start().await;
    let keys = JwkSet {
        keys: vec![Es256SigningKey::generate().verifying_key().to_jwk().unwrap()],
    };
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_key_set(&mock_server, &keys, 1).await;

    let fetched = retrying_client(300, 3)
        .fetch_key_set(&issuer_url(&mock_server))
        .await
        .unwrap();
    assert_eq!(fetched, keys);
}

#[tokio::test]
async fn transient_status_after_last_retry_is_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;

    let err = retrying_client(300, 2)
        .fetch_key_set(&issuer_url(&mock_server))
        .await
        .unwrap_err();
    assert!(matches!(err, IssuerClientError::ApiError { status: 502, .. }));
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = retrying_client(300, 3)
        .fetch_key_set(&issuer_url(&mock_server))
        .await
        .unwrap_err();
    assert!(matches!(err, IssuerClientError::ApiError { status: 404, .. }));
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(300);
    let iss = issuer_url(&mock_server);
    assert!(client.fetch_key_set(&iss).await.is_err());
    assert!(client.fetch_key_set(&iss).await.is_err());
}

#[tokio::test]
async fn verify_card_accepts_card_from_published_issuer() {
    let mock_server = MockServer::start().await;
    let issuer = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    mount_key_set(&mock_server, &issuer.key_set().unwrap(), 1).await;

    let card = issue_card(&issuer);
    let client = test_client(300);
    client.verify_card(&card).await.unwrap();
    assert!(client.check_card(&card).await.is_valid());
}

#[tokio::test]
async fn verify_card_rejects_card_signed_by_unpublished_key() {
    let mock_server = MockServer::start().await;
    let published = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    mount_key_set(&mock_server, &published.key_set().unwrap(), 1).await;

    let impostor = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    let err = test_client(300)
        .verify_card(&issue_card(&impostor))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IssuerClientError::Vc(VcError::Crypto(CryptoError::KeyNotFound(_)))
    ));
}

#[tokio::test]
async fn check_card_folds_network_errors_into_invalid() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let issuer = CardIssuer::new(issuer_url(&mock_server), Es256SigningKey::generate());
    let outcome = test_client(300).check_card(&issue_card(&issuer)).await;
    assert!(!outcome.is_valid());
}
