//! Tests for the auth module

use super::authenticator::{sign_assertion, JwtClaims};
use super::*;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY: &str = include_str!("testdata/service_account_key.pem");
const PUBLIC_KEY: &str = include_str!("testdata/service_account_pub.pem");

fn service_account(token_uri: String) -> ServiceAccountKey {
    ServiceAccountKey {
        client_email: "exporter@project.iam.gserviceaccount.com".to_string(),
        private_key: PRIVATE_KEY.to_string(),
        private_key_id: Some("key-1".to_string()),
        token_uri,
    }
}

async fn mount_token_endpoint(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn authorization(auth: &Authenticator) -> String {
    let client = reqwest::Client::new();
    let req = auth
        .apply(client.get("https://example.com/api"))
        .await
        .unwrap();
    let built = req.build().unwrap();
    built
        .headers()
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();

    let req = auth.apply(client.get("https://example.com/api")).await.unwrap();
    let built = req.build().unwrap();
    assert!(built.headers().get("Authorization").is_none());
}

#[tokio::test]
async fn test_bearer_auth() {
    let auth = Authenticator::new(AuthConfig::Bearer {
        token: "my-bearer-token".to_string(),
    });

    assert_eq!(authorization(&auth).await, "Bearer my-bearer-token");
}

#[test]
fn test_signed_assertion_claims() {
    let key = service_account("https://oauth2.example.com/token".to_string());
    let jwt = sign_assertion(&key, &[CLOUD_PLATFORM_SCOPE.to_string()]).unwrap();

    let header = decode_header(&jwt).unwrap();
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("key-1"));

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["https://oauth2.example.com/token"]);
    let claims = decode::<JwtClaims>(
        &jwt,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(claims.iss, "exporter@project.iam.gserviceaccount.com");
    assert_eq!(claims.scope, CLOUD_PLATFORM_SCOPE);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[test]
fn test_invalid_private_key() {
    let mut key = service_account("https://oauth2.example.com/token".to_string());
    key.private_key = "not a key".to_string();

    let err = sign_assertion(&key, &[]).unwrap_err();
    assert!(err.to_string().contains("invalid private key"));
}

#[tokio::test]
async fn test_service_account_token_exchange() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "sa-token-123", 1).await;

    let auth = Authenticator::new(AuthConfig::service_account(service_account(format!(
        "{}/token",
        mock_server.uri()
    ))));

    assert_eq!(authorization(&auth).await, "Bearer sa-token-123");
}

#[tokio::test]
async fn test_service_account_token_caching() {
    let mock_server = MockServer::start().await;
    // Only called once, later requests use the cached token
    mount_token_endpoint(&mock_server, "cached-token", 1).await;

    let auth = Authenticator::new(AuthConfig::service_account(service_account(format!(
        "{}/token",
        mock_server.uri()
    ))));
    let shared = auth.clone();

    assert_eq!(authorization(&auth).await, "Bearer cached-token");
    assert_eq!(authorization(&auth).await, "Bearer cached-token");
    assert_eq!(authorization(&shared).await, "Bearer cached-token");
}

#[tokio::test]
async fn test_clear_cache() {
    let mock_server = MockServer::start().await;
    mount_token_endpoint(&mock_server, "token", 2).await;

    let auth = Authenticator::new(AuthConfig::service_account(service_account(format!(
        "{}/token",
        mock_server.uri()
    ))));

    authorization(&auth).await;
    auth.clear_cache().await;
    authorization(&auth).await;
}

#[tokio::test]
async fn test_token_exchange_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(AuthConfig::service_account(service_account(format!(
        "{}/token",
        mock_server.uri()
    ))));

    let client = reqwest::Client::new();
    let err = auth
        .apply(client.get("https://example.com/api"))
        .await
        .unwrap_err();

    assert!(matches!(err, crate::Error::Auth { .. }));
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("invalid_grant"));
}
