use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ghtoken::github::{ApiError, AuthorizationRequest, BasicCredentials, GithubApi, GithubClient};

fn request() -> AuthorizationRequest {
    AuthorizationRequest {
        scopes: vec!["repo".to_string()],
        note: "temporary token".to_string(),
    }
}

#[test]
fn test_rejects_plain_http_for_remote_hosts() {
    assert!(GithubClient::new("http://api.github.com").is_err());
    assert!(GithubClient::new("https://api.github.com").is_ok());
    assert!(GithubClient::new("http://127.0.0.1:8080").is_ok());
}

#[tokio::test]
async fn test_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "alice", "id": 1})))
        .mount(&server)
        .await;

    let client = GithubClient::new(&server.uri()).unwrap();
    let identity = client.current_user("abc").await.unwrap();
    assert_eq!(identity.login, "alice");
}

#[tokio::test]
async fn test_current_user_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let client = GithubClient::new(&server.uri()).unwrap();
    let err = client.current_user("abc").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(err.message(), "Bad credentials");
}

#[tokio::test]
async fn test_create_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorizations"))
        .and(basic_auth("bob", "secret"))
        .and(body_json(json!({"scopes": ["repo"], "note": "temporary token"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "token": "T",
            "_links": {"self": {"href": "/authorizations/1"}},
        })))
        .mount(&server)
        .await;

    let client = GithubClient::new(&server.uri()).unwrap();
    let authorization = client
        .create_authorization(&BasicCredentials::new("bob", "secret"), &request())
        .await
        .unwrap();
    assert_eq!(authorization.token, "T");
    assert_eq!(authorization.href(), "/authorizations/1");
}

#[tokio::test]
async fn test_create_authorization_otp_challenge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorizations"))
        .and(header("x-github-otp", "123456"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "T",
            "_links": {"self": {"href": "/authorizations/2"}},
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/authorizations"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("X-GitHub-OTP", "required; app")
                .set_body_json(json!({"message": "Must specify two-factor authentication OTP code."})),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    let client = GithubClient::new(&server.uri()).unwrap();
    let credentials = BasicCredentials::new("bob", "secret");

    let err = client
        .create_authorization(&credentials, &request())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::OtpRequired));

    let authorization = client
        .create_authorization(&credentials.with_otp("123456".to_string()), &request())
        .await
        .unwrap();
    assert_eq!(authorization.href(), "/authorizations/2");
}

#[tokio::test]
async fn test_unauthorized_without_otp_header_is_plain_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorizations"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let client = GithubClient::new(&server.uri()).unwrap();
    let err = client
        .create_authorization(&BasicCredentials::new("bob", "wrong"), &request())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_delete_authorization_relative_and_absolute() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/authorizations/1"))
        .and(basic_auth("bob", "secret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let client = GithubClient::new(&server.uri()).unwrap();
    let credentials = BasicCredentials::new("bob", "secret");
    client
        .delete_authorization(&credentials, "/authorizations/1")
        .await
        .unwrap();
    client
        .delete_authorization(&credentials, &format!("{}/authorizations/1", server.uri()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_manual_login_end_to_end_revokes_once() {
    use ghtoken::resolve::{Capabilities, Resolver, ResolverConfig};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorizations"))
        .and(basic_auth("bob", "secret"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "T",
            "_links": {"self": {"href": "/auth/1"}},
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "bob"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/auth/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = ResolverConfig {
        api_url: server.uri(),
        netrc_path: "/nonexistent/ghtoken-test/netrc".to_string(),
        hub_path: "/nonexistent/ghtoken-test/hub".to_string(),
        ..ResolverConfig::default()
    };
    let caps = Capabilities::default()
        .ask_login(|| Ok("bob".to_string()))
        .ask_password(|_| Ok("secret".to_string()));
    let client = GithubClient::new(&server.uri()).unwrap();
    let mut resolver = Resolver::new(config, client, caps);

    let token = resolver
        .with_token(async |token| token.token.as_str().to_string())
        .await
        .unwrap();
    assert_eq!(token.as_deref(), Some("T"));
}
