use keyhole_auth::config::PolicyKind;
use keyhole_auth::types::TokenRecord;
use keyhole_server::config::ClientSeed;
use keyhole_server::{AppConfig, AppState, build_app};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tokio::task::JoinHandle;

struct TestServer {
    base: String,
    state: AppState,
    shutdown: tokio::sync::oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    fn introspect_url(&self) -> String {
        format!("{}/oauth/introspect", self.base)
    }

    fn revoke_url(&self) -> String {
        format!("{}/oauth/revoke", self.base)
    }

    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

fn seed(client_id: &str, secret: &str) -> ClientSeed {
    ClientSeed {
        client_id: client_id.into(),
        client_secret: Some(secret.into()),
        name: None,
        active: true,
    }
}

fn config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.issuer = "https://auth.example.com".into();
    cfg.bootstrap.clients = vec![
        seed("client1", "secret1"),
        seed("client2", "secret2"),
        seed("orders-api", "orders-secret"),
    ];
    cfg
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

async fn start_server(cfg: AppConfig) -> TestServer {
    let state = AppState::from_config(&cfg).expect("app state");
    let app = build_app(&state);

    // Bind to an ephemeral port
    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        base: format!("http://{addr}"),
        state,
        shutdown: tx,
        handle,
    }
}

async fn introspect(
    client: &reqwest::Client,
    server: &TestServer,
    credentials: (&str, &str),
    params: &[(&str, &str)],
) -> (reqwest::StatusCode, Value) {
    let resp = client
        .post(server.introspect_url())
        .basic_auth(credentials.0, Some(credentials.1))
        .form(params)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn active_token_then_revoked() {
    let server = start_server(config()).await;
    let exp = now() + 3600;
    server.state.tokens.insert(
        "abc123",
        TokenRecord::access_token()
            .with_scope("read write")
            .with_client_id("client1")
            .with_exp(exp),
    );
    let client = reqwest::Client::new();

    let (status, body) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "active": true,
            "scope": "read write",
            "client_id": "client1",
            "exp": exp
        })
    );

    let resp = client
        .post(server.revoke_url())
        .basic_auth("client1", Some("secret1"))
        .form(&[("token", "abc123"), ("token_type_hint", "access_token")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let (status, body) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, json!({ "active": false }));

    server.stop().await;
}

#[tokio::test]
async fn expired_and_unknown_tokens_are_inactive() {
    let server = start_server(config()).await;
    server.state.tokens.insert(
        "old",
        TokenRecord::access_token()
            .with_client_id("client1")
            .with_sub("user-1")
            .with_exp(now() - 60),
    );
    let client = reqwest::Client::new();

    for token in ["old", "never-issued"] {
        let (status, body) =
            introspect(&client, &server, ("client1", "secret1"), &[("token", token)]).await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body, json!({ "active": false }));
    }

    server.stop().await;
}

#[tokio::test]
async fn same_client_policy_hides_foreign_tokens() {
    let mut cfg = config();
    cfg.auth.introspection.policy = PolicyKind::SameClient;
    let server = start_server(cfg).await;
    server.state.tokens.insert(
        "abc123",
        TokenRecord::access_token()
            .with_client_id("client1")
            .with_exp(now() + 3600),
    );
    let client = reqwest::Client::new();

    let (_, foreign) =
        introspect(&client, &server, ("client2", "secret2"), &[("token", "abc123")]).await;
    assert_eq!(foreign, json!({ "active": false }));

    let (_, own) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    assert_eq!(own["active"], true);

    server.stop().await;
}

#[tokio::test]
async fn audience_policy_admits_resource_server() {
    let mut cfg = config();
    cfg.auth.introspection.policy = PolicyKind::SameClientOrAudience;
    let server = start_server(cfg).await;
    server.state.tokens.insert(
        "abc123",
        TokenRecord::access_token()
            .with_client_id("client1")
            .with_aud(vec!["orders-api".into()]),
    );
    let client = reqwest::Client::new();

    let (_, body) = introspect(
        &client,
        &server,
        ("orders-api", "orders-secret"),
        &[("token", "abc123")],
    )
    .await;
    assert_eq!(body["active"], true);
    assert_eq!(body["aud"], json!(["orders-api"]));

    let (_, body) =
        introspect(&client, &server, ("client2", "secret2"), &[("token", "abc123")]).await;
    assert_eq!(body, json!({ "active": false }));

    server.stop().await;
}

#[tokio::test]
async fn missing_token_is_invalid_request() {
    let server = start_server(config()).await;
    let client = reqwest::Client::new();

    // Valid credentials, no token
    let (status, body) = introspect(
        &client,
        &server,
        ("client1", "secret1"),
        &[("token_type_hint", "access_token")],
    )
    .await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    // Bad credentials, empty token: still a 400
    let (status, body) =
        introspect(&client, &server, ("client1", "wrong"), &[("token", "")]).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    server.stop().await;
}

#[tokio::test]
async fn repeated_introspection_is_stable() {
    let server = start_server(config()).await;
    server.state.tokens.insert(
        "abc123",
        TokenRecord::access_token()
            .with_client_id("client1")
            .with_exp(now() + 3600),
    );
    let client = reqwest::Client::new();

    let (_, first) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    let (_, second) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    assert_eq!(first, second);

    server.stop().await;
}

#[tokio::test]
async fn client_authentication_failures() {
    let server = start_server(config()).await;
    server
        .state
        .tokens
        .insert("abc123", TokenRecord::access_token().with_client_id("client1"));
    let client = reqwest::Client::new();

    // Wrong secret
    let resp = client
        .post(server.introspect_url())
        .basic_auth("client1", Some("wrong"))
        .form(&[("token", "abc123")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers()["www-authenticate"],
        r#"Basic realm="keyhole""#
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_client");

    // No credentials at all
    let resp = client
        .post(server.introspect_url())
        .form(&[("token", "abc123")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Public client id without secret while public clients are disabled
    let resp = client
        .post(server.introspect_url())
        .form(&[("token", "abc123"), ("client_id", "client1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Basic and body secret together
    let resp = client
        .post(server.introspect_url())
        .basic_auth("client1", Some("secret1"))
        .form(&[("token", "abc123"), ("client_secret", "secret1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // Undecodable Basic header on its own
    let resp = client
        .post(server.introspect_url())
        .header("authorization", "Basic !!!not-base64!!!")
        .form(&[("token", "abc123")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_client");

    // Undecodable Basic header next to valid body credentials
    let resp = client
        .post(server.introspect_url())
        .header("authorization", "Basic !!!not-base64!!!")
        .form(&[
            ("token", "abc123"),
            ("client_id", "client1"),
            ("client_secret", "secret1"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_request");
    assert!(body.get("active").is_none());

    server.stop().await;
}

#[tokio::test]
async fn client_secret_post_is_accepted() {
    let server = start_server(config()).await;
    server
        .state
        .tokens
        .insert("abc123", TokenRecord::access_token().with_client_id("client1"));
    let client = reqwest::Client::new();

    let resp = client
        .post(server.introspect_url())
        .form(&[
            ("token", "abc123"),
            ("client_id", "client2"),
            ("client_secret", "secret2"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["active"], true);

    server.stop().await;
}

#[tokio::test]
async fn responses_are_not_cacheable() {
    let server = start_server(config()).await;
    let client = reqwest::Client::new();

    for creds in [("client1", "secret1"), ("client1", "wrong")] {
        let resp = client
            .post(server.introspect_url())
            .basic_auth(creds.0, Some(creds.1))
            .form(&[("token", "abc123")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.headers()["cache-control"], "no-store");
        assert_eq!(resp.headers()["pragma"], "no-cache");
    }

    server.stop().await;
}

#[tokio::test]
async fn wrong_hint_still_finds_token() {
    let server = start_server(config()).await;
    server.state.tokens.insert(
        "rt-1",
        TokenRecord::refresh_token()
            .with_client_id("client1")
            .with_exp(now() + 3600),
    );
    let client = reqwest::Client::new();

    for hint in ["access_token", "refresh_token", "id_token"] {
        let (status, body) = introspect(
            &client,
            &server,
            ("client1", "secret1"),
            &[("token", "rt-1"), ("token_type_hint", hint)],
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["active"], true, "hint {hint}");
    }

    server.stop().await;
}

#[tokio::test]
async fn strict_hint_rejects_unknown_values() {
    let mut cfg = config();
    cfg.auth.introspection.strict_token_type_hint = true;
    let server = start_server(cfg).await;
    let client = reqwest::Client::new();

    let (status, body) = introspect(
        &client,
        &server,
        ("client1", "secret1"),
        &[("token", "abc123"), ("token_type_hint", "id_token")],
    )
    .await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_token_type");

    server.stop().await;
}

#[tokio::test]
async fn extension_claims_when_enabled() {
    let mut cfg = config();
    cfg.auth.introspection.include_extension_claims = true;
    let server = start_server(cfg).await;
    server.state.tokens.insert(
        "abc123",
        TokenRecord::access_token()
            .with_client_id("client1")
            .with_extension("tenant", "acme")
            .with_extension("active", false),
    );
    let client = reqwest::Client::new();

    let (_, body) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    assert_eq!(body["active"], true);
    assert_eq!(body["tenant"], "acme");

    server.stop().await;
}

#[tokio::test]
async fn revocation_rules() {
    let server = start_server(config()).await;
    server.state.tokens.insert(
        "abc123",
        TokenRecord::access_token()
            .with_client_id("client1")
            .with_exp(now() + 3600),
    );
    let client = reqwest::Client::new();

    // Another client cannot revoke, but still gets 200
    let resp = client
        .post(server.revoke_url())
        .basic_auth("client2", Some("secret2"))
        .form(&[("token", "abc123")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.headers()["cache-control"], "no-store");

    let (_, body) =
        introspect(&client, &server, ("client1", "secret1"), &[("token", "abc123")]).await;
    assert_eq!(body["active"], true);

    // Unknown tokens revoke successfully
    let resp = client
        .post(server.revoke_url())
        .basic_auth("client1", Some("secret1"))
        .form(&[("token", "never-issued")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    // Missing token and bad credentials
    let resp = client
        .post(server.revoke_url())
        .basic_auth("client1", Some("secret1"))
        .form(&[("token_type_hint", "access_token")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let resp = client
        .post(server.revoke_url())
        .basic_auth("client1", Some("wrong"))
        .form(&[("token", "abc123")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    server.stop().await;
}

#[tokio::test]
async fn non_form_body_is_invalid_request() {
    let server = start_server(config()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(server.introspect_url())
        .basic_auth("client1", Some("secret1"))
        .json(&json!({ "token": "abc123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "invalid_request");

    server.stop().await;
}

#[tokio::test]
async fn metadata_and_health_endpoints() {
    let server = start_server(config()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!(
            "{}/.well-known/oauth-authorization-server",
            server.base
        ))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["issuer"], "https://auth.example.com");
    assert_eq!(
        body["introspection_endpoint"],
        "https://auth.example.com/oauth/introspect"
    );
    assert_eq!(
        body["revocation_endpoint"],
        "https://auth.example.com/oauth/revoke"
    );
    assert_eq!(
        body["introspection_endpoint_auth_methods_supported"],
        json!(["client_secret_basic", "client_secret_post"])
    );

    let resp = client
        .get(format!("{}/healthz", server.base))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    server.stop().await;
}
