use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use keyhole_auth::http::{INTROSPECTION_PATH, METADATA_PATH, REVOCATION_PATH};
use keyhole_auth::{
    ClientAuthenticator, DiscoveryState, IntrospectionState, StorageClientAuthenticator,
    TokenService, TokenStore, authorization_server_metadata_handler, introspect_handler,
    policy_for, revoke_handler,
};
use keyhole_db_memory::{InMemoryClientStorage, InMemoryTokenStore};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    bootstrap::{self, BootstrapError},
    config::AppConfig,
    handlers,
    middleware::{self as app_middleware, RequestId},
};

/// Shared stores and services behind the router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clients: Arc<InMemoryClientStorage>,
    pub tokens: Arc<InMemoryTokenStore>,
    pub token_service: Arc<TokenService>,
    pub authenticator: Arc<dyn ClientAuthenticator>,
}

impl AppState {
    /// Wires stores and services from configuration and seeds bootstrap data.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, BootstrapError> {
        let introspection = &cfg.auth.introspection;

        let clients = Arc::new(InMemoryClientStorage::new());
        let tokens =
            Arc::new(InMemoryTokenStore::new().with_grace_period(introspection.expiry_leeway));
        bootstrap::seed_all(&cfg.bootstrap, &clients, &tokens)?;

        let token_service = Arc::new(
            TokenService::new(
                tokens.clone(),
                policy_for(introspection.policy),
                introspection.clone(),
            )
            .with_audit(cfg.auth.audit.clone()),
        );
        let authenticator: Arc<dyn ClientAuthenticator> = Arc::new(
            StorageClientAuthenticator::new(clients.clone())
                .with_public_clients(introspection.allow_public_clients),
        );

        tracing::info!(
            issuer = %cfg.auth.issuer,
            policy = %introspection.policy,
            public_clients = introspection.allow_public_clients,
            strict_hint = introspection.strict_token_type_hint,
            "Introspection configured"
        );

        Ok(Self {
            config: Arc::new(cfg.clone()),
            clients,
            tokens,
            token_service,
            authenticator,
        })
    }
}

pub struct KeyholeServer {
    addr: SocketAddr,
    app: Router,
    tokens: Arc<InMemoryTokenStore>,
    cleanup_interval: Duration,
}

pub fn build_app(state: &AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let oauth = Router::new()
        .route(INTROSPECTION_PATH, post(introspect_handler))
        .route(REVOCATION_PATH, post(revoke_handler))
        .with_state(IntrospectionState::new(
            state.token_service.clone(),
            state.authenticator.clone(),
        ));

    let discovery = Router::new()
        .route(METADATA_PATH, get(authorization_server_metadata_handler))
        .with_state(DiscoveryState::new(
            &state.config.auth,
            state.authenticator.supported_methods(),
        ));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(oauth)
        .merge(discovery)
        // Middleware stack (innermost first: body limit -> compression -> trace -> request id)
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<RequestId>()
                        .and_then(|id| id.0.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> Result<KeyholeServer, BootstrapError> {
        let state = AppState::from_config(&self.config)?;
        let app = build_app(&state);

        Ok(KeyholeServer {
            addr: self.addr,
            app,
            tokens: state.tokens,
            cleanup_interval: self.config.server.cleanup_interval,
        })
    }
}

impl KeyholeServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let cleanup = spawn_cleanup(self.tokens.clone(), self.cleanup_interval);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        if let Some(task) = cleanup {
            task.abort();
        }
        served?;
        Ok(())
    }
}

/// Periodically purges expired token records. Returns `None` when disabled.
pub fn spawn_cleanup(
    tokens: Arc<InMemoryTokenStore>,
    every: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if every.is_zero() {
        tracing::info!("Expired token cleanup disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match tokens.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Expired token records purged"),
                Err(e) => tracing::warn!(error = %e, "Expired token cleanup failed"),
            }
        }
    }))
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::from_config(&AppConfig::default()).unwrap();
        build_app(&state)
    }

    #[tokio::test]
    async fn healthz_reports_ok_with_request_id() {
        let res = app()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn incoming_request_id_is_preserved() {
        let res = app()
            .oneshot(
                Request::get("/healthz")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn cleanup_can_be_disabled() {
        let tokens = Arc::new(InMemoryTokenStore::new());
        assert!(spawn_cleanup(tokens, Duration::ZERO).is_none());
    }
}
