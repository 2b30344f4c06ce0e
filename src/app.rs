use std::net::SocketAddr;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, config::AppConfig, ledger, state::AppState};

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .route("/", get(root))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router(&state.config.features))
        .merge(ledger::router())
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn root() -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({ "message": "Hello, World!" })))
}

/// Explicit origins get credentialed CORS; no origins means permissive.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use axum_test::TestServer;

    #[tokio::test]
    async fn root_and_health() {
        let server = TestServer::new(build_app(AppState::fake())).unwrap();

        let res = server.get("/").await;
        res.assert_status(StatusCode::CREATED);
        assert_eq!(res.json::<Value>()["message"], "Hello, World!");

        server.get("/health").await.assert_text("ok");
    }

    #[tokio::test]
    async fn full_flow_through_the_app() {
        let server = TestServer::new(build_app(AppState::fake_with(FeatureFlags::default())))
            .unwrap();

        server
            .post("/signup")
            .json(&json!({"email": "a@x.com", "password": "p1", "name": "A"}))
            .await
            .assert_status_ok();
        let login = server
            .post("/auth")
            .json(&json!({"email": "a@x.com", "password": "p1", "timeToken": "1h"}))
            .await
            .json::<Value>();
        let token = login["user"]["token"].as_str().unwrap().to_string();
        let user_id = login["user"]["id"].as_i64().unwrap();

        server
            .post("/createTransaction")
            .authorization_bearer(&token)
            .json(&json!({"user_id": user_id, "category_id": 1, "description": "pay", "amount": "100.00"}))
            .await
            .assert_status_ok();

        let saldo = server
            .get("/calculaSaldo")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(saldo["saldo"], "100.00");
    }

    #[test]
    fn cors_with_origins_builds() {
        let mut config = AppState::fake().config.as_ref().clone();
        config.allowed_origins = vec!["http://localhost:3000".into(), "bad\norigin".into()];
        let _ = cors_layer(&config);
    }
}
