#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use tower::ServiceExt;

use compute_pricelist_histories::engine::Engine;
use compute_pricelist_histories::identity::ProcessIdentity;
use compute_pricelist_histories::server::{AppState, router};

pub fn identity() -> ProcessIdentity {
    ProcessIdentity {
        project_id: "test-project".to_string(),
        service_name: "fn-compute-pricelist-histories".to_string(),
    }
}

pub fn app(engine: Arc<dyn Engine>) -> Router {
    router(AppState::new(identity(), engine))
}

pub fn post(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .body(body.into())
        .unwrap()
}

/// Send one request through the router; returns status and body text.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// A stand-in metadata service on a random local port. Returns its `host:port`.
pub async fn spawn_metadata(project_id: &'static str) -> String {
    let app = Router::new().route(
        "/computeMetadata/v1/project/project-id",
        get(move |headers: HeaderMap| async move {
            let flavor = headers
                .get("Metadata-Flavor")
                .and_then(|v| v.to_str().ok());
            if flavor == Some("Google") {
                project_id.into_response()
            } else {
                StatusCode::FORBIDDEN.into_response()
            }
        }),
    );
    spawn(app).await
}

/// A metadata service that always answers with `status`.
pub async fn spawn_broken_metadata(status: StatusCode) -> String {
    let app = Router::new().fallback(move || async move { status });
    spawn(app).await
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}
