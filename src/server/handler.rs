use axum::body::Body;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use super::AppState;
use super::response::{RequestError, translate};
use crate::engine::Engine;
use crate::tuple::RegionRealmTimestampTuple;

/// `POST /`: compute pricelist histories for the tuple in the body.
pub async fn compute_pricelist_histories(State(state): State<AppState>, body: Body) -> Response {
    let span = state.identity.request_span();
    handle(state.engine.as_ref(), body).instrument(span).await
}

/// One request: read, parse, run once, translate.
pub async fn handle(engine: &dyn Engine, body: Body) -> Response {
    tracing::info!("Received request");

    let tuple = match read_tuple(body).await {
        Ok(tuple) => tuple,
        Err(e) => {
            tracing::error!(error = %e.cause(), "{e}");
            return e.into_response();
        }
    };

    let response = translate(engine.run(tuple).await);

    tracing::info!("Sent response");
    response
}

/// Read the whole body and parse it. Never touches the engine.
pub async fn read_tuple(body: Body) -> Result<RegionRealmTimestampTuple, RequestError> {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(RequestError::BodyRead)?;
    Ok(RegionRealmTimestampTuple::parse_bytes(&bytes)?)
}
