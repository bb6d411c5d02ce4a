//! Turning request failures and engine verdicts into HTTP responses.

use axum::Json;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::{Code, Message};
use crate::tuple::TupleParseError;

/// JSON body of every non-201 response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub summary: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Failures that stop a request before the engine is called.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Could not read request body")]
    BodyRead(#[source] axum::Error),
    #[error("Could not parse request body")]
    TupleParse(#[from] TupleParseError),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RequestError::TupleParse(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The underlying error, without the summary.
    pub fn cause(&self) -> String {
        match self {
            RequestError::BodyRead(e) => e.to_string(),
            RequestError::TupleParse(e) => e.to_string(),
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        erroneous_error(self.status(), &self.to_string(), &self.cause())
    }
}

/// A failure that never reached the engine: summary plus the underlying error.
pub fn erroneous_error(status: StatusCode, summary: &str, error: &str) -> Response {
    let body = ErrorBody {
        summary: summary.to_string(),
        error: error.to_string(),
        code: None,
        data: None,
    };
    (status, Json(body)).into_response()
}

/// A non-`Ok` engine verdict, surfaced whole for diagnosis.
pub fn erroneous_message(summary: &str, msg: &Message) -> Response {
    let body = ErrorBody {
        summary: summary.to_string(),
        error: msg.err.clone().unwrap_or_default(),
        code: Some(msg.code),
        data: Some(msg.data.clone()),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// 201 with `data` as the body, byte for byte.
pub fn created(data: String) -> Result<Response, axum::http::Error> {
    Response::builder()
        .status(StatusCode::CREATED)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(data))
}

/// Map an engine verdict to its response. Only `Ok` versus everything else matters.
pub fn translate(msg: Message) -> Response {
    if msg.code.is_ok() {
        return match created(msg.data) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to return response");
                StatusCode::CREATED.into_response()
            }
        };
    }

    tracing::error!(
        code = %msg.code,
        error = msg.err.as_deref().unwrap_or_default(),
        data = %msg.data,
        "State run code was invalid"
    );
    erroneous_message("State run code was invalid", &msg)
}
