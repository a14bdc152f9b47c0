use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::cache::Clock;
use super::domain::Person;
use super::service::AccessReviewService;
use super::upstream::PageSource;

/// Rejections raised before the review runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewRequestError {
    #[error("Requests require authorization")]
    Unauthorized,
    #[error("Expected `count` to be set in the querystring with a positive integer")]
    InvalidCount,
    #[error("Expected a JSON payload in the request body")]
    InvalidJson,
    #[error("Expected `people` in request body to be an array")]
    PeopleNotArray,
    #[error("Expected every entry in `people` to have string `email` and `username` fields")]
    InvalidPerson,
}

impl ReviewRequestError {
    fn status(&self) -> StatusCode {
        match self {
            ReviewRequestError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ReviewRequestError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (self.status(), axum::Json(payload)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewQuery {
    pub(crate) count: Option<String>,
}

/// Router builder exposing the access review endpoint.
pub fn access_router<S, C>(service: Arc<AccessReviewService<S, C>>) -> Router
where
    S: PageSource + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/access/decisions", post(decisions_handler::<S, C>))
        .with_state(service)
}

pub(crate) fn parse_count(raw: Option<&str>) -> Result<NonZeroUsize, ReviewRequestError> {
    raw.and_then(|value| value.trim().parse::<NonZeroUsize>().ok())
        .ok_or(ReviewRequestError::InvalidCount)
}

pub(crate) fn parse_people(body: &[u8]) -> Result<Vec<Person>, ReviewRequestError> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| ReviewRequestError::InvalidJson)?;

    let people = payload
        .get("people")
        .filter(|people| people.is_array())
        .cloned()
        .ok_or(ReviewRequestError::PeopleNotArray)?;

    serde_json::from_value(people).map_err(|_| ReviewRequestError::InvalidPerson)
}

pub(crate) async fn decisions_handler<S, C>(
    State(service): State<Arc<AccessReviewService<S, C>>>,
    Query(query): Query<ReviewQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: PageSource + 'static,
    C: Clock + 'static,
{
    if !service.authorize(&headers) {
        return ReviewRequestError::Unauthorized.into_response();
    }

    let threshold = match parse_count(query.count.as_deref()) {
        Ok(threshold) => threshold,
        Err(error) => return error.into_response(),
    };

    let people = match parse_people(&body) {
        Ok(people) => people,
        Err(error) => return error.into_response(),
    };

    match service.review(threshold, &people).await {
        Ok(decisions) => (StatusCode::OK, axum::Json(decisions)).into_response(),
        Err(other) => {
            warn!(error = %other, "access review aborted");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
