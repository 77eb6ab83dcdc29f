//! Request handlers and the rejection recovery

use crate::error::ApiRejection;
use crate::state::AppState;
use koo_core::api::{ApiResponse, ErrorResponse, HealthResponse, RecommendationResponse};
use koo_core::recommend::date_key;
use serde::Deserialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

/// Message for every unexpected failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// Message for clients over their request budget
pub const RATE_LIMIT_MESSAGE: &str = "Demasiadas solicitudes desde esta IP, intenta de nuevo más tarde.";

/// `?q=` query string
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

impl SearchQuery {
    fn term(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }
}

pub fn health(state: AppState) -> impl Reply {
    warp::reply::json(&HealthResponse::ok(state.uptime()))
}

pub fn websites(state: AppState) -> impl Reply {
    warp::reply::json(&ApiResponse::ok(state.records()))
}

pub fn search(query: SearchQuery, state: AppState) -> impl Reply {
    let term = query.term();
    let records = state.search(term);
    tracing::debug!("Search {:?} matched {} records", term, records.len());
    warp::reply::json(&ApiResponse::ok(records).with_query(term))
}

pub fn categories(state: AppState) -> impl Reply {
    warp::reply::json(&ApiResponse::ok(state.categories()))
}

/// Today's pick; `data` is null with a message when nothing is eligible
pub async fn recommendation(state: AppState) -> Result<impl Reply, Rejection> {
    let (today, pick) = state.recommendation().map_err(|e| {
        tracing::error!("Recommendation failed: {}", e);
        warp::reject::custom(ApiRejection::from(e))
    })?;
    let message = pick
        .is_none()
        .then(|| state.config().site.messages.no_recommendation.clone());
    Ok(warp::reply::json(&RecommendationResponse {
        success: true,
        data: pick,
        date: date_key(today),
        message,
    }))
}

/// Cards markup for a term, for pages that swap the list in place
pub fn fragment(query: SearchQuery, state: AppState) -> impl Reply {
    warp::reply::html(state.directory_fragment(query.term()))
}

/// Turn any rejection into a response
///
/// Unmatched paths get the site's `404.html`, or a JSON body if that page
/// is missing.
pub async fn handle_rejection(err: Rejection, public_dir: Arc<PathBuf>) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(not_found(&public_dir).await);
    }

    if let Some(rejection) = err.find::<ApiRejection>() {
        return Ok(match rejection {
            ApiRejection::RateLimited => {
                json_error(RATE_LIMIT_MESSAGE, StatusCode::TOO_MANY_REQUESTS)
            }
            ApiRejection::Recommendation(_) => {
                json_error(INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR)
            }
        });
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(json_error("Método no permitido", StatusCode::METHOD_NOT_ALLOWED));
    }

    if err.find::<warp::reject::InvalidQuery>().is_some() {
        return Ok(json_error("Parámetros de consulta inválidos", StatusCode::BAD_REQUEST));
    }

    tracing::error!("Unhandled rejection: {:?}", err);
    Ok(json_error(INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR))
}

async fn not_found(public_dir: &std::path::Path) -> Response {
    let page = public_dir.join("404.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => warp::reply::with_status(warp::reply::html(html), StatusCode::NOT_FOUND).into_response(),
        Err(e) => {
            tracing::debug!("No 404 page at {}: {}", page.display(), e);
            json_error("Recurso no encontrado", StatusCode::NOT_FOUND)
        }
    }
}

fn json_error(message: &str, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_is_empty_term() {
        assert_eq!(SearchQuery::default().term(), "");
        let query = SearchQuery {
            q: Some("aly".into()),
        };
        assert_eq!(query.term(), "aly");
    }

    #[tokio::test]
    async fn not_found_without_page_is_json() {
        let dir = Arc::new(PathBuf::from("/nonexistent-koopages-public"));
        let response = handle_rejection(warp::reject::not_found(), dir).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rate_limited_is_429() {
        let dir = Arc::new(PathBuf::new());
        let response = handle_rejection(warp::reject::custom(ApiRejection::RateLimited), dir)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
