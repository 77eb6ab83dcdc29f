//! Route table
//!
//! Every request passes the per-IP rate limit first. API routes and static
//! files follow; whatever is left goes to `handlers::handle_rejection`.
//! Responses are gzip-compressed only for clients that accept it.

use crate::error::ApiRejection;
use crate::handlers::{self, SearchQuery};
use crate::state::AppState;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Complete application filter
pub fn routes(state: AppState) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
    let public = Arc::new(state.config().public_dir.clone());

    let inner = rate_limit(state.clone())
        .and(api(state.clone()).or(static_files(&state)).unify())
        .recover(move |err: Rejection| handlers::handle_rejection(err, Arc::clone(&public)))
        .map(into_response);

    accepts_gzip()
        .and(inner.clone())
        .with(warp::compression::gzip())
        .map(into_response)
        .or(inner)
        .unify()
}

/// JSON API and the HTML fragment
pub fn api(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let health = warp::path!("health")
        .and(with_state(state.clone()))
        .map(handlers::health)
        .map(into_response);

    let websites = warp::path!("api" / "websites")
        .and(with_state(state.clone()))
        .map(handlers::websites)
        .map(into_response);

    let search = warp::path!("api" / "websites" / "search")
        .and(warp::query::<SearchQuery>())
        .and(with_state(state.clone()))
        .map(handlers::search)
        .map(into_response);

    let categories = warp::path!("api" / "categories")
        .and(with_state(state.clone()))
        .map(handlers::categories)
        .map(into_response);

    let recommendation = warp::path!("api" / "recommendation")
        .and(with_state(state.clone()))
        .and_then(handlers::recommendation)
        .map(into_response);

    let fragment = warp::path!("fragments" / "directory")
        .and(warp::query::<SearchQuery>())
        .and(with_state(state))
        .map(handlers::fragment)
        .map(into_response);

    warp::get().and(
        health
            .or(websites)
            .unify()
            .or(search)
            .unify()
            .or(categories)
            .unify()
            .or(recommendation)
            .unify()
            .or(fragment)
            .unify(),
    )
}

/// `index.html` at the root, files from the public directory elsewhere
pub fn static_files(state: &AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let public = state.config().public_dir.clone();
    let cache = state.config().cache.clone();

    let index = warp::path::end().and(warp::fs::file(public.join("index.html")));
    let files = warp::fs::dir(public);

    warp::get()
        .and(index.or(files).unify())
        .map(move |file: warp::fs::File| {
            let max_age = cache.max_age_for(file.path());
            warp::reply::with_header(file, "cache-control", format!("public, max-age={max_age}"))
                .into_response()
        })
}

/// Pass when the client has a token left; reject with `RateLimited` otherwise
pub fn rate_limit(state: AppState) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::addr::remote()
        .and(with_state(state))
        .and_then(|addr: Option<SocketAddr>, state: AppState| async move {
            let key = addr.map_or_else(|| "unknown".to_string(), |a| a.ip().to_string());
            if state.limiter().allow(&key).await {
                Ok(())
            } else {
                Err(warp::reject::custom(ApiRejection::RateLimited))
            }
        })
        .untuple_one()
}

fn accepts_gzip() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("accept-encoding")
        .and_then(|encoding: Option<String>| async move {
            let gzip = encoding.is_some_and(|value| {
                value
                    .split(',')
                    .any(|part| part.trim().split(';').next() == Some("gzip"))
            });
            if gzip {
                Ok(())
            } else {
                Err(warp::reject::not_found())
            }
        })
        .untuple_one()
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn into_response<R: Reply>(reply: R) -> Response {
    reply.into_response()
}
