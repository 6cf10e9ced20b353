use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;

use warp::filters::BoxedFilter;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use super::form::{read_form, SessionForm, MAX_FORM_BYTES};
use super::handlers::{self, redirect, AppState};
use super::types::ListQuery;
use crate::error_handling::types::FormError;
use crate::image_storage::{ImageStore, IMAGE_CACHE_CONTROL};

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Multipart body decoded into a session form. Decoding failures are passed
/// on to the handler so it can answer with a 400.
fn session_form() -> impl Filter<Extract = (Result<SessionForm, FormError>,), Error = Rejection> + Clone {
    warp::multipart::form().max_length(MAX_FORM_BYTES).then(read_form)
}

/// GET / -> /sessions
pub fn root_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .map(|| redirect("/sessions"))
}

/// GET /sessions[?createdBy=<id>]
pub fn list_sessions_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("sessions")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(with_state(state))
        .and_then(handlers::list_sessions)
}

/// GET /sessions/:id
pub fn get_session_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("sessions" / i64)
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::get_session)
}

/// POST /sessions
pub fn create_session_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("sessions")
        .and(warp::path::end())
        .and(warp::post())
        .and(session_form())
        .and(with_state(state))
        .and_then(handlers::create_session)
}

/// POST|PUT /sessions/:id
pub fn update_session_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("sessions" / i64)
        .and(warp::post().or(warp::put()).unify())
        .and(session_form())
        .and(with_state(state))
        .and_then(handlers::update_session)
}

/// The `<id>:delete` path segment. Any other segment fails to parse, so the
/// delete route never claims paths that belong to other routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTarget(pub i64);

impl FromStr for DeleteTarget {
    type Err = FormError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        segment
            .strip_suffix(":delete")
            .and_then(|id| id.parse().ok())
            .map(DeleteTarget)
            .ok_or_else(|| FormError::BadId(segment.to_string()))
    }
}

/// POST /sessions/:id:delete
pub fn delete_session_route(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("sessions" / DeleteTarget)
        .and(warp::post())
        .map(|target: DeleteTarget| target.0)
        .and(with_state(state))
        .and_then(handlers::delete_session)
}

/// GET /images/:name
///
/// Serves uploaded images from the image store's directory. Without an image
/// store every request under `/images` is a 404.
pub fn images_route(images: Option<Arc<ImageStore>>) -> BoxedFilter<(Response,)> {
    match images {
        Some(store) => warp::path("images")
            .and(warp::get())
            .and(warp::fs::dir(store.dir().to_path_buf()))
            .map(|file: warp::fs::File| {
                reply::with_header(file, "cache-control", IMAGE_CACHE_CONTROL).into_response()
            })
            .boxed(),
        None => warp::path("images")
            .and_then(|| async { Err::<Response, Rejection>(warp::reject::not_found()) })
            .boxed(),
    }
}

/// GET /_ah/health
pub fn health_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("_ah" / "health").and(warp::get()).map(|| "ok")
}

/// Every route the service answers.
pub fn routes(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    root_route()
        .or(list_sessions_route(state.clone()))
        .or(get_session_route(state.clone()))
        .or(create_session_route(state.clone()))
        .or(update_session_route(state.clone()))
        .or(delete_session_route(state.clone()))
        .or(images_route(state.images))
        .or(health_route())
}
