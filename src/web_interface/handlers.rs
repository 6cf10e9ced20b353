use std::sync::Arc;

use log::{error, warn};
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Rejection, Reply};

use crate::error_handling::types::{FormError, StorageError, UploadError};
use crate::image_storage::ImageStore;
use crate::notification::UpdateNotifier;
use crate::storage::storage_trait::SessionStore;
use crate::storage::types::Session;
use crate::web_interface::form::SessionForm;
use crate::web_interface::types::{ApiError, ListQuery, SessionResponse};

/// Everything a request handler may touch, built once by the controller.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub images: Option<Arc<ImageStore>>,
    pub notifier: UpdateNotifier,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            images: None,
            notifier: UpdateNotifier::disabled(),
        }
    }

    pub fn with_images(mut self, images: Arc<ImageStore>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_notifier(mut self, notifier: UpdateNotifier) -> Self {
        self.notifier = notifier;
        self
    }
}

pub fn storage_status(err: &StorageError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_invalid_argument() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_reply(status: StatusCode, message: String) -> Response {
    if status.is_server_error() {
        error!("Handler error: status code: {}, message: {}", status, message);
    } else {
        warn!("Handler error: status code: {}, message: {}", status, message);
    }
    reply::with_status(reply::json(&ApiError { message }), status).into_response()
}

fn storage_error_reply(context: &str, err: StorageError) -> Response {
    error_reply(storage_status(&err), format!("{}: {}", context, err))
}

fn form_error_reply(err: FormError) -> Response {
    let status = match err {
        FormError::Upload(UploadError::WriteFailed { .. })
        | FormError::Upload(UploadError::DirectoryFailed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    error_reply(status, format!("could not parse session from form: {}", err))
}

pub fn redirect(location: &str) -> Response {
    reply::with_status(
        reply::with_header(reply::reply(), "location", location),
        StatusCode::FOUND,
    )
    .into_response()
}

/// Stores the form's image, if any, and builds the session it describes.
async fn session_from_form(state: &AppState, form: SessionForm) -> Result<Session, FormError> {
    let uploaded_url = match form.image {
        Some(ref file) => {
            let images = state.images.as_ref().ok_or(UploadError::NotConfigured)?;
            Some(images.upload(file).await?.url)
        }
        None => None,
    };
    Ok(form.into_session(uploaded_url))
}

/// GET /sessions[?createdBy=<id>]
pub async fn list_sessions(query: ListQuery, state: AppState) -> Result<Response, Rejection> {
    let result = match query.created_by {
        Some(ref user_id) => state.store.list_sessions_created_by(user_id).await,
        None => state.store.list_sessions().await,
    };
    match result {
        Ok(list) => {
            let body: Vec<SessionResponse<'_>> = list.iter().map(SessionResponse::from).collect();
            Ok(reply::json(&body).into_response())
        }
        Err(e) => Ok(storage_error_reply("could not list sessions", e)),
    }
}

/// GET /sessions/:id
pub async fn get_session(id: i64, state: AppState) -> Result<Response, Rejection> {
    match state.store.get_session(id).await {
        Ok(session) => Ok(reply::json(&SessionResponse::from(&session)).into_response()),
        Err(e) => Ok(storage_error_reply("could not find session", e)),
    }
}

/// POST /sessions
pub async fn create_session(
    form: Result<SessionForm, FormError>,
    state: AppState,
) -> Result<Response, Rejection> {
    let session = match form {
        Ok(form) => match session_from_form(&state, form).await {
            Ok(session) => session,
            Err(e) => return Ok(form_error_reply(e)),
        },
        Err(e) => return Ok(form_error_reply(e)),
    };
    match state.store.add_session(&session).await {
        Ok(id) => {
            state.notifier.notify(id);
            Ok(redirect(&format!("/sessions/{}", id)))
        }
        Err(e) => Ok(storage_error_reply("could not save session", e)),
    }
}

/// POST|PUT /sessions/:id
pub async fn update_session(
    id: i64,
    form: Result<SessionForm, FormError>,
    state: AppState,
) -> Result<Response, Rejection> {
    let mut session = match form {
        Ok(form) => match session_from_form(&state, form).await {
            Ok(session) => session,
            Err(e) => return Ok(form_error_reply(e)),
        },
        Err(e) => return Ok(form_error_reply(e)),
    };
    session.id = id;
    match state.store.update_session(&session).await {
        Ok(()) => {
            state.notifier.notify(id);
            Ok(redirect(&format!("/sessions/{}", id)))
        }
        Err(e) => Ok(storage_error_reply("could not save session", e)),
    }
}

/// POST /sessions/:id:delete
pub async fn delete_session(id: i64, state: AppState) -> Result<Response, Rejection> {
    match state.store.delete_session(id).await {
        Ok(()) => Ok(redirect("/sessions")),
        Err(e) => Ok(storage_error_reply("could not delete session", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_storage::UploadedFile;
    use crate::notification::BroadcastPublisher;
    use crate::storage::MemoryStorage;
    use tempfile::TempDir;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStorage::new()))
    }

    fn form(title: &str) -> SessionForm {
        SessionForm {
            title: title.into(),
            author: "Ada".into(),
            created_by: "Ada".into(),
            created_by_id: "u1".into(),
            ..Default::default()
        }
    }

    fn location(res: &Response) -> &str {
        res.headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn create_redirects_to_new_session() {
        let state = state();
        let res = create_session(Ok(form("First")), state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/sessions/1");
        assert_eq!(state.store.get_session(1).await.unwrap().title, "First");
    }

    #[tokio::test]
    async fn create_fires_update_notification() {
        let publisher = Arc::new(BroadcastPublisher::new());
        let mut rx = publisher.subscribe("session-updates").unwrap();
        let state = state().with_notifier(UpdateNotifier::new(publisher, "session-updates"));

        create_session(Ok(form("Announced")), state).await.unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(message.data, b"1");
    }

    #[tokio::test]
    async fn malformed_form_is_bad_request() {
        let res = create_session(Err(FormError::Multipart("truncated".into())), state())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn image_without_image_store_is_bad_request() {
        let mut f = form("Pic");
        f.image = Some(UploadedFile {
            filename: "a.png".into(),
            content_type: None,
            data: vec![1, 2, 3],
        });
        let state = state();
        let res = create_session(Ok(f), state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn uploaded_image_url_is_saved() {
        let dir = TempDir::new().unwrap();
        let images = Arc::new(ImageStore::new(dir.path(), "/images").unwrap());
        let state = state().with_images(images);
        let mut f = form("Pic");
        f.video_url = "https://ignored.example.com".into();
        f.image = Some(UploadedFile {
            filename: "a.png".into(),
            content_type: Some("image/png".into()),
            data: vec![1, 2, 3],
        });
        create_session(Ok(f), state.clone()).await.unwrap();
        let saved = state.store.get_session(1).await.unwrap();
        assert!(saved.video_url.starts_with("/images/"));
        assert!(saved.video_url.ends_with(".png"));
    }

    #[tokio::test]
    async fn get_unknown_session_is_not_found() {
        let res = get_session(9, state()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_known_session_is_ok() {
        let state = state();
        let id = state.store.add_session(&form("Known").into_session(None)).await.unwrap();
        let res = get_session(id, state).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn update_uses_id_from_path() {
        let state = state();
        create_session(Ok(form("Old")), state.clone()).await.unwrap();
        let res = update_session(1, Ok(form("New")), state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/sessions/1");
        assert_eq!(state.store.get_session(1).await.unwrap().title, "New");
    }

    #[tokio::test]
    async fn update_of_unknown_session_is_not_found() {
        let res = update_session(5, Ok(form("Nope")), state()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_with_zero_id_is_bad_request() {
        let res = update_session(0, Ok(form("Zero")), state()).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_redirects_to_list() {
        let state = state();
        create_session(Ok(form("Doomed")), state.clone()).await.unwrap();
        let res = delete_session(1, state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/sessions");
        assert!(state.store.get_session(1).await.is_err());
    }

    #[tokio::test]
    async fn delete_of_unknown_session_is_not_found() {
        let res = delete_session(3, state()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_is_ok_with_and_without_filter() {
        let state = state();
        create_session(Ok(form("A")), state.clone()).await.unwrap();
        let res = list_sessions(ListQuery::default(), state.clone()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let res = list_sessions(
            ListQuery {
                created_by: Some("u1".into()),
            },
            state,
        )
        .await
        .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn closed_store_add_is_server_error() {
        let state = state();
        state.store.close().await;
        let res = create_session(Ok(form("Late")), state).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        assert_eq!(
            storage_status(&StorageError::NotFound { backend: "b", id: 1 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            storage_status(&StorageError::UnassignedId {
                backend: "b",
                operation: "delete_session"
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            storage_status(&StorageError::ConnectionFailed {
                backend: "b",
                reason: "down".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
