// src/server/routes.rs
//! Route table and handlers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::io::ReaderStream;

use crate::dispatch::{CommandOutput, CommandResponse, Dispatcher, ParamBag};
use crate::error::{AgentError, Result};
use crate::fs::FileContent;
use crate::service::ServiceRegistry;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(registry)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/fs/file", get(get_file))
        .route("/api/fs/list", get(list_directory))
        .route("/api/fs/drives", get(list_drives))
        .route("/api/fs", post(post_fs_action))
        .route("/api/services", get(search_services))
        .route(
            "/api/services/:name",
            get(get_service).post(post_service_action),
        )
        .route("/api/dispatch", post(post_dispatch))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct FileQuery {
    path: Option<String>,
    download: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameQuery {
    name: Option<String>,
}

async fn get_file(State(state): State<AppState>, Query(query): Query<FileQuery>) -> Response {
    let mut params = ParamBag::new();
    if let Some(path) = query.path {
        params.insert("path", Value::String(path));
    }
    // A bare `?download` marker counts as much as an explicit true.
    let download = matches!(query.download.as_deref(), Some("") | Some("true") | Some("1"));

    match state.dispatcher.dispatch(Some("get"), &params).await {
        Ok(CommandOutput::File(content)) => stream_file(content, download),
        Ok(CommandOutput::Json(value)) => json_response(value),
        Err(err) => error_response(&err),
    }
}

async fn list_directory(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Response {
    let mut params = ParamBag::new();
    if let Some(path) = query.path {
        params.insert("path", Value::String(path));
    }
    respond(state.dispatcher.dispatch(Some("list"), &params).await)
}

async fn list_drives(State(state): State<AppState>) -> Response {
    match serde_json::to_value(state.dispatcher.files().drives()) {
        Ok(value) => json_response(value),
        Err(err) => error_response(&AgentError::Io(err.into())),
    }
}

async fn post_fs_action(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    dispatch_body(&state, &body).await
}

async fn post_dispatch(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    dispatch_body(&state, &body).await
}

async fn search_services(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Response {
    let fragment = query.name.unwrap_or_default();
    match state.dispatcher.directory().search(&fragment).await {
        Ok(services) => {
            let names: Vec<String> = services.into_iter().map(|s| s.name).collect();
            json_response(Value::from(names))
        }
        Err(err) => error_response(&err),
    }
}

async fn get_service(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.dispatcher.directory().get_one(&name).await {
        Ok(Some(service)) => match serde_json::to_value(service) {
            Ok(value) => json_response(value),
            Err(err) => error_response(&AgentError::Io(err.into())),
        },
        Ok(None) => error_response(&AgentError::ServiceNotFound(name)),
        Err(err) => error_response(&err),
    }
}

async fn post_service_action(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut params = ParamBag::from_json(&body);
    // The path segment names the service; it wins over any body value.
    params.insert("serviceName", Value::String(name));
    let action = params.get_str("action");
    respond(state.dispatcher.dispatch(action.as_deref(), &params).await)
}

async fn dispatch_body(state: &AppState, body: &Value) -> Response {
    let params = ParamBag::from_json(body);
    let action = params.get_str("action");
    respond(state.dispatcher.dispatch(action.as_deref(), &params).await)
}

fn respond(result: Result<CommandOutput>) -> Response {
    match result {
        Ok(CommandOutput::Json(value)) => json_response(value),
        Ok(CommandOutput::File(content)) => stream_file(content, false),
        Err(err) => error_response(&err),
    }
}

fn json_response(value: Value) -> Response {
    (StatusCode::OK, Json(CommandResponse::success(value))).into_response()
}

fn error_response(err: &AgentError) -> Response {
    (status_for(err), Json(CommandResponse::failure(err))).into_response()
}

fn stream_file(content: FileContent, download: bool) -> Response {
    let kind = if download { "attachment" } else { "inline" };
    let file_name = content.file_name.replace('"', "");
    let disposition = format!("{kind}; filename=\"{file_name}\"");
    let body = Body::from_stream(ReaderStream::new(content.file));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content.media_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn status_for(err: &AgentError) -> StatusCode {
    match err {
        AgentError::Validation(_) | AgentError::UnknownAction(_) | AgentError::MissingAction => {
            StatusCode::BAD_REQUEST
        }
        AgentError::NotFound(_) | AgentError::ServiceNotFound(_) => StatusCode::NOT_FOUND,
        AgentError::AlreadyExists(_)
        | AgentError::InvalidServiceState(_)
        | AgentError::ServiceControl(_)
        | AgentError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileSystemExecutor;

    #[test]
    fn error_classes_map_to_their_status_codes() {
        assert_eq!(
            status_for(&AgentError::MissingAction),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AgentError::UnknownAction("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AgentError::Validation(Default::default())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AgentError::NotFound("m".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AgentError::ServiceNotFound("s".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AgentError::AlreadyExists("m".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AgentError::InvalidServiceState("m".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AgentError::ServiceControl("m".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn service_routes_answer_through_the_dispatcher() {
        use crate::service::{MemoryRegistry, ServiceDescriptor, ServiceState, StartMode};

        let registry = Arc::new(MemoryRegistry::new());
        registry
            .insert(ServiceDescriptor {
                name: "sshd".to_string(),
                display_name: "OpenSSH Server".to_string(),
                description: String::new(),
                state: ServiceState::Running,
                start_mode: StartMode::Automatic,
                account: "root".to_string(),
                executable_path: "/usr/sbin/sshd".to_string(),
            })
            .await;
        let state = AppState::new(registry);

        let found = get_service(State(state.clone()), Path("sshd".to_string())).await;
        assert_eq!(found.status(), StatusCode::OK);

        let missing = get_service(State(state), Path("ghostd".to_string())).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn file_responses_carry_type_and_disposition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        tokio::fs::write(&path, b"%PDF").await.unwrap();
        let content = FileSystemExecutor::new().get(&path).await.unwrap();

        let response = stream_file(content, true);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.pdf\""
        );
    }

    #[tokio::test]
    async fn inline_is_the_default_disposition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();
        let content = FileSystemExecutor::new().get(&path).await.unwrap();

        let response = stream_file(content, false);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"notes.txt\""
        );
    }
}
