use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::clipboard::CopyOutcome;
use crate::error::AppError;
use crate::generation::GenerationClient;
use crate::main_ui_html::build_main_ui_html;
use crate::prompt_builder::Category;
use crate::render_surface::standalone_page;
use crate::request_state::SubmitRejected;
use crate::session::{Session, SessionSnapshot};

pub struct AppState {
    pub session: Mutex<Session>,
    pub client: GenerationClient,
    pub server_port: AtomicU16,
}

type ApiResponse = (StatusCode, Json<Value>);

const SERVER_THREAD_NAME: &str = "pagecraft-server";

impl AppState {
    pub fn new(session: Session, client: GenerationClient) -> Self {
        Self {
            session: Mutex::new(session),
            client,
            server_port: AtomicU16::new(0),
        }
    }

    fn lock_session(&self) -> std::result::Result<MutexGuard<'_, Session>, ApiResponse> {
        self.session.lock().map_err(|_| {
            error!("session lock poisoned");
            err_json(StatusCode::INTERNAL_SERVER_ERROR, "session lock error")
        })
    }
}

pub struct AppServer {
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl AppServer {
    pub fn start(state: Arc<AppState>, preferred_port: u16) -> Result<Self> {
        let listener = bind_listener(preferred_port)?;
        let port = listener
            .local_addr()
            .context("failed to inspect server local address")?
            .port();
        listener
            .set_nonblocking(true)
            .context("failed to set listener non-blocking")?;

        state.server_port.store(port, Ordering::Relaxed);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread_handle = thread::Builder::new()
            .name(SERVER_THREAD_NAME.to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build();
                let runtime = match runtime {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(error = %err, "failed to build server runtime");
                        return;
                    }
                };

                runtime.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => listener,
                        Err(err) => {
                            error!(error = %err, "failed to adopt server listener");
                            return;
                        }
                    };

                    let app = build_router(state);
                    let server = axum::serve(listener, app).with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    });
                    if let Err(err) = server.await {
                        error!(error = %err, "server stopped with error");
                    }
                });
            })
            .context("failed to spawn server thread")?;

        info!(port, "server listening on 127.0.0.1");
        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
            thread_handle: Some(thread_handle),
        })
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            info!(port = self.port, "server stopped");
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}/", self.port)
    }
}

impl Drop for AppServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Deserialize)]
struct DraftReq {
    idea: String,
    category: String,
}

#[derive(Debug, Deserialize)]
struct ModalReq {
    visible: bool,
}

fn build_router(state: Arc<AppState>) -> Router {
    let port = state.server_port.load(Ordering::Relaxed);
    let local_origin = HeaderValue::from_str(&format!("http://127.0.0.1:{port}"))
        .expect("127.0.0.1 origin should be valid");
    let localhost_origin = HeaderValue::from_str(&format!("http://localhost:{port}"))
        .expect("localhost origin should be valid");

    let cors = CorsLayer::new()
        .allow_origin([local_origin, localhost_origin])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(get_main_page))
        .route("/ping", get(get_ping))
        .route("/preview", get(get_preview))
        .route("/app/init", get(get_app_init))
        .route("/app/state", get(get_app_state))
        .route("/app/idea", post(post_app_idea))
        .route("/app/generate", post(post_app_generate))
        .route("/app/copy", post(post_app_copy))
        .route("/app/modal", post(post_app_modal))
        .route("/app/theme", post(post_app_theme))
        .layer(cors)
        .with_state(state)
}

async fn get_main_page() -> Html<String> {
    Html(build_main_ui_html())
}

async fn get_ping() -> ApiResponse {
    ok_json(json!({}))
}

async fn get_preview(State(state): State<Arc<AppState>>) -> axum::response::Response {
    let (document, idea) = {
        let session = match state.lock_session() {
            Ok(guard) => guard,
            Err(response) => return response.into_response(),
        };
        (session.document().to_string(), session.idea().to_string())
    };

    if document.is_empty() {
        return err_json(StatusCode::NOT_FOUND, "nothing generated yet").into_response();
    }

    Html(standalone_page(&document, &idea)).into_response()
}

async fn get_app_init(State(state): State<Arc<AppState>>) -> ApiResponse {
    let snapshot = {
        let mut session = match state.lock_session() {
            Ok(guard) => guard,
            Err(response) => return response,
        };
        session.start_page();
        session.snapshot()
    };
    ok_snapshot(snapshot, json!({}))
}

async fn get_app_state(State(state): State<Arc<AppState>>) -> ApiResponse {
    let snapshot = match state.lock_session() {
        Ok(session) => session.snapshot(),
        Err(response) => return response,
    };
    ok_snapshot(snapshot, json!({}))
}

async fn post_app_idea(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DraftReq>,
) -> ApiResponse {
    let Some(category) = Category::from_label(&payload.category) else {
        return err_json(StatusCode::BAD_REQUEST, "unknown category");
    };

    let snapshot = {
        let mut session = match state.lock_session() {
            Ok(guard) => guard,
            Err(response) => return response,
        };
        session.set_draft(&payload.idea, category);
        session.snapshot()
    };

    ok_snapshot(snapshot, json!({}))
}

async fn post_app_generate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DraftReq>,
) -> ApiResponse {
    let Some(category) = Category::from_label(&payload.category) else {
        return err_json(StatusCode::BAD_REQUEST, "unknown category");
    };

    let prompt = {
        let mut session = match state.lock_session() {
            Ok(guard) => guard,
            Err(response) => return response,
        };
        match session.begin_generation(&payload.idea, category) {
            Ok(prompt) => prompt,
            Err(rejected) => {
                let status = match rejected {
                    SubmitRejected::EmptyIdea => StatusCode::BAD_REQUEST,
                    SubmitRejected::InFlight => StatusCode::CONFLICT,
                };
                return err_json(status, &rejected.user_message());
            }
        }
    };

    info!(category = category.label(), "generation submitted");

    // Runs detached so the request state always leaves Loading, even if the
    // page that asked goes away.
    let task_state = Arc::clone(&state);
    let task = tokio::spawn(async move {
        let outcome = task_state.client.generate(&prompt).await;
        match task_state.session.lock() {
            Ok(mut session) => {
                session.finish_generation(outcome);
            }
            Err(_) => error!("session lock poisoned, generation result dropped"),
        }
    });

    if let Err(err) = task.await {
        error!(error = %err, "generation task failed");
        if let Ok(mut session) = state.session.lock() {
            session.finish_generation(Err(AppError::Transport));
        }
    }

    let snapshot = match state.lock_session() {
        Ok(session) => session.snapshot(),
        Err(response) => return response,
    };
    ok_snapshot(snapshot, json!({}))
}

async fn post_app_copy(State(state): State<Arc<AppState>>) -> ApiResponse {
    // Clipboard calls block, so they stay off the server thread.
    let task_state = Arc::clone(&state);
    let copied = tokio::task::spawn_blocking(move || {
        let mut session = task_state.lock_session()?;
        let outcome = session.copy_document();
        let reset_after_ms = session.copy_reset_after_ms();
        Ok::<_, ApiResponse>((outcome, session.snapshot(), reset_after_ms))
    })
    .await;

    let (outcome, snapshot, reset_after_ms) = match copied {
        Ok(Ok(copied)) => copied,
        Ok(Err(response)) => return response,
        Err(err) => {
            error!(error = %err, "copy task failed");
            return err_json(StatusCode::INTERNAL_SERVER_ERROR, "copy task failed");
        }
    };

    match outcome {
        Ok(CopyOutcome::Skipped) => ok_snapshot(snapshot, json!({ "skipped": true })),
        Ok(CopyOutcome::Copied { backend }) => {
            info!(backend, bytes = snapshot.document.len(), "document copied");
            ok_snapshot(
                snapshot,
                json!({ "skipped": false, "reset_after_ms": reset_after_ms }),
            )
        }
        Err(err) => {
            warn!(error = %err, "copy failed");
            err_json(StatusCode::INTERNAL_SERVER_ERROR, &err.user_message())
        }
    }
}

async fn post_app_modal(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ModalReq>,
) -> ApiResponse {
    let snapshot = {
        let mut session = match state.lock_session() {
            Ok(guard) => guard,
            Err(response) => return response,
        };
        session.set_modal_visible(payload.visible);
        session.snapshot()
    };
    ok_snapshot(snapshot, json!({}))
}

async fn post_app_theme(State(state): State<Arc<AppState>>) -> ApiResponse {
    let snapshot = {
        let mut session = match state.lock_session() {
            Ok(guard) => guard,
            Err(response) => return response,
        };
        session.toggle_theme();
        session.snapshot()
    };
    ok_snapshot(snapshot, json!({}))
}

fn ok_json(payload: Value) -> ApiResponse {
    let mut body = serde_json::Map::new();
    body.insert("ok".to_string(), Value::Bool(true));

    if let Some(obj) = payload.as_object() {
        for (key, value) in obj {
            body.insert(key.clone(), value.clone());
        }
    } else if !payload.is_null() {
        body.insert("data".to_string(), payload);
    }

    (StatusCode::OK, Json(Value::Object(body)))
}

fn ok_snapshot(snapshot: SessionSnapshot, extra: Value) -> ApiResponse {
    let mut payload = serde_json::to_value(snapshot).unwrap_or_else(|_| json!({}));
    if let (Some(target), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    ok_json(payload)
}

fn err_json(status: StatusCode, message: &str) -> ApiResponse {
    (
        status,
        Json(json!({
            "ok": false,
            "error": message,
        })),
    )
}

fn bind_listener(preferred_port: u16) -> Result<TcpListener> {
    if preferred_port == 0 {
        return TcpListener::bind(("127.0.0.1", 0)).context("failed to bind ephemeral port");
    }

    for offset in 0..200u16 {
        let port = preferred_port.saturating_add(offset);
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            if offset > 0 {
                warn!(preferred_port, port, "preferred port busy");
            }
            return Ok(listener);
        }
    }

    Err(anyhow!("failed to bind server port"))
}
