use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Request, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    serve, Router,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::sync::mpsc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::answer_service::AnswerService;
use crate::config::Settings;
use crate::constants::{INPUT_PLACEHOLDER, PAGE_TITLE, PENDING_TEXT};
use crate::conversation::{RequestStatus, Snapshot, StoreError};
use crate::message::Message;
use crate::session::ChatSession;

// Frames the page sends over the WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientEvent {
    Submit { text: String },
}

/// Frames pushed to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Snapshot {
        messages: Vec<Message>,
        status: RequestStatus,
        history: Vec<String>,
    },
    Rejected {
        reason: &'static str,
    },
}

impl From<Snapshot> for ServerEvent {
    fn from(snapshot: Snapshot) -> Self {
        let history = snapshot.history();
        ServerEvent::Snapshot {
            messages: snapshot.messages,
            status: snapshot.status,
            history,
        }
    }
}

#[derive(Clone)]
struct AppState<S> {
    templates: Arc<AutoReloader>,
    service: S,
}

fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates_dir));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

async fn index_handler<S>(
    State(state): State<AppState<S>>,
) -> Result<Html<String>, (StatusCode, Html<String>)>
where
    S: Clone + Send + Sync + 'static,
{
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => PAGE_TITLE,
                    placeholder => INPUT_PLACEHOLDER,
                    pending_text => PENDING_TEXT,
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn ws_handler<S>(ws: WebSocketUpgrade, State(state): State<AppState<S>>) -> impl IntoResponse
where
    S: AnswerService + Clone + Send + Sync + 'static,
{
    debug!("WebSocket connection upgrade requested");
    ws.on_upgrade(move |socket| handle_socket(socket, state.service))
}

// One WebSocket is one page session with its own conversation.
async fn handle_socket<S>(socket: WebSocket, service: S)
where
    S: AnswerService + Send + Sync + 'static,
{
    info!("Page session connected");
    let session = Arc::new(ChatSession::new(service));
    let (mut sender, mut receiver) = socket.split();
    let (update_tx, mut update_rx) = mpsc::channel::<ServerEvent>(16);

    if send_event(&mut sender, &session.snapshot().into()).await.is_err() {
        warn!("Failed to send initial snapshot to new page session");
        return;
    }

    loop {
        tokio::select! {
            Some(event) = update_rx.recv() => {
                if send_event(&mut sender, &event).await.is_err() {
                    warn!("Page session disconnected or send error. Closing connection.");
                    break;
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(event) = handle_client_text(&session, &update_tx, &text) {
                            if send_event(&mut sender, &event).await.is_err() {
                                warn!("Page session disconnected or send error. Closing connection.");
                                break;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Binary(_))) => {
                        warn!("Received unexpected binary message from page");
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        info!("Page session closed");
                        break;
                    }
                    // Axum answers pings itself
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket receive error: {}", e);
                        break;
                    }
                }
            }
        }
    }
    info!("Page session ended");
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, WsMessage>,
    event: &ServerEvent,
) -> Result<()> {
    let json = serde_json::to_string(event).context("Failed to serialize server event")?;
    sender
        .send(WsMessage::Text(json))
        .await
        .context("Failed to send WebSocket frame")?;
    Ok(())
}

/// Applies one client frame. Returns the frame to send back right away, if
/// any; the answer itself arrives later through `updates`.
fn handle_client_text<S>(
    session: &Arc<ChatSession<S>>,
    updates: &mpsc::Sender<ServerEvent>,
    text: &str,
) -> Option<ServerEvent>
where
    S: AnswerService + Send + Sync + 'static,
{
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!("Ignoring unparseable client frame: {}", e);
            return None;
        }
    };

    match event {
        ClientEvent::Submit { text } => match session.submit(&text) {
            Ok(pending) => {
                let accepted: ServerEvent = session.snapshot().into();
                let session = session.clone();
                let updates = updates.clone();
                tokio::spawn(async move {
                    if let Err(e) = session.resolve(pending).await {
                        error!("Failed to complete request: {}", e);
                    }
                    if updates.send(session.snapshot().into()).await.is_err() {
                        debug!("Page session closed before the answer arrived");
                    }
                });
                Some(accepted)
            }
            Err(StoreError::EmptyInput) => None,
            Err(StoreError::AlreadyPending) => Some(ServerEvent::Rejected {
                reason: "already_pending",
            }),
            Err(e @ StoreError::NotPending) => {
                error!("Unexpected submission failure: {}", e);
                None
            }
        },
    }
}

/// Builds the page router: `/` (chat page), `/ws` (page session) and `/static`.
pub fn build_router<S>(service: S, settings: &Settings) -> Router
where
    S: AnswerService + Clone + Send + Sync + 'static,
{
    let state = AppState {
        templates: Arc::new(create_minijinja_env(settings.templates_dir.clone())),
        service,
    };

    let static_files_service = ServeDir::new(&settings.static_dir).not_found_service(
        tower::service_fn(|_req: Request| async {
            Ok::<_, Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        }),
    );

    Router::new()
        .route("/", get(index_handler::<S>))
        .route("/ws", get(ws_handler::<S>))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server<S>(service: S, settings: &Settings) -> Result<()>
where
    S: AnswerService + Clone + Send + Sync + 'static,
{
    let app = build_router(service, settings);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
