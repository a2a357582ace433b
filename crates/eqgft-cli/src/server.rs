//! Demo dashboard: one HTML page, a static mount, and a websocket that runs
//! the counting simulation on request.
//!
//! Each websocket connection is independent. The only shared state is the
//! set of open connection IDs, kept for `/health` bookkeeping.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::{Html, Json, Response};
use axum::routing::get;
use eqgft_core::ExperimentConfig;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServerConfig;

const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Written into a freshly created static directory.
const STATIC_PROBE: (&str, &str) = ("test.txt", "Static files are working!");

#[derive(Clone)]
pub struct AppState {
    connections: Arc<Mutex<HashSet<Uuid>>>,
    /// Parameters of every dashboard-triggered run.
    experiment: ExperimentConfig,
    seed: Option<u64>,
}

impl AppState {
    pub fn new(experiment: ExperimentConfig, seed: Option<u64>) -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashSet::new())),
            experiment,
            seed,
        }
    }

    fn connection_rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

/// Reply payload, serialized as `{"type": "...", "data": {...}}`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    SimulationResults(SimulationSummary),
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationSummary {
    pub asymmetry: f64,
    pub error: f64,
    pub significance: f64,
}

/// Handle one text frame.
///
/// `{"type": "run_simulation"}` yields a reply; any other `type`, a missing
/// `type`, or a non-object payload yields `None`. Only malformed JSON and a
/// failing simulation are errors.
pub fn dispatch(
    text: &str,
    experiment: &ExperimentConfig,
    rng: &mut impl Rng,
) -> Result<Option<ServerMessage>> {
    let message: serde_json::Value =
        serde_json::from_str(text).context("message is not valid JSON")?;

    match message.get("type").and_then(|v| v.as_str()) {
        Some("run_simulation") => {
            let result = experiment.simulate(rng)?;
            tracing::debug!(
                "simulation: N={} A_meas={:.3e} ± {:.1e}",
                result.n_events,
                result.a_meas,
                result.total_error
            );
            Ok(Some(ServerMessage::SimulationResults(SimulationSummary {
                asymmetry: result.a_meas,
                error: result.total_error,
                significance: result.significance_vs_qed,
            })))
        }
        other => {
            tracing::debug!("ignoring message of type {other:?}");
            Ok(None)
        }
    }
}

/// Create the static directory on first run. Returns whether it can be
/// mounted.
pub fn prepare_static_dir(dir: &Path) -> bool {
    if dir.is_dir() {
        return true;
    }
    let created = std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(dir.join(STATIC_PROBE.0), STATIC_PROBE.1));
    match created {
        Ok(()) => {
            tracing::info!("created static directory: {}", dir.display());
            true
        }
        Err(e) => {
            tracing::warn!("could not create static directory {}: {e}", dir.display());
            false
        }
    }
}

pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/ws", get(ws_handler));
    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }
    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn run(server: &ServerConfig, experiment: ExperimentConfig) -> Result<()> {
    let experiment = ExperimentConfig {
        n_events: server.events,
        ..experiment
    };
    let static_dir = prepare_static_dir(&server.static_dir).then_some(server.static_dir.as_path());
    let app = router(AppState::new(experiment, server.seed), static_dir);

    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", server.host, server.port))?;
    tracing::info!("dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "connections": state.connection_count().await,
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let id = Uuid::new_v4();
    state.connections.lock().await.insert(id);
    tracing::info!("websocket {id} connected");

    let mut rng = state.connection_rng();
    if let Err(e) = receive_loop(&mut socket, &state.experiment, &mut rng).await {
        tracing::warn!("websocket {id} error: {e:#}");
        let _ = socket.send(Message::Close(None)).await;
    }

    state.connections.lock().await.remove(&id);
    tracing::info!("websocket {id} disconnected");
}

async fn receive_loop(
    socket: &mut WebSocket,
    experiment: &ExperimentConfig,
    rng: &mut SmallRng,
) -> Result<()> {
    while let Some(frame) = socket.recv().await {
        let text = match frame.context("receive failed")? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        if let Some(reply) = dispatch(text.as_str(), experiment, rng)? {
            let payload = serde_json::to_string(&reply)?;
            socket
                .send(Message::Text(payload.into()))
                .await
                .context("send failed")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn experiment() -> ExperimentConfig {
        ExperimentConfig {
            n_events: 10_000,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_run_simulation_reply_shape() {
        let reply = dispatch(r#"{"type": "run_simulation"}"#, &experiment(), &mut rng())
            .unwrap()
            .expect("run_simulation must reply");
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["type"], "simulation_results");
        let data = value["data"].as_object().unwrap();
        assert_eq!(data.len(), 3);
        for key in ["asymmetry", "error", "significance"] {
            assert!(data[key].is_f64(), "{key} should be a number");
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let text = r#"{"type": "run_simulation", "timestamp": "2025-11-22T00:00:00Z"}"#;
        assert!(dispatch(text, &experiment(), &mut rng()).unwrap().is_some());
    }

    #[test]
    fn test_unknown_messages_are_silent() {
        for text in [r#"{"type": "ping"}"#, r#"{"kind": "run_simulation"}"#, "[1, 2]", "42"] {
            assert!(
                dispatch(text, &experiment(), &mut rng()).unwrap().is_none(),
                "{text} should be ignored"
            );
        }
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(dispatch("run_simulation", &experiment(), &mut rng()).is_err());
    }

    #[test]
    fn test_seeded_replies_repeat() {
        let text = r#"{"type": "run_simulation"}"#;
        let a = dispatch(text, &experiment(), &mut rng()).unwrap();
        let b = dispatch(text, &experiment(), &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prepare_static_dir_creates_probe() {
        let dir = tempfile::TempDir::new().unwrap();
        let static_dir = dir.path().join("static");
        assert!(prepare_static_dir(&static_dir));
        let probe = std::fs::read_to_string(static_dir.join("test.txt")).unwrap();
        assert_eq!(probe, "Static files are working!");
        // Existing directories are left alone.
        assert!(prepare_static_dir(&static_dir));
    }

    #[test]
    fn test_prepare_static_dir_under_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();
        assert!(!prepare_static_dir(&file.join("static")));
    }

    #[tokio::test]
    async fn test_state_tracks_connections() {
        let state = AppState::new(experiment(), Some(1));
        assert_eq!(state.connection_count().await, 0);
        let id = Uuid::new_v4();
        state.connections.lock().await.insert(id);
        assert_eq!(state.connection_count().await, 1);
        state.connections.lock().await.remove(&id);
        assert_eq!(state.connection_count().await, 0);
    }
}
