//! HTTP route handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{debug, error, warn};

use crate::domain::{ArrangementNames, DomainError, Roster};
use crate::planner::{NoProgress, PlannerError, SearchOutcome, plan_carpools};
use crate::worker::{CarpoolWorker, MakeCarpoolsPayload};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/worker", get(worker_socket))
        .route("/carpools", post(make_carpools))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Upgrade to a WebSocket speaking the worker protocol.
async fn worker_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_worker(socket, state))
}

/// Relay messages between one socket and its own worker until either side
/// hangs up.
async fn run_worker(mut socket: WebSocket, state: AppState) {
    let guard = state.worker_opened();
    let mut worker = CarpoolWorker::new(Arc::clone(&state.config));
    debug!(active = state.active_workers(), "Worker socket opened");

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = worker.post(&text) {
                        warn!(error = %e, "Rejected worker message");
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(error = %e, "Worker socket failed");
                    break;
                }
            },
            Some(message) = worker.recv(), if worker.is_running() => {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        error!(error = %e, "Failed to encode worker message");
                        continue;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }

    worker.terminate();
    drop(guard);
    debug!(active = state.active_workers(), "Worker socket closed");
}

/// Run a search to completion and return its arrangements.
async fn make_carpools(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CarpoolsResponse>, AppError> {
    // Parse JSON manually so the error message names the problem
    let payload: MakeCarpoolsPayload =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        })?;

    let roster = Roster::new(payload.dancers)?;
    let names = ArrangementNames::new(payload.existing_arrangement_names);
    let config = Arc::clone(&state.config);

    let outcome =
        tokio::task::spawn_blocking(move || plan_carpools(&roster, &config, names, NoProgress))
            .await
            .map_err(|e| AppError::Internal {
                message: format!("Search task failed: {e}"),
            })??;

    match outcome {
        SearchOutcome::Finished(result) => Ok(Json(CarpoolsResponse {
            arrangements: result.arrangements,
            stats: result.stats,
        })),
        SearchOutcome::Cancelled => Err(AppError::Internal {
            message: "Search was cancelled".to_string(),
        }),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => {
                error!(%message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerConfig;
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(PlannerConfig::default())
    }

    fn body(value: serde_json::Value) -> Bytes {
        Bytes::from(serde_json::to_vec(&value).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn carpools_for_small_roster() {
        let request = body(json!({
            "dancers": [
                {"id": "A", "canDrive": "yes", "maxPassengers": 4,
                 "earliestDeparture": "2024-06-14T15:00:00Z"},
                {"id": "B", "canDrive": "no"},
                {"id": "C", "canDrive": "yesIfNeeded", "maxPassengers": 2,
                 "earliestDeparture": "2024-06-14T16:00:00Z"},
                {"id": "D", "canDrive": "no", "travelsIndependently": true}
            ],
            "existingArrangementNames": ["Auto 1"]
        }));

        let Json(response) = make_carpools(State(state()), request).await.unwrap();

        assert_eq!(response.arrangements.len(), 3);
        assert_eq!(response.arrangements[0].name, "Auto 2");
        // D makes their own way
        assert_eq!(response.arrangements[0].num_placed(), 3);
        assert!(response.stats.nodes_explored > 0);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["stats"]["nodesExplored"].is_number());
        assert_eq!(json["arrangements"][0]["carpools"][0]["occupants"][0], "A");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let err = make_carpools(State(state()), Bytes::from_static(b"{"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn duplicate_people_are_bad_request() {
        let request = body(json!({
            "dancers": [
                {"id": "A", "canDrive": "yes"},
                {"id": "A", "canDrive": "no"}
            ]
        }));

        let err = make_carpools(State(state()), request).await.unwrap_err();

        let AppError::BadRequest { message } = err else {
            panic!("expected bad request");
        };
        assert!(message.contains("duplicate"), "{message}");
    }

    #[test]
    fn error_status_codes() {
        let response = AppError::BadRequest {
            message: "nope".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(PlannerError::Internal("broken".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    mod socket {
        use std::time::Duration;

        use futures::{SinkExt, StreamExt};
        use serde_json::{Value, json};
        use tokio::net::TcpStream;
        use tokio_tungstenite::tungstenite::Message as ClientMessage;
        use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

        use super::*;

        type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

        const WAIT: Duration = Duration::from_secs(10);

        /// Serve the app on an ephemeral port and connect to its worker socket.
        async fn connect(state: AppState) -> Client {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let app = create_router(state);
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

            let (client, _) = connect_async(format!("ws://{addr}/worker")).await.unwrap();
            client
        }

        async fn send(client: &mut Client, message: Value) {
            client
                .send(ClientMessage::Text(message.to_string()))
                .await
                .unwrap();
        }

        async fn next_json(client: &mut Client) -> Value {
            loop {
                let message = tokio::time::timeout(WAIT, client.next())
                    .await
                    .expect("timed out waiting for worker")
                    .expect("socket closed")
                    .unwrap();
                if let ClientMessage::Text(text) = message {
                    return serde_json::from_str(&text).unwrap();
                }
            }
        }

        /// Collect messages up to and including the result.
        async fn until_result(client: &mut Client) -> Vec<Value> {
            let mut messages = Vec::new();
            loop {
                let message = next_json(client).await;
                let done = message["command"] == "handleMadeCarpools";
                messages.push(message);
                if done {
                    return messages;
                }
            }
        }

        fn make_carpools(dancers: Value, existing: &[&str]) -> Value {
            json!({
                "command": "makeCarpools",
                "payload": {"dancers": dancers, "existingArrangementNames": existing}
            })
        }

        #[tokio::test]
        async fn relays_worker_protocol() {
            let state = AppState::new(PlannerConfig {
                progress_interval_ms: 0,
                ..PlannerConfig::default()
            });
            let mut client = connect(state.clone()).await;

            send(
                &mut client,
                make_carpools(
                    json!([
                        {"id": "A", "canDrive": "yes", "maxPassengers": 4,
                         "earliestDeparture": "2024-06-14T15:00:00Z"},
                        {"id": "B", "canDrive": "no"},
                        {"id": "C", "canDrive": "yesIfNeeded", "maxPassengers": 2,
                         "earliestDeparture": "2024-06-14T16:00:00Z"}
                    ]),
                    &[],
                ),
            )
            .await;

            let messages = until_result(&mut client).await;
            let (result, progress) = messages.split_last().unwrap();
            assert!(!progress.is_empty());
            assert!(
                progress
                    .iter()
                    .all(|m| m["command"] == "handleProgressUpdate"
                        && m["payload"]["numArrangementsExplored"].is_number())
            );
            assert_eq!(result["payload"][0]["name"], "Auto 1");
            assert_eq!(
                result["payload"][0]["carpools"][0]["occupants"],
                json!(["A", "B", "C"])
            );
            assert_eq!(state.active_workers(), 1);

            // Same socket, new search, its own result
            send(
                &mut client,
                make_carpools(
                    json!([
                        {"id": "x", "canDrive": "yes", "maxPassengers": 2},
                        {"id": "y", "canDrive": "no"}
                    ]),
                    &["Auto 1", "Auto 2", "Auto 3"],
                ),
            )
            .await;

            let messages = until_result(&mut client).await;
            let result = messages.last().unwrap();
            assert_eq!(result["payload"][0]["name"], "Auto 4");
            assert_eq!(
                result["payload"][0]["carpools"][0]["occupants"],
                json!(["x", "y"])
            );
        }

        #[tokio::test]
        async fn ignores_bad_messages() {
            let state = AppState::new(PlannerConfig::default());
            let mut client = connect(state).await;

            send(&mut client, json!({"command": "launch"})).await;
            send(
                &mut client,
                make_carpools(json!([{"id": "solo", "canDrive": "no"}]), &[]),
            )
            .await;

            let messages = until_result(&mut client).await;
            let result = messages.last().unwrap();
            assert_eq!(result["payload"][0]["carpools"], json!([]));
        }

        #[tokio::test]
        async fn closing_socket_stops_worker() {
            let state = AppState::new(PlannerConfig {
                progress_interval_ms: 0,
                num_arrangements: usize::MAX,
                ..PlannerConfig::default()
            });
            let mut client = connect(state.clone()).await;

            // Never collects enough arrangements to stop early
            let crowd: Vec<Value> = (0..30)
                .map(|i| {
                    let can_drive = if i % 3 == 0 { "yes" } else { "no" };
                    json!({"id": format!("p{i}"), "canDrive": can_drive, "maxPassengers": 4})
                })
                .collect();
            send(&mut client, make_carpools(Value::Array(crowd), &[])).await;

            let first = next_json(&mut client).await;
            assert_eq!(first["command"], "handleProgressUpdate");
            assert_eq!(state.active_workers(), 1);

            client.close(None).await.unwrap();

            tokio::time::timeout(WAIT, async {
                while state.active_workers() > 0 {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .expect("worker still running after the socket closed");
        }
    }
}
