use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::discord::{InteractionFollowup, InteractionReply, STOCK_COMMAND};
use crate::query::QueryResponder;
use crate::verify::InteractionVerifier;

const PING: u8 = 1;
const APPLICATION_COMMAND: u8 = 2;

const PONG: u8 = 1;
const CHANNEL_MESSAGE: u8 = 4;
const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
const EPHEMERAL: u64 = 1 << 6;

#[derive(Clone)]
pub struct AppState {
    verifier: Option<InteractionVerifier>,
    responder: QueryResponder,
    followup: Arc<dyn InteractionFollowup>,
}

impl AppState {
    pub fn new(
        verifier: Option<InteractionVerifier>,
        responder: QueryResponder,
        followup: Arc<dyn InteractionFollowup>,
    ) -> Self {
        Self {
            verifier,
            responder,
            followup,
        }
    }
}

/// Liveness routes always; `/interactions` only when a public key is set.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz));
    if state.verifier.is_some() {
        router = router.route("/interactions", post(interactions));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn root() -> &'static str {
    "Bot is running!"
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct Interaction {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    token: String,
    #[serde(default)]
    data: Option<CommandData>,
}

#[derive(Debug, Deserialize)]
struct CommandData {
    name: String,
}

async fn interactions(
    State(st): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let Some(verifier) = &st.verifier else {
        return Err(AppError::status(StatusCode::NOT_FOUND, "interactions disabled"));
    };

    let signature = header_str(&headers, "x-signature-ed25519");
    let timestamp = header_str(&headers, "x-signature-timestamp");
    let signed = match (signature, timestamp) {
        (Some(sig), Some(ts)) => verifier.verify(ts, &body, sig),
        _ => false,
    };
    if !signed {
        return Err(AppError::status(
            StatusCode::UNAUTHORIZED,
            "invalid request signature",
        ));
    }

    let interaction: Interaction = serde_json::from_slice(&body)
        .map_err(|e| AppError::status(StatusCode::BAD_REQUEST, e.to_string()))?;

    match interaction.kind {
        PING => Ok(Json(json!({ "type": PONG }))),
        APPLICATION_COMMAND => {
            let name = interaction.data.map(|d| d.name).unwrap_or_default();
            if name != STOCK_COMMAND {
                return Ok(Json(json!({
                    "type": CHANNEL_MESSAGE,
                    "data": { "content": "Unknown command", "flags": EPHEMERAL }
                })));
            }
            tracing::info!(command = %name, "status query received");
            spawn_status_reply(
                st.responder.clone(),
                Arc::clone(&st.followup),
                interaction.token,
            );
            Ok(Json(json!({ "type": DEFERRED_CHANNEL_MESSAGE })))
        }
        other => Err(AppError::status(
            StatusCode::BAD_REQUEST,
            format!("unsupported interaction type {other}"),
        )),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Answer a deferred status query exactly once, with the report or the
/// failure message.
pub fn spawn_status_reply(
    responder: QueryResponder,
    followup: Arc<dyn InteractionFollowup>,
    interaction_token: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let reply = match responder.respond().await {
            Ok(embeds) => InteractionReply::Embeds { embeds },
            Err(failure) => InteractionReply::Content {
                content: failure.to_string(),
            },
        };
        if let Err(e) = followup.edit_original(&interaction_token, &reply).await {
            tracing::warn!(error = %e, "failed to deliver status reply");
        }
    })
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(value: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: value.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.error, "request rejected");
        }
        let body = Json(json!({
            "error": self.error.to_string()
        }));
        (self.status, body).into_response()
    }
}
