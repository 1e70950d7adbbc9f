//! `POST /api/trade` proxy.
//!
//! Keeps the advice credential on the server: browsers post the query and
//! their history, the proxy calls the advice service and answers with
//! `{reply}`. Failures answer non-2xx with fallback copy in the same shape.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::advice::proxy::{TradeReply, TradeRequest};
use crate::advice::{AdviceFault, AdviceService, FallbackTable, Turn};

pub struct ProxyState {
    advice: Arc<dyn AdviceService>,
    fallbacks: FallbackTable,
    contact: String,
}

impl ProxyState {
    pub fn new(advice: Arc<dyn AdviceService>, fallbacks: FallbackTable, contact: impl Into<String>) -> Self {
        Self {
            advice,
            fallbacks,
            contact: contact.into(),
        }
    }
}

type SharedState = Arc<ProxyState>;

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/trade", post(trade))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind the proxy listener. `host` may be a name such as `localhost` or a
/// bare IPv4/IPv6 address.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((host, port))
        .await
        .wrap_err_with(|| format!("Failed to bind trade proxy to {host} port {port}"))?;
    Ok(listener)
}

/// Serve the proxy on `listener` until the process is stopped.
pub async fn serve(state: ProxyState, listener: TcpListener) -> Result<()> {
    let app = router(state);

    info!("Trade proxy listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

fn reply(status: StatusCode, text: impl Into<String>) -> (StatusCode, Json<TradeReply>) {
    (status, Json(TradeReply { reply: text.into() }))
}

async fn trade(
    State(state): State<SharedState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> (StatusCode, Json<TradeReply>) {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!("Trade proxy rejected request body: {}", rejection.body_text());
            return reply(rejection.status(), "Please enter a trade inquiry.");
        }
    };

    let query = request.query.trim();
    if query.is_empty() {
        return reply(StatusCode::BAD_REQUEST, "Please enter a trade inquiry.");
    }

    let history: Vec<Turn> = request
        .history
        .into_iter()
        .filter(|turn| !turn.text.trim().is_empty())
        .collect();

    match state.advice.get_advice(query, &history).await {
        Ok(text) => reply(StatusCode::OK, text),
        Err(AdviceFault::ConfigMissing) => {
            warn!("Trade proxy has no advice credential configured");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Trade Desk temporarily unavailable. Please contact {}.",
                    state.contact
                ),
            )
        }
        Err(fault) => {
            warn!("Trade proxy request faulted: {}", fault);
            let status = match fault {
                AdviceFault::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            };
            reply(status, state.fallbacks.message_for(fault.kind()))
        }
    }
}
