//! drop-serve - Publish route for the drop pipeline
//!
//! Exposes `POST /api/instagram/publish`: validates the request, forwards it
//! to the provider once, and wraps the outcome in a `{status, message,
//! instagramMediaId?}` envelope. Invalid requests are rejected before the
//! provider is ever contacted.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use clap::Parser;
use libdropdeck::publisher::endpoint::PublishEnvelope;
use libdropdeck::publisher::instagram::{InstagramConfig, InstagramUpstream};
use libdropdeck::publisher::{PublishPayload, PublishTarget};
use libdropdeck::DropdeckError;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "drop-serve")]
#[command(version)]
#[command(about = "Serve the publish route")]
#[command(long_about = "\
drop-serve - Publish route for the drop pipeline

DESCRIPTION:
    drop-serve exposes POST /api/instagram/publish. Each request carries
    {videoUrl, caption}; the server issues exactly one provider call and
    answers with {status, message, instagramMediaId?}.

CONFIGURATION:
    Required environment variables:
        INSTAGRAM_ACCOUNT_ID     - Provider account
        INSTAGRAM_ACCESS_TOKEN   - Provider token
        INSTAGRAM_API_VERSION    - Provider API version (optional)

EXIT CODES:
    0 - Success
    1 - Startup or configuration error
")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: String,
}

#[derive(Clone)]
struct AppState {
    upstream: Arc<dyn PublishTarget>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/instagram/publish", post(publish_route))
        .with_state(state)
}

/// Entry point for the publish route. Body-parse failures short-circuit to
/// 400 here; everything else goes through [`handle_publish`].
async fn publish_route(
    State(state): State<AppState>,
    payload: Result<Json<PublishPayload>, JsonRejection>,
) -> (StatusCode, Json<PublishEnvelope>) {
    match payload {
        Ok(Json(payload)) => handle_publish(state, payload).await,
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(PublishEnvelope::error(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        ),
    }
}

async fn handle_publish(
    state: AppState,
    payload: PublishPayload,
) -> (StatusCode, Json<PublishEnvelope>) {
    if let Err(message) = validate(&payload) {
        return (
            StatusCode::BAD_REQUEST,
            Json(PublishEnvelope::error(message)),
        );
    }

    info!("Forwarding publish request to {}", state.upstream.name());
    match state.upstream.publish(&payload).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(PublishEnvelope::success(receipt.message, receipt.media_id)),
        ),
        Err(e) => {
            let message = upstream_message(&e);
            warn!("Publish request failed: {}", message);
            (StatusCode::BAD_GATEWAY, Json(PublishEnvelope::error(message)))
        }
    }
}

/// Request validation that runs before any provider call.
fn validate(payload: &PublishPayload) -> Result<(), String> {
    if payload.video_url.trim().is_empty() {
        return Err("videoUrl is required".to_string());
    }
    if !payload.video_url.starts_with("http://") && !payload.video_url.starts_with("https://") {
        return Err("videoUrl must be an http(s) URL".to_string());
    }
    if payload.caption.trim().is_empty() {
        return Err("caption is required".to_string());
    }
    Ok(())
}

/// The provider's own message where one exists, its error Display otherwise.
fn upstream_message(error: &DropdeckError) -> String {
    use libdropdeck::error::PublishError;
    match error {
        DropdeckError::Publish(
            PublishError::Validation(message)
            | PublishError::Network(message)
            | PublishError::Upstream(message),
        ) if !message.trim().is_empty() => message.clone(),
        other => other.to_string(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    libdropdeck::logging::init_default();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> libdropdeck::Result<()> {
    let config = InstagramConfig::from_env()?;
    let state = AppState {
        upstream: Arc::new(InstagramUpstream::new(config)),
    };

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .map_err(|e| DropdeckError::Server(format!("Failed to bind {}: {}", cli.bind, e)))?;
    let addr = listener
        .local_addr()
        .map_err(|e| DropdeckError::Server(format!("Failed to get local addr: {}", e)))?;
    info!("Publish route listening on http://{}/api/instagram/publish", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| DropdeckError::Server(format!("Server error: {}", e)))?;
    Ok(())
}
