use crate::backend::{BrowseBackend, SolrBrowseBackend};
use crate::prelude::*;
use crate::service::BrowseService;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "ALPHABROWSE_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "ALPHABROWSE_HOST", default_value = "127.0.0.1")]
    pub host: String,
}

#[derive(Debug, Deserialize)]
struct BrowseParams {
    #[serde(default)]
    source: String,
    from: Option<String>,
    #[serde(default)]
    page: i64,
}

#[derive(Debug, Deserialize)]
struct NearbyParams {
    #[serde(default)]
    from: String,
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    let config = crate::settings::load(&global)?;
    let backend = SolrBrowseBackend::new(&config.backend)?;
    log::info!("Using browse handler at {}", backend.handler_url());

    let service = Arc::new(BrowseService::new(config, backend));
    let addr = format!("{}:{}", options.host, options.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    log::info!("Listening on http://{addr}");
    log::info!("Browse endpoint: http://{addr}/alphabrowse");
    log::info!("MCP endpoints: http://{addr}/sse, http://{addr}/message");

    axum::serve(listener, router(service))
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

pub fn router<B: BrowseBackend + 'static>(service: Arc<BrowseService<B>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/alphabrowse", get(browse_handler::<B>))
        .route("/alphabrowse/types", get(types_handler::<B>))
        .route("/alphabrowse/nearby", get(nearby_handler::<B>))
        .route("/health", get(|| async { "ok" }))
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler::<B>))
        .layer(cors)
        .with_state(service)
}

fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
        Error::Backend(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    log::debug!("Request failed with {status}: {err}");
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

async fn browse_handler<B: BrowseBackend>(
    State(service): State<Arc<BrowseService<B>>>,
    Query(params): Query<BrowseParams>,
) -> Response {
    match service.browse(&params.source, params.from, params.page).await {
        Ok(output) => Json(output).into_response(),
        Err(err) => error_response(err),
    }
}

async fn types_handler<B: BrowseBackend>(
    State(service): State<Arc<BrowseService<B>>>,
) -> Response {
    Json(service.types().to_vec()).into_response()
}

async fn nearby_handler<B: BrowseBackend>(
    State(service): State<Arc<BrowseService<B>>>,
    Query(params): Query<NearbyParams>,
) -> Response {
    match service.nearby(&params.from).await {
        Ok(output) => Json(output).into_response(),
        Err(err) => error_response(err),
    }
}

async fn sse_handler() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = stream::once(async { Ok(Event::default().data("MCP SSE endpoint ready")) });
    Sse::new(stream)
}

async fn message_handler<B: BrowseBackend>(
    State(service): State<Arc<BrowseService<B>>>,
    Json(request): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let request_str = serde_json::to_string(&request).unwrap_or_default();
    let response = crate::mcp::handle_request(&request_str, service.as_ref()).await;
    Json(serde_json::to_value(response).unwrap_or(serde_json::Value::Null))
}
