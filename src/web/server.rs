use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::{registry_prefix, ServeArgs};
use crate::core::chromosome::normalize_chromosome;
use crate::core::types::Chromosome;
use crate::query::{OverlapQuery, RegionHit, DEFAULT_LIMIT};
use crate::registry::AccessionRegistry;
use crate::store::{CoordinateReader, FileStore, ReadHandle};

/// Upper bound on `limit` accepted from clients
pub const MAX_QUERY_LIMIT: usize = 10_000;

/// Shared application state: one read snapshot and its registry
pub struct AppState {
    pub store: ReadHandle,
    pub registry: AccessionRegistry,
}

/// Error body returned for rejected requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Query string for region and file lookups
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    pub chrom: String,
    pub start: i32,
    pub end: i32,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsResponse {
    pub chrom: String,
    pub start: i32,
    pub end: i32,
    pub limit: usize,
    pub regions: Vec<RegionHit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilesResponse {
    pub chrom: String,
    pub start: i32,
    pub end: i32,
    pub limit: usize,
    pub accessions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistryResponse {
    pub accessions: usize,
    pub base: i32,
    pub next_index: i32,
    pub gap: i32,
}

fn bad_request(error_type: &str, message: String) -> ApiError {
    tracing::debug!("Rejected request ({}): {}", error_type, message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            error_type: error_type.to_string(),
        }),
    )
}

fn internal_error(internal: &str) -> ApiError {
    // Log detailed error server-side, never expose it
    tracing::error!("Internal error: {}", internal);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Query failed".to_string(),
            error_type: "internal".to_string(),
        }),
    )
}

/// Validate window parameters into (chromosome, limit)
fn validate_window(params: &WindowParams) -> Result<(Chromosome, usize), ApiError> {
    let chromosome = normalize_chromosome(&params.chrom)
        .map_err(|e| bad_request("invalid_chromosome", e.to_string()))?;
    if params.start > params.end {
        return Err(bad_request(
            "invalid_window",
            format!("start {} is after end {}", params.start, params.end),
        ));
    }
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_QUERY_LIMIT);
    Ok((chromosome, limit))
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the store or registry cannot be loaded, the tokio
/// runtime cannot be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let state = Arc::new(load_state(&args)?);

    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Open the store snapshot and its registry; a store with no registry yet
/// serves empty results
///
/// # Errors
///
/// Returns an error if the store is locked or missing, or the registry is
/// unreadable.
pub fn load_state(args: &ServeArgs) -> anyhow::Result<AppState> {
    let store = FileStore::open_read(&args.store)?;
    let prefix = registry_prefix(&args.store, args.registry.as_deref());
    let registry = AccessionRegistry::from_snapshot_or_new(&prefix, 0)?;
    Ok(AppState { store, registry })
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    let app = Router::new()
        .route("/api/query", get(query_handler))
        .route("/api/files", get(files_handler))
        .route("/api/registry", get(registry_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                // IP-based rate limiting to prevent abuse
                .layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                })
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(100)),
        );

    Ok(app)
}

async fn run_server(args: ServeArgs, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting region-index server at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Overlapping regions with accessions
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Result<Json<RegionsResponse>, ApiError> {
    let (chromosome, limit) = validate_window(&params)?;
    let regions = OverlapQuery::new(&state.store, &state.registry)
        .query_by_accession(chromosome, params.start, params.end, limit)
        .map_err(|e| internal_error(&e.to_string()))?;

    Ok(Json(RegionsResponse {
        chrom: chromosome.label(),
        start: params.start,
        end: params.end,
        limit,
        regions,
    }))
}

/// Distinct overlapping accessions
pub async fn files_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> Result<Json<FilesResponse>, ApiError> {
    let (chromosome, limit) = validate_window(&params)?;
    let accessions = OverlapQuery::new(&state.store, &state.registry)
        .query_files(chromosome, params.start, params.end, limit)
        .map_err(|e| internal_error(&e.to_string()))?;

    Ok(Json(FilesResponse {
        chrom: chromosome.label(),
        start: params.start,
        end: params.end,
        limit,
        accessions,
    }))
}

/// Registry and store summary
pub async fn registry_handler(State(state): State<Arc<AppState>>) -> Json<RegistryResponse> {
    Json(RegistryResponse {
        accessions: state.registry.len(),
        base: state.registry.base(),
        next_index: state.registry.next_index(),
        gap: state.store.gap(),
    })
}
