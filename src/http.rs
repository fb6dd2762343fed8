use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::core::types::{BatchProductResponse, ErrorResponse, ProductInfoRequest};
use crate::core::AppState;

pub const NO_DATA_MESSAGE: &str = "Could not extract product data";

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Build the HTTP router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/product/info", post(product_info_handler))
        .route("/api/v1/product/info", post(product_info_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "product-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Accept only absolute http(s) URLs.
fn validate_url(raw: &str) -> Result<(), HandlerError> {
    match url::Url::parse(raw.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => Ok(()),
        Ok(u) => Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("unsupported URL scheme '{}': {}", u.scheme(), raw),
        )),
        Err(e) => Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("invalid URL '{}': {}", raw, e),
        )),
    }
}

async fn product_info_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProductInfoRequest>,
) -> Result<Response, HandlerError> {
    match request {
        ProductInfoRequest::Single { url } => single_product(&state, url.trim()).await,
        ProductInfoRequest::Batch { urls } => batch_products(&state, urls).await,
    }
}

async fn single_product(state: &AppState, url: &str) -> Result<Response, HandlerError> {
    validate_url(url)?;
    info!("Product info request: {}", url);

    match state.pipeline.run(url).await.into_outcome() {
        Ok(Some(record)) => Ok(Json(record).into_response()),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, NO_DATA_MESSAGE)),
        Err(failure) => {
            error!("Pipeline error for {}: {}", url, failure);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                failure.to_string(),
            ))
        }
    }
}

async fn batch_products(state: &AppState, urls: Vec<String>) -> Result<Response, HandlerError> {
    if urls.is_empty() {
        return Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "urls must not be empty",
        ));
    }
    let urls: Vec<String> = urls.into_iter().map(|u| u.trim().to_string()).collect();
    for url in &urls {
        validate_url(url)?;
    }

    let outcomes = state.pipeline.run_batch(urls).await;
    let statuses: Vec<_> = outcomes.iter().map(|o| o.status()).collect();
    let products: Vec<_> = outcomes
        .into_iter()
        .filter_map(|o| o.result.ok().flatten())
        .collect();

    if products.is_empty() {
        warn!("All {} batch URLs failed", statuses.len());
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "Failed to extract product data from all {} URLs",
                statuses.len()
            ),
        ));
    }

    Ok(Json(BatchProductResponse { products, statuses }).into_response())
}
