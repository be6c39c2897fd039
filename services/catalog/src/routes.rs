//! Catalog service routes
//!
//! Handlers are generic over the resource kind; each route instantiates them
//! for movies or users and extracts the matching pipeline from the state.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::{
    error::ApiResult,
    models::{Movie, User},
    pipeline::Pipeline,
    resource::Resource,
    state::AppState,
    validation::Payload,
};

/// Create the router for the catalog service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/movies", get(list::<Movie>).post(create::<Movie>))
        .route(
            "/api/movies/:id",
            get(show::<Movie>).put(update::<Movie>).delete(destroy::<Movie>),
        )
        .route("/api/users", get(list::<User>).post(create::<User>))
        .route(
            "/api/users/:id",
            get(show::<User>).put(update::<User>).delete(destroy::<User>),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.movies.health_check().await && state.users.health_check().await;
    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "catalog"
        })),
    )
}

/// List rows matching the query-string filters
pub async fn list<R: Resource>(
    State(pipeline): State<Pipeline<R>>,
    Query(filters): Query<R::Filters>,
) -> ApiResult<Json<Vec<R::Record>>> {
    Ok(Json(pipeline.list(&filters).await?))
}

/// Get a row by id
pub async fn show<R: Resource>(
    State(pipeline): State<Pipeline<R>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<R::Record>> {
    Ok(Json(pipeline.get(id).await?))
}

/// Create a row
pub async fn create<R: Resource>(
    State(pipeline): State<Pipeline<R>>,
    Json(payload): Json<Payload>,
) -> ApiResult<(StatusCode, Json<R::Record>)> {
    let record = pipeline.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Merge the submitted fields into an existing row
pub async fn update<R: Resource>(
    State(pipeline): State<Pipeline<R>>,
    Path(id): Path<i64>,
    Json(payload): Json<Payload>,
) -> ApiResult<Json<R::Record>> {
    Ok(Json(pipeline.update(id, &payload).await?))
}

/// Delete a row by id
pub async fn destroy<R: Resource>(
    State(pipeline): State<Pipeline<R>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    pipeline.delete(id).await?;
    Ok(Json(json!({
        "message": format!("{} deleted", R::KIND.label())
    })))
}
