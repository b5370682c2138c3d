use crate::domain::payment::{CreateOrderRequest, VerifyRequest};
use crate::http::middleware::auth::AuthedUser;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(req): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    match state.order_service.create_order(user.user_id, req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn verify(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    match state.verify_service.verify(user.user_id, req).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    match state.payments.history(user.user_id, limit, offset).await {
        Ok(payments) => (
            axum::http::StatusCode::OK,
            Json(serde_json::json!({
                "payments": payments,
                "page": page,
                "limit": limit
            })),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
