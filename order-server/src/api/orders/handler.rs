//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use http::StatusCode;
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::services::RequestContext;
use shared::{
    AppError, AppResult, CreateOrderRequest, CreateOrderResponse, ErrorCode, GetOrderResponse,
};

const DEFAULT_LIST_LIMIT: usize = 20;

/// POST /api/v1/orders - create an order
pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
    if payload.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let ctx = RequestContext::from_headers(&headers);
    let created = state.order_service.create_order(payload, &ctx).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: created.order.id,
            status: created.order.status,
            total_amount: created.order.total_amount,
            message: "Order created successfully".to_string(),
        }),
    ))
}

/// GET /api/v1/orders/{id} - fetch a single order
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<GetOrderResponse>> {
    let order = state.order_service.get_order(&id).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/users/{user_id}/orders - list a user's orders, newest first
pub async fn list_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<GetOrderResponse>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let orders = state
        .order_service
        .get_orders_by_user(&user_id, limit)
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}
