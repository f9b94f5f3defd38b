use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutRequest, OrderDetail, ProfileView},
    error::AppResult,
    middleware::{
        auth::{AuthUser, Identity},
        session::SessionId,
    },
    response::ApiResponse,
    services::{order_service, session_service::CartContext},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/profile", get(profile))
        .route("/orders/{id}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    params(
        ("x-session-id" = Uuid, Header, description = "Session key holding the cart")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order created from the session cart", body = ApiResponse<OrderDetail>),
        (status = 303, description = "No active cart (to /) or not logged in as a customer (to /login)"),
        (status = 400, description = "Missing shipping details"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    session: SessionId,
    identity: Identity,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let ctx = CartContext::new(session, identity);
    let resp = order_service::checkout(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Customer details and their orders", body = ApiResponse<ProfileView>),
        (status = 303, description = "Not a customer, redirected to /login"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = order_service::profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order detail with its cart lines", body = ApiResponse<OrderDetail>),
        (status = 303, description = "Order belongs to another customer, redirected to /profile"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}
