use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, ManageCartQuery},
    error::AppResult,
    middleware::{auth::Identity, session::SessionId},
    models::CartAction,
    response::ApiResponse,
    services::{cart_service, session_service::CartContext},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_cart).delete(empty_cart))
        .route("/items", post(add_to_cart))
        .route("/lines/{line_id}", patch(manage_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(
        ("x-session-id" = Option<Uuid>, Header, description = "Session key returned by earlier cart calls")
    ),
    responses(
        (status = 200, description = "The session's cart, if any", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn my_cart(
    State(state): State<AppState>,
    session: SessionId,
    identity: Identity,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let ctx = CartContext::new(session, identity);
    let resp = cart_service::view_cart(&state, &ctx).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    params(
        ("x-session-id" = Option<Uuid>, Header, description = "Session key; a new one is issued when absent")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product added; cart created on first add", body = ApiResponse<CartView>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: SessionId,
    identity: Identity,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let ctx = CartContext::new(session, identity);
    let resp = cart_service::add_to_cart(&state, &ctx, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/lines/{line_id}",
    params(
        ("line_id" = Uuid, Path, description = "Cart line ID"),
        ("x-session-id" = Uuid, Header, description = "Session key"),
        ManageCartQuery
    ),
    responses(
        (status = 200, description = "Line incremented, decremented or removed", body = ApiResponse<CartView>),
        (status = 404, description = "No such line in the session cart"),
    ),
    tag = "Cart"
)]
pub async fn manage_cart(
    State(state): State<AppState>,
    session: SessionId,
    identity: Identity,
    Path(line_id): Path<Uuid>,
    Query(query): Query<ManageCartQuery>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let ctx = CartContext::new(session, identity);
    let action = query.action.as_deref().and_then(CartAction::parse);
    let resp = cart_service::change_quantity(&state, &ctx, line_id, action).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    params(
        ("x-session-id" = Uuid, Header, description = "Session key")
    ),
    responses(
        (status = 200, description = "All lines removed and total reset", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn empty_cart(
    State(state): State<AppState>,
    session: SessionId,
    identity: Identity,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let ctx = CartContext::new(session, identity);
    let resp = cart_service::empty_cart(&state, &ctx).await?;
    Ok(Json(resp))
}
