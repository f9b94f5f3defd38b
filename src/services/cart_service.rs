use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartView},
    entity::{
        cart_lines::{ActiveModel as CartLineActive, Column as LineCol, Entity as CartLines},
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts, Model as CartModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::{Cart, CartAction, CartLine},
    response::{ApiResponse, Meta},
    services::session_service::{self, CartContext},
    state::AppState,
};

pub async fn view_cart(state: &AppState, ctx: &CartContext) -> AppResult<ApiResponse<CartView>> {
    let cart_id = session_service::bind_customer(&state.orm, ctx).await?;
    let cart = match cart_id {
        Some(id) => load_cart(&state.orm, id).await?,
        None => None,
    };
    Ok(ApiResponse::success(
        "OK",
        CartView {
            session_id: ctx.session.0,
            cart,
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    ctx: &CartContext,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let txn = state.orm.begin().await?;
    session_service::bind_customer(&txn, ctx).await?;

    let product = Products::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let cart = match session_service::lock_session_cart(&txn, ctx.session).await? {
        Some(cart) => cart,
        None => create_cart(&txn, ctx).await?,
    };

    let existing = CartLines::find()
        .filter(LineCol::CartId.eq(cart.id))
        .filter(LineCol::ProductId.eq(product.id))
        .one(&txn)
        .await?;

    let added = match existing {
        Some(line) => {
            let amount = line_amount(line.rate, quantity)?;
            CartLines::update_many()
                .col_expr(LineCol::Quantity, Expr::col(LineCol::Quantity).add(quantity))
                .col_expr(LineCol::Subtotal, Expr::col(LineCol::Subtotal).add(amount))
                .filter(LineCol::Id.eq(line.id))
                .exec(&txn)
                .await?;
            amount
        }
        None => {
            let rate = product.selling_price;
            let amount = line_amount(rate, quantity)?;
            CartLineActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(product.id),
                rate: Set(rate),
                quantity: Set(quantity),
                subtotal: Set(amount),
                created_at: Set(now()),
            }
            .insert(&txn)
            .await?;
            amount
        }
    };

    adjust_total(&txn, cart.id, added).await?;
    txn.commit().await?;

    tracing::debug!(cart_id = %cart.id, product_id = %product.id, quantity, added, "added to cart");
    audit::record(
        &state.orm,
        ctx.identity.user_id(),
        "cart_add",
        "cart_lines",
        serde_json::json!({ "cart_id": cart.id, "product_id": product.id, "quantity": quantity }),
    )
    .await;

    cart_view(state, ctx, cart.id, "Added to cart").await
}

/// Apply `action` to one line of the session cart. `None` stands for an
/// unrecognised action and leaves the cart untouched.
pub async fn change_quantity(
    state: &AppState,
    ctx: &CartContext,
    line_id: Uuid,
    action: Option<CartAction>,
) -> AppResult<ApiResponse<CartView>> {
    let Some(action) = action else {
        return view_cart(state, ctx).await;
    };

    let txn = state.orm.begin().await?;
    session_service::bind_customer(&txn, ctx).await?;

    let cart = session_service::lock_session_cart(&txn, ctx.session)
        .await?
        .ok_or(AppError::NotFound)?;
    let line = CartLines::find_by_id(line_id)
        .filter(LineCol::CartId.eq(cart.id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    match action {
        CartAction::Increment => {
            step_line(&txn, line.id, 1, line.rate).await?;
            adjust_total(&txn, cart.id, line.rate).await?;
        }
        CartAction::Decrement => {
            step_line(&txn, line.id, -1, -line.rate).await?;
            adjust_total(&txn, cart.id, -line.rate).await?;
            let remaining = CartLines::find_by_id(line.id).one(&txn).await?;
            if remaining.is_some_and(|l| l.quantity <= 0) {
                CartLines::delete_by_id(line.id).exec(&txn).await?;
            }
        }
        CartAction::Remove => {
            adjust_total(&txn, cart.id, -line.subtotal).await?;
            CartLines::delete_by_id(line.id).exec(&txn).await?;
        }
    }
    txn.commit().await?;

    tracing::debug!(cart_id = %cart.id, %line_id, ?action, "cart line changed");
    audit::record(
        &state.orm,
        ctx.identity.user_id(),
        "cart_change",
        "cart_lines",
        serde_json::json!({ "cart_id": cart.id, "line_id": line_id, "action": format!("{action:?}") }),
    )
    .await;

    cart_view(state, ctx, cart.id, "Cart updated").await
}

/// Delete every line of the session cart and reset its total. The cart itself stays.
pub async fn empty_cart(state: &AppState, ctx: &CartContext) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    session_service::bind_customer(&txn, ctx).await?;

    let Some(cart) = session_service::lock_session_cart(&txn, ctx.session).await? else {
        txn.commit().await?;
        return Ok(ApiResponse::success(
            "Cart is empty",
            CartView {
                session_id: ctx.session.0,
                cart: None,
            },
            Some(Meta::empty()),
        ));
    };

    CartLines::delete_many()
        .filter(LineCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    Carts::update_many()
        .col_expr(CartCol::Total, Expr::value(0i64))
        .col_expr(CartCol::UpdatedAt, Expr::value(now()))
        .filter(CartCol::Id.eq(cart.id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::debug!(cart_id = %cart.id, "cart emptied");
    audit::record(
        &state.orm,
        ctx.identity.user_id(),
        "cart_empty",
        "carts",
        serde_json::json!({ "cart_id": cart.id }),
    )
    .await;

    cart_view(state, ctx, cart.id, "Cart emptied").await
}

/// A cart and its lines, with product titles, oldest line first.
pub async fn load_cart<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<Option<Cart>> {
    let Some(cart) = Carts::find_by_id(cart_id).one(conn).await? else {
        return Ok(None);
    };
    let lines = load_lines(conn, cart.id).await?;
    Ok(Some(cart_from_entity(cart, lines)))
}

pub async fn load_lines<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = CartLines::find()
        .filter(LineCol::CartId.eq(cart_id))
        .order_by_asc(LineCol::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(line, product)| CartLine {
            id: line.id,
            product_id: line.product_id,
            product_title: product.map(|p| p.title).unwrap_or_default(),
            rate: line.rate,
            quantity: line.quantity,
            subtotal: line.subtotal,
        })
        .collect())
}

async fn create_cart<C: ConnectionTrait>(conn: &C, ctx: &CartContext) -> AppResult<CartModel> {
    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(ctx.identity.customer().map(|c| c.user_id)),
        total: Set(0),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(conn)
    .await?;
    session_service::attach_cart(conn, ctx.session, cart.id).await?;
    tracing::info!(cart_id = %cart.id, session_id = %ctx.session.0, "cart created");
    Ok(cart)
}

/// Shift a line's quantity and subtotal in the store, without reading them first.
async fn step_line<C: ConnectionTrait>(
    conn: &C,
    line_id: Uuid,
    quantity: i32,
    amount: i64,
) -> AppResult<()> {
    CartLines::update_many()
        .col_expr(LineCol::Quantity, Expr::col(LineCol::Quantity).add(quantity))
        .col_expr(LineCol::Subtotal, Expr::col(LineCol::Subtotal).add(amount))
        .filter(LineCol::Id.eq(line_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn adjust_total<C: ConnectionTrait>(conn: &C, cart_id: Uuid, delta: i64) -> AppResult<()> {
    Carts::update_many()
        .col_expr(CartCol::Total, Expr::col(CartCol::Total).add(delta))
        .col_expr(CartCol::UpdatedAt, Expr::value(now()))
        .filter(CartCol::Id.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn cart_view(
    state: &AppState,
    ctx: &CartContext,
    cart_id: Uuid,
    message: &str,
) -> AppResult<ApiResponse<CartView>> {
    let cart = load_cart(&state.orm, cart_id).await?;
    Ok(ApiResponse::success(
        message,
        CartView {
            session_id: ctx.session.0,
            cart,
        },
        Some(Meta::empty()),
    ))
}

fn line_amount(rate: i64, quantity: i32) -> AppResult<i64> {
    rate.checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::BadRequest("line amount out of range".into()))
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn cart_from_entity(model: CartModel, lines: Vec<CartLine>) -> Cart {
    Cart {
        id: model.id,
        customer_id: model.customer_id,
        total: model.total,
        lines,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
