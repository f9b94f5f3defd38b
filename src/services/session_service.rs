use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
    sea_query::{Expr, LockType},
};
use uuid::Uuid;

use crate::{
    entity::{
        cart_sessions::{
            ActiveModel as CartSessionActive, Column as SessionCol, Entity as CartSessions,
        },
        carts::{Column as CartCol, Entity as Carts, Model as CartModel},
    },
    error::AppResult,
    middleware::{auth::Identity, session::SessionId},
};

/// Session and caller for a cart or checkout operation.
#[derive(Debug, Clone)]
pub struct CartContext {
    pub session: SessionId,
    pub identity: Identity,
}

impl CartContext {
    pub fn new(session: SessionId, identity: Identity) -> Self {
        Self { session, identity }
    }
}

pub async fn current_cart_id<C: ConnectionTrait>(
    conn: &C,
    session: SessionId,
) -> AppResult<Option<Uuid>> {
    let row = CartSessions::find_by_id(session.0).one(conn).await?;
    Ok(row.map(|r| r.cart_id))
}

pub async fn attach_cart<C: ConnectionTrait>(
    conn: &C,
    session: SessionId,
    cart_id: Uuid,
) -> AppResult<()> {
    CartSessions::delete_by_id(session.0).exec(conn).await?;
    CartSessionActive {
        session_id: Set(session.0),
        cart_id: Set(cart_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

pub async fn detach_cart<C: ConnectionTrait>(conn: &C, session: SessionId) -> AppResult<()> {
    CartSessions::delete_many()
        .filter(SessionCol::SessionId.eq(session.0))
        .exec(conn)
        .await?;
    Ok(())
}

/// Load the session's cart, taking a row lock for the rest of the transaction.
/// A session pointing at a cart that no longer exists is cleared.
pub async fn lock_session_cart<C: ConnectionTrait>(
    conn: &C,
    session: SessionId,
) -> AppResult<Option<CartModel>> {
    let Some(cart_id) = current_cart_id(conn, session).await? else {
        return Ok(None);
    };

    let cart = Carts::find_by_id(cart_id)
        .lock(LockType::Update)
        .one(conn)
        .await?;
    if cart.is_none() {
        tracing::warn!(session_id = %session.0, %cart_id, "session points at missing cart");
        detach_cart(conn, session).await?;
    }
    Ok(cart)
}

/// Give an anonymous session cart to the authenticated customer. Carts that already
/// have an owner are left alone, so repeating the call is harmless. A cart owned by a
/// different customer is detached from the session and the caller starts afresh.
pub async fn bind_customer<C: ConnectionTrait>(
    conn: &C,
    ctx: &CartContext,
) -> AppResult<Option<Uuid>> {
    let cart_id = current_cart_id(conn, ctx.session).await?;
    let (Some(cart_id), Some(customer)) = (cart_id, ctx.identity.customer()) else {
        return Ok(cart_id);
    };

    let result = Carts::update_many()
        .col_expr(CartCol::CustomerId, Expr::value(customer.user_id))
        .filter(CartCol::Id.eq(cart_id))
        .filter(CartCol::CustomerId.is_null())
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!(%cart_id, customer_id = %customer.user_id, "session cart bound to customer");
        return Ok(Some(cart_id));
    }

    let owner = Carts::find_by_id(cart_id)
        .one(conn)
        .await?
        .and_then(|cart| cart.customer_id);
    if owner.is_some_and(|owner| owner != customer.user_id) {
        tracing::info!(%cart_id, customer_id = %customer.user_id, "session cart belongs to another customer, detached");
        detach_cart(conn, ctx.session).await?;
        return Ok(None);
    }
    Ok(Some(cart_id))
}
