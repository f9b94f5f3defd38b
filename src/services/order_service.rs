use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderDetail, ProfileView},
    entity::{
        carts::{Column as CartCol, Entity as Carts},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult, RedirectTo},
    middleware::auth::AuthUser,
    models::{Order, OrderStatus, User},
    response::{ApiResponse, Meta},
    services::{
        cart_service,
        session_service::{self, CartContext},
    },
    state::AppState,
};

/// Turn the session cart into an order and detach the cart from the session.
pub async fn checkout(
    state: &AppState,
    ctx: &CartContext,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let customer = ctx
        .identity
        .customer()
        .cloned()
        .ok_or(AppError::Redirect(RedirectTo::Login))?;

    let CheckoutRequest {
        ordered_by,
        shipping_address,
        mobile,
        email,
    } = payload;
    let ordered_by = required("ordered_by", ordered_by)?;
    let shipping_address = required("shipping_address", shipping_address)?;
    let mobile = required("mobile", mobile)?;
    let email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());

    let txn = state.orm.begin().await?;
    session_service::bind_customer(&txn, ctx).await?;

    let cart = session_service::lock_session_cart(&txn, ctx.session)
        .await?
        .filter(|cart| cart.customer_id.is_none_or(|owner| owner == customer.user_id))
        .ok_or(AppError::Redirect(RedirectTo::Home))?;

    let now = Utc::now();
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart.id),
        ordered_by: Set(ordered_by),
        shipping_address: Set(shipping_address),
        mobile: Set(mobile),
        email: Set(email),
        subtotal: Set(cart.total),
        discount: Set(0),
        total: Set(cart.total),
        order_status: Set(OrderStatus::Received.as_str().to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    session_service::detach_cart(&txn, ctx.session).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        cart_id = %cart.id,
        customer_id = %customer.user_id,
        total = order.total,
        "order created"
    );
    audit::record(
        &state.orm,
        Some(customer.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "cart_id": cart.id, "total": order.total }),
    )
    .await;

    let lines = cart_service::load_lines(&state.orm, cart.id).await?;
    Ok(ApiResponse::success(
        "Order received",
        OrderDetail {
            order: order_from_entity(order)?,
            lines,
        },
        Some(Meta::empty()),
    ))
}

/// Order detail for its owner or an administrator. Other customers are sent to their profile.
pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !user.is_admin() {
        let owner = Carts::find_by_id(order.cart_id)
            .one(&state.orm)
            .await?
            .and_then(|cart| cart.customer_id);
        if owner != Some(user.user_id) {
            tracing::info!(order_id = %id, user_id = %user.user_id, "order view by non-owner");
            return Err(AppError::Redirect(RedirectTo::Profile));
        }
    }

    let detail = order_detail(state, order).await?;
    Ok(ApiResponse::success("OK", detail, Some(Meta::empty())))
}

pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ProfileView>> {
    if !user.is_customer() {
        return Err(AppError::Redirect(RedirectTo::Login));
    }

    let customer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Redirect(RedirectTo::Login))?;

    let orders = Orders::find()
        .inner_join(Carts)
        .filter(CartCol::CustomerId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::single_page(orders.len());
    Ok(ApiResponse::success(
        "OK",
        ProfileView {
            customer: user_from_entity(customer),
            orders,
        },
        Some(meta),
    ))
}

pub(crate) async fn order_detail(state: &AppState, order: OrderModel) -> AppResult<OrderDetail> {
    let lines = cart_service::load_lines(&state.orm, order.cart_id).await?;
    Ok(OrderDetail {
        order: order_from_entity(order)?,
        lines,
    })
}

pub(crate) fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let order_status = model
        .order_status
        .parse::<OrderStatus>()
        .map_err(|err| AppError::Internal(err.into()))?;
    Ok(Order {
        id: model.id,
        cart_id: model.cart_id,
        ordered_by: model.ordered_by,
        shipping_address: model.shipping_address,
        mobile: model.mobile,
        email: model.email,
        subtotal: model.subtotal,
        discount: model.discount,
        total: model.total,
        order_status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        address: model.address,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn required(field: &str, value: String) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}
