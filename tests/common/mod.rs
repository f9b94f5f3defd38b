#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, EntityTrait, Schema, Set,
};
use storefront_api::{
    entity::{
        AuditLogs, CartLines, CartSessions, Carts, Orders, Products, Users,
        products::ActiveModel as ProductActive, users::ActiveModel as UserActive,
    },
    middleware::{
        auth::{AuthUser, Identity},
        session::SessionId,
    },
    models::{Cart, ROLE_ADMIN, ROLE_CUSTOMER},
    services::session_service::CartContext,
    state::AppState,
};
use uuid::Uuid;

/// Fresh in-memory SQLite database with the schema built from the entities.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would get its own in-memory database.
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;

    let backend = orm.get_database_backend();
    let schema = Schema::new(backend);
    orm.execute(backend.build(&schema.create_table_from_entity(Users)))
        .await?;
    orm.execute(backend.build(&schema.create_table_from_entity(Products)))
        .await?;
    orm.execute(backend.build(&schema.create_table_from_entity(Carts)))
        .await?;
    orm.execute(backend.build(&schema.create_table_from_entity(CartLines)))
        .await?;
    orm.execute(backend.build(&schema.create_table_from_entity(CartSessions)))
        .await?;
    orm.execute(backend.build(&schema.create_table_from_entity(Orders)))
        .await?;
    orm.execute(backend.build(&schema.create_table_from_entity(AuditLogs)))
        .await?;

    Ok(AppState::new(orm))
}

pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        full_name: Set(format!("Test {role}")),
        address: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn create_customer(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    create_user(state, ROLE_CUSTOMER, email).await
}

pub async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<AuthUser> {
    create_user(state, ROLE_ADMIN, email).await
}

pub async fn create_product(state: &AppState, slug: &str, price: i64) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        title: Set(slug.replace('-', " ")),
        slug: Set(slug.to_string()),
        description: Set(None),
        marked_price: Set(price),
        selling_price: Set(price),
        view_count: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

pub async fn set_price(state: &AppState, product_id: Uuid, price: i64) -> anyhow::Result<()> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product missing"))?;
    let mut active: ProductActive = product.into();
    active.selling_price = Set(price);
    active.update(&state.orm).await?;
    Ok(())
}

pub fn anonymous(session: SessionId) -> CartContext {
    CartContext::new(session, Identity::Anonymous)
}

pub fn signed_in(session: SessionId, user: &AuthUser) -> CartContext {
    CartContext::new(session, Identity::User(user.clone()))
}

/// Running total equals the sum of line subtotals, and every line is priced at its rate.
pub fn assert_consistent(cart: &Cart) {
    let sum: i64 = cart.lines.iter().map(|line| line.subtotal).sum();
    assert_eq!(cart.total, sum, "cart total drifted from line subtotals");
    for line in &cart.lines {
        assert!(line.quantity >= 1, "line {} kept with quantity {}", line.id, line.quantity);
        assert_eq!(line.subtotal, line.rate * i64::from(line.quantity));
    }
}

pub fn line_for(cart: &Cart, product_id: Uuid) -> Option<&storefront_api::models::CartLine> {
    cart.lines.iter().find(|line| line.product_id == product_id)
}
