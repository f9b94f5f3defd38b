use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, Func};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

/// Newest products first, optionally narrowed by a case-insensitive title keyword.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(keyword) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", keyword.to_lowercase());
        condition = condition.add(Expr::expr(Func::lower(Expr::col(Column::Title))).like(pattern));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

/// Product detail by slug. Each lookup counts as a view.
pub async fn get_product(state: &AppState, slug: &str) -> AppResult<ApiResponse<Product>> {
    let product = Products::find()
        .filter(Column::Slug.eq(slug))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Products::update_many()
        .col_expr(Column::ViewCount, Expr::col(Column::ViewCount).add(1i64))
        .filter(Column::Id.eq(product.id))
        .exec(&state.orm)
        .await?;

    let mut product = product_from_entity(product);
    product.view_count += 1;
    Ok(ApiResponse::success("OK", product, Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let title = payload.title.trim().to_string();
    let slug = payload.slug.trim().to_string();
    if title.is_empty() || slug.is_empty() {
        return Err(AppError::BadRequest("title and slug are required".into()));
    }
    if payload.marked_price < 0 || payload.selling_price < 0 {
        return Err(AppError::BadRequest("prices must not be negative".into()));
    }

    let taken = Products::find()
        .filter(Column::Slug.eq(slug.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::BadRequest("slug is already taken".into()));
    }

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        slug: Set(slug),
        description: Set(payload.description),
        marked_price: Set(payload.marked_price),
        selling_price: Set(payload.selling_price),
        view_count: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

/// Admin listing, most recently added first.
pub async fn list_products_admin(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    list_products(state, query).await
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        title: model.title,
        slug: model.slug,
        description: model.description,
        marked_price: model.marked_price,
        selling_price: model.selling_price,
        view_count: model.view_count,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
