mod common;

use common::{create_admin, create_customer, create_product, setup_state};
use storefront_api::{
    dto::{auth::RegisterRequest, products::CreateProductRequest},
    error::AppError,
    routes::params::ProductQuery,
    services::{auth_service, product_service},
};

fn new_product(title: &str, slug: &str, price: i64) -> CreateProductRequest {
    CreateProductRequest {
        title: title.into(),
        slug: slug.into(),
        description: None,
        marked_price: price,
        selling_price: price,
    }
}

#[tokio::test]
async fn keyword_search_ignores_case() -> anyhow::Result<()> {
    let state = setup_state().await?;
    create_product(&state, "ferris-mug", 100).await?;
    create_product(&state, "axum-hoodie", 300).await?;
    create_product(&state, "ferris-plush", 250).await?;

    let found = product_service::list_products(
        &state,
        ProductQuery {
            q: Some("FERRIS".into()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(found.meta.and_then(|m| m.total), Some(2));
    let found = found.data.expect("products");
    assert!(found.items.iter().all(|p| p.title.contains("ferris")));

    let everything = product_service::list_products(&state, ProductQuery::default()).await?;
    assert_eq!(everything.data.map(|l| l.items.len()), Some(3));
    Ok(())
}

#[tokio::test]
async fn viewing_a_product_counts_the_view() -> anyhow::Result<()> {
    let state = setup_state().await?;
    create_product(&state, "ferris-mug", 100).await?;

    product_service::get_product(&state, "ferris-mug").await?;
    let second = product_service::get_product(&state, "ferris-mug")
        .await?
        .data
        .expect("product");
    assert_eq!(second.view_count, 2);

    let missing = product_service::get_product(&state, "unknown").await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn only_admins_add_products_with_unique_slugs() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = create_admin(&state, "admin@example.com").await?;
    let alice = create_customer(&state, "alice@example.com").await?;

    let created = product_service::create_product(&state, &admin, new_product("Crab Cap", "crab-cap", 80))
        .await?
        .data
        .expect("product");
    assert_eq!(created.view_count, 0);
    assert_eq!(created.selling_price, 80);

    let duplicate =
        product_service::create_product(&state, &admin, new_product("Other Cap", "crab-cap", 90)).await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let negative =
        product_service::create_product(&state, &admin, new_product("Free Cap", "free-cap", -1)).await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));

    let by_customer =
        product_service::create_product(&state, &alice, new_product("Sneaky", "sneaky", 1)).await;
    assert!(matches!(by_customer, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn registration_creates_a_customer_once_per_email() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let request = || RegisterRequest {
        email: "  Alice@Example.com ".into(),
        password: "hunter22".into(),
        full_name: "Alice Example".into(),
        address: Some("1 Crab Lane".into()),
    };

    let user = auth_service::register_user(&state, request())
        .await?
        .data
        .expect("user");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, "customer");

    let again = auth_service::register_user(&state, request()).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));
    Ok(())
}
