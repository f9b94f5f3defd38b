use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    models::{ROLE_ADMIN, ROLE_CUSTOMER},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@example.com", "admin123", "Store Admin", ROLE_ADMIN).await?;
    let customer_id =
        ensure_user(&orm, "customer@example.com", "customer123", "Sample Customer", ROLE_CUSTOMER)
            .await?;
    seed_products(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    full_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    // If user already exists, keep it
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        full_name: Set(full_name.to_string()),
        address: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = vec![
        ("Axum Hoodie", "axum-hoodie", "Warm hoodie for Rustaceans", 600000, 550000),
        ("Ferris Mug", "ferris-mug", "Coffee tastes better with Ferris", 150000, 120000),
        ("Rust Sticker Pack", "rust-sticker-pack", "Decorate your laptop", 50000, 50000),
        ("E-book: Async Rust", "ebook-async-rust", "Learn async Rust patterns", 300000, 250000),
    ];

    for (title, slug, desc, marked_price, selling_price) in products {
        let exists = Products::find()
            .filter(ProductCol::Slug.eq(slug))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        ProductActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(Some(desc.to_string())),
            marked_price: Set(marked_price),
            selling_price: Set(selling_price),
            view_count: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
