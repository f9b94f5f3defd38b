use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartView},
        orders::{CheckoutRequest, OrderDetail, OrderList, OrderStatusOptions, ProfileView, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList},
    },
    models::{Cart, CartLine, Order, OrderStatus, Product, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, orders, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        products::list_products,
        products::get_product,
        cart::my_cart,
        cart::add_to_cart,
        cart::manage_cart,
        cart::empty_cart,
        orders::checkout,
        orders::profile,
        orders::get_order,
        admin::list_all_orders,
        admin::list_pending_orders,
        admin::order_statuses,
        admin::get_order_admin,
        admin::update_order_status,
        admin::list_products,
        admin::create_product
    ),
    components(
        schemas(
            User,
            Product,
            Cart,
            CartLine,
            Order,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            CartView,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderDetail,
            OrderList,
            OrderStatusOptions,
            ProfileView,
            CreateProductRequest,
            ProductList,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<OrderDetail>,
            ApiResponse<OrderList>,
            ApiResponse<ProfileView>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Session cart endpoints"),
        (name = "Orders", description = "Checkout, profile and order endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
