use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::Cart;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ManageCartQuery {
    /// One of `increment`, `decrement`, `remove`. Anything else is ignored.
    pub action: Option<String>,
}

/// The session's cart, along with the session key the client should send back.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub session_id: Uuid,
    pub cart: Option<Cart>,
}
