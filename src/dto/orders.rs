use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CartLine, Order, OrderStatus, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub ordered_by: String,
    pub shipping_address: String,
    pub mobile: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub customer: User,
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusOptions {
    pub statuses: Vec<OrderStatus>,
}
