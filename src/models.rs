use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const ROLE_CUSTOMER: &str = "customer";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub address: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub marked_price: i64,
    pub selling_price: i64,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_title: String,
    pub rate: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub total: i64,
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub ordered_by: String,
    pub shipping_address: String,
    pub mobile: String,
    pub email: Option<String>,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fulfilment state of an order. Only administrators move an order between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[serde(rename = "Order Received")]
    Received,
    #[serde(rename = "Order Processing")]
    Processing,
    #[serde(rename = "On the way")]
    OnTheWay,
    #[serde(rename = "Order Completed")]
    Completed,
    #[serde(rename = "Order Canceled")]
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::Processing,
        OrderStatus::OnTheWay,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Order Received",
            OrderStatus::Processing => "Order Processing",
            OrderStatus::OnTheWay => "On the way",
            OrderStatus::Completed => "Order Completed",
            OrderStatus::Canceled => "Order Canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }

    /// Whether an administrator may move an order from `self` to `next`.
    /// Re-applying the current status is always allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOrderStatus(pub String);

impl fmt::Display for UnknownOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status: {}", self.0)
    }
}

impl std::error::Error for UnknownOrderStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownOrderStatus(s.to_string()))
    }
}

/// Quantity change requested on an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Increment,
    Decrement,
    Remove,
}

impl CartAction {
    /// Unrecognised actions yield `None` and are ignored by the cart.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "increment" | "inc" => Some(CartAction::Increment),
            "decrement" | "dcr" => Some(CartAction::Decrement),
            "remove" | "rmv" => Some(CartAction::Remove),
            _ => None,
        }
    }
}
