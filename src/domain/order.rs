use std::fmt;

use serde::{Deserialize, Serialize};

use super::cart::{cart_total, CartItem};

/// Preparation estimate shown for every new order, in minutes.
pub const DEFAULT_ESTIMATED_MINUTES: u32 = 30;

/// Order lifecycle. Moves strictly forward; there is no cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub restaurant_name: String,
    pub items: Vec<String>,
    pub total: u64,
    pub status: OrderStatus,
    pub estimated_time: u32,
    pub timestamp: i64,
}

/// Payload for creating a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCreate {
    pub restaurant_name: String,
    pub items: Vec<String>,
    pub total: u64,
}

impl OrderCreate {
    /// Snapshots a cart. Restaurants are listed once, in cart order.
    /// `None` when the cart total overflows.
    pub fn from_cart(items: &[CartItem]) -> Option<Self> {
        let total = cart_total(items)?;
        let mut restaurants: Vec<&str> = Vec::new();
        for item in items {
            if !restaurants.contains(&item.restaurant.as_str()) {
                restaurants.push(&item.restaurant);
            }
        }

        Some(Self {
            restaurant_name: restaurants.join(", "),
            items: items.iter().map(CartItem::label).collect(),
            total,
        })
    }
}
