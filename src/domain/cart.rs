use serde::{Deserialize, Serialize};

/// A food item waiting in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Food id; unique within the cart.
    pub id: String,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
    pub restaurant: String,
}

impl CartItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: u64,
        restaurant: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity: 1,
            restaurant: restaurant.into(),
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// `None` when price times quantity does not fit in a `u64`.
    pub fn line_total(&self) -> Option<u64> {
        self.price.checked_mul(u64::from(self.quantity))
    }

    /// Display string used on orders, e.g. `2x Jollof Rice`.
    pub fn label(&self) -> String {
        format!("{}x {}", self.quantity, self.name)
    }
}

/// Sum of all line totals, or `None` on overflow.
pub fn cart_total(items: &[CartItem]) -> Option<u64> {
    items
        .iter()
        .try_fold(0u64, |total, item| total.checked_add(item.line_total()?))
}
