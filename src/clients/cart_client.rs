use tokio::sync::mpsc;

use crate::cart_actor::CartError;
use crate::domain::{cart_total, CartItem};
use crate::messages::CartRequest;

/// Client for the cart.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    pub async fn total(&self) -> Result<u64, CartError> {
        cart_total(&self.items().await?).ok_or(CartError::TotalOverflow)
    }
}

client_method!(CartClient => fn add_item(item: CartItem) -> Vec<CartItem> as CartRequest::AddItem, Error = CartError);
client_method!(CartClient => fn update_quantity(id: String, quantity: u32) -> Vec<CartItem> as CartRequest::UpdateQuantity, Error = CartError);
client_method!(CartClient => fn remove_item(id: String) -> Vec<CartItem> as CartRequest::RemoveItem, Error = CartError);
client_method!(CartClient => fn clear() -> () as CartRequest::Clear, Error = CartError);
client_method!(CartClient => fn items() -> Vec<CartItem> as CartRequest::Items, Error = CartError);
client_shutdown!(CartClient, CartRequest, CartError);
