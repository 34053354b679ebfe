use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::CartClient;
use crate::domain::{cart_total, CartItem};
use crate::messages::{CartRequest, ServiceResponse};
use crate::store::{keys, load_json, save_json, SharedStore};

use super::error::CartError;

// =============================================================================
// CART SERVICE
// =============================================================================

pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    store: SharedStore,
    items: Vec<CartItem>,
}

impl CartService {
    pub fn new(buffer_size: usize, store: SharedStore) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            store,
            items: Vec::new(),
        };
        let client = CartClient::new(sender);
        (service, client)
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        let stored: Vec<CartItem> = load_json(self.store.as_ref(), keys::CART_ITEMS).unwrap_or_default();
        self.items = Vec::new();
        for item in stored.into_iter().filter(|item| item.quantity > 0) {
            self.items.push(item);
            if cart_total(&self.items).is_none() {
                warn!(food_id = %self.items[self.items.len() - 1].id, "Dropping stored item that overflows the cart total");
                self.items.pop();
            }
        }
        info!(items = self.items.len(), "CartService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::AddItem { item, respond_to } => {
                    self.handle_add_item(item, respond_to);
                }
                CartRequest::UpdateQuantity { id, quantity, respond_to } => {
                    self.handle_update_quantity(id, quantity, respond_to);
                }
                CartRequest::RemoveItem { id, respond_to } => {
                    self.handle_update_quantity(id, 0, respond_to);
                }
                CartRequest::Clear { respond_to } => {
                    self.items.clear();
                    self.persist();
                    debug!("Cart cleared");
                    let _ = respond_to.send(Ok(()));
                }
                CartRequest::Items { respond_to } => {
                    let _ = respond_to.send(Ok(self.items.clone()));
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }
        info!("CartService stopped");
    }

    /// Adds an item, merging quantities when the food is already in the cart.
    #[instrument(fields(food_id = %item.id, quantity = item.quantity), skip(self, item, respond_to))]
    fn handle_add_item(&mut self, item: CartItem, respond_to: ServiceResponse<Vec<CartItem>, CartError>) {
        if item.quantity == 0 || item.price == 0 {
            let _ = respond_to.send(Err(CartError::InvalidItem(item.id)));
            return;
        }

        let mut updated = self.items.clone();
        match updated.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => match existing.quantity.checked_add(item.quantity) {
                Some(quantity) => existing.quantity = quantity,
                None => {
                    let _ = respond_to.send(Err(CartError::InvalidItem(item.id)));
                    return;
                }
            },
            None => updated.push(item.clone()),
        }
        if cart_total(&updated).is_none() {
            warn!("Item would overflow the cart total");
            let _ = respond_to.send(Err(CartError::InvalidItem(item.id)));
            return;
        }

        self.items = updated;
        self.persist();
        let _ = respond_to.send(Ok(self.items.clone()));
    }

    /// Sets the quantity of an item; zero removes it.
    #[instrument(skip(self, respond_to))]
    fn handle_update_quantity(
        &mut self,
        id: String,
        quantity: u32,
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    ) {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            let _ = respond_to.send(Err(CartError::NotFound(id)));
            return;
        };

        if quantity == 0 {
            self.items.remove(position);
            debug!("Item removed");
        } else {
            let previous = self.items[position].quantity;
            self.items[position].quantity = quantity;
            if cart_total(&self.items).is_none() {
                self.items[position].quantity = previous;
                let _ = respond_to.send(Err(CartError::InvalidItem(id)));
                return;
            }
        }
        self.persist();
        let _ = respond_to.send(Ok(self.items.clone()));
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), keys::CART_ITEMS, &self.items);
    }
}
