use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::cart_actor::CartError;
use crate::domain::{UserProfile, UserRole};
use crate::store::{keys, load_json, save_json, SharedStore};
use crate::wallet_actor::WalletError;

use super::{CartClient, WalletClient};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccountError {
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// The signed-in user and the logout lifecycle.
#[derive(Clone)]
pub struct AccountClient {
    store: SharedStore,
    wallet: WalletClient,
    cart: CartClient,
}

impl AccountClient {
    pub fn new(store: SharedStore, wallet: WalletClient, cart: CartClient) -> Self {
        Self { store, wallet, cart }
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id, role = profile.role.as_str()))]
    pub fn sign_in(&self, profile: &UserProfile) {
        save_json(self.store.as_ref(), keys::USER, profile);
        self.store.set(keys::USER_ROLE, profile.role.as_str());
        info!("Signed in");
    }

    pub fn current(&self) -> Option<UserProfile> {
        load_json(self.store.as_ref(), keys::USER)
    }

    pub fn role(&self) -> Option<UserRole> {
        self.store
            .get(keys::USER_ROLE)
            .and_then(|raw| UserRole::parse(raw.trim()))
    }

    /// Forgets the user, puts the wallet back to the default balance and
    /// empties the cart. Payment history and orders are kept.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AccountError> {
        self.store.set(keys::USER, "null");
        self.store.set(keys::USER_ROLE, "");
        let balance = self.wallet.reset(false).await?;
        self.cart.clear().await?;
        info!(balance, "Logged out");
        Ok(())
    }
}

/// Favorite restaurant ids.
#[derive(Clone)]
pub struct Favorites {
    store: SharedStore,
}

impl Favorites {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<String> {
        load_json(self.store.as_ref(), keys::FAVORITE_RESTAURANTS).unwrap_or_default()
    }

    pub fn is_favorite(&self, restaurant_id: &str) -> bool {
        self.list().iter().any(|id| id == restaurant_id)
    }

    /// Adds or removes `restaurant_id`; returns whether it is now a favorite.
    pub fn toggle(&self, restaurant_id: &str) -> bool {
        let mut favorites = self.list();
        let now_favorite = match favorites.iter().position(|id| id == restaurant_id) {
            Some(index) => {
                favorites.remove(index);
                false
            }
            None => {
                favorites.push(restaurant_id.to_string());
                true
            }
        };
        save_json(self.store.as_ref(), keys::FAVORITE_RESTAURANTS, &favorites);
        debug!(restaurant_id, now_favorite, "Favorites updated");
        now_favorite
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn favorites_toggle_in_and_out() {
        let favorites = Favorites::new(Arc::new(MemoryStore::new()));

        assert!(favorites.toggle("mama-put"));
        assert!(favorites.toggle("buka-hut"));
        assert!(favorites.is_favorite("mama-put"));
        assert!(!favorites.toggle("mama-put"));
        assert_eq!(favorites.list(), vec!["buka-hut".to_string()]);
    }

    #[test]
    fn malformed_favorites_read_as_empty() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(keys::FAVORITE_RESTAURANTS, "{oops");
        assert!(Favorites::new(store).list().is_empty());
    }
}
