use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::cart_actor::CartService;
use crate::clients::{
    AccountClient, CartClient, CheckoutClient, Favorites, OrderClient, TopUpClient, WalletClient,
};
use crate::domain::{now_millis, Order};
use crate::gateway::{CheckoutLauncher, PaymentGateway};
use crate::store::SharedStore;
use crate::topup_actor::{TopUpService, TopUpSettings};
use crate::wallet_actor::WalletService;

use super::config::Config;

/// The running application: every service started and wired together.
pub struct WalletSystem {
    pub wallet_client: WalletClient,
    pub cart_client: CartClient,
    pub order_client: OrderClient,
    pub topup_client: TopUpClient,
    pub checkout_client: CheckoutClient,
    pub account_client: AccountClient,
    pub favorites: Favorites,
    handles: Vec<JoinHandle<()>>,
}

impl WalletSystem {
    pub fn new(
        buffer_size: usize,
        settings: TopUpSettings,
        store: SharedStore,
        gateway: Arc<dyn PaymentGateway>,
        launcher: Arc<dyn CheckoutLauncher>,
    ) -> Self {
        // 1. Ledger
        let (wallet_service, wallet_client) = WalletService::new(buffer_size, store.clone());
        let wallet_handle = tokio::spawn(wallet_service.run());

        // 2. Cart
        let (cart_service, cart_client) = CartService::new(buffer_size, store.clone());
        let cart_handle = tokio::spawn(cart_service.run());

        // 3. Order log
        let order_seq = AtomicU64::new(1);
        let next_order_id = move || {
            let seq = order_seq.fetch_add(1, Ordering::SeqCst);
            format!("order_{}_{}", now_millis(), seq)
        };
        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(buffer_size, store.clone(), next_order_id);
        let order_client = OrderClient::new(order_resource_client);
        let order_handle = tokio::spawn(order_actor.run());

        // 4. Top-up dialog
        let (topup_service, topup_client) =
            TopUpService::new(buffer_size, wallet_client.clone(), gateway, launcher, settings);
        let topup_handle = tokio::spawn(topup_service.run());

        let checkout_client =
            CheckoutClient::new(wallet_client.clone(), cart_client.clone(), order_client.clone());
        let account_client =
            AccountClient::new(store.clone(), wallet_client.clone(), cart_client.clone());
        let favorites = Favorites::new(store);

        Self {
            wallet_client,
            cart_client,
            order_client,
            topup_client,
            checkout_client,
            account_client,
            favorites,
            handles: vec![wallet_handle, cart_handle, order_handle, topup_handle],
        }
    }

    /// Builds the system from configuration.
    pub fn from_config(
        config: &Config,
        store: SharedStore,
        gateway: Arc<dyn PaymentGateway>,
        launcher: Arc<dyn CheckoutLauncher>,
    ) -> Self {
        Self::new(config.channel_buffer, config.topup_settings(), store, gateway, launcher)
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // The top-up service holds a wallet client, so it goes first.
        self.topup_client.shutdown().await.map_err(|e| e.to_string())?;
        self.cart_client.shutdown().await.map_err(|e| e.to_string())?;
        self.wallet_client.shutdown().await.map_err(|e| e.to_string())?;

        // The order actor stops once every client is gone.
        drop(self.checkout_client);
        drop(self.order_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
