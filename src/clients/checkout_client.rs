use tracing::{error, info, instrument, warn};

use crate::cart_actor::CartError;
use crate::domain::{Charge, Order, OrderCreate, QrPayload};
use crate::order_actor::OrderError;
use crate::wallet_actor::DebitReceipt;

use super::{CartClient, OrderClient, WalletClient};

/// Root client for purchases: coordinates the cart, the wallet and the order
/// log. Purchases are paid from the local balance only.
#[derive(Clone)]
pub struct CheckoutClient {
    wallet: WalletClient,
    cart: CartClient,
    orders: OrderClient,
}

impl CheckoutClient {
    pub fn new(wallet: WalletClient, cart: CartClient, orders: OrderClient) -> Self {
        Self { wallet, cart, orders }
    }

    /// Pays for the whole cart and turns it into a single pending order.
    ///
    /// An empty cart or a short balance leaves everything untouched.
    #[instrument(skip(self))]
    pub async fn place_order(&self, customer_email: Option<String>) -> Result<Order, OrderError> {
        let items = self.cart.items().await?;
        if items.is_empty() {
            warn!("Checkout attempted with an empty cart");
            return Err(OrderError::EmptyCart);
        }

        let snapshot = OrderCreate::from_cart(&items).ok_or(OrderError::CartError(CartError::TotalOverflow.to_string()))?;
        let total = snapshot.total;
        let receipt = self.wallet.debit(Charge::new(total, customer_email)).await?;
        info!(total, balance = receipt.balance, "Cart paid from wallet");

        let order = self
            .orders
            .create_order(snapshot)
            .await
            .inspect_err(|e| {
                error!(error = %e, reference = %receipt.entry.reference, "Wallet debited but order was not recorded");
            })?;

        self.cart.clear().await?;
        info!(order_id = %order.id, "Order placed");
        Ok(order)
    }

    /// Pays a vendor from a scanned QR code.
    #[instrument(skip(self, raw))]
    pub async fn pay_with_qr(&self, raw: &str, customer_email: Option<String>) -> Result<DebitReceipt, OrderError> {
        let payload = QrPayload::parse(raw)?;
        info!(amount = payload.amount(), item = ?payload.item_name(), "Paying from QR code");
        let receipt = self.wallet.debit(Charge::new(payload.amount(), customer_email)).await?;
        Ok(receipt)
    }
}
