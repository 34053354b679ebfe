use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn, Instrument};

use campus_wallet::app_system::{setup_tracing, Config, WalletSystem};
use campus_wallet::domain::{CartItem, OrderStatus, UserProfile, UserRole};
use campus_wallet::gateway::{HttpGateway, PaymentGateway, TerminalLauncher, UnconfiguredGateway};
use campus_wallet::order_actor::OrderError;
use campus_wallet::store::FileStore;
use campus_wallet::topup_actor::TopUpForm;

const DEMO_TOP_UP: u64 = 1000;
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = Config::load();
    let store = Arc::new(FileStore::open(&config.store_path));
    info!(store = %store.path().display(), "Starting campus wallet");
    let gateway: Arc<dyn PaymentGateway> = match &config.payment_api_url {
        Some(url) => Arc::new(
            HttpGateway::new(url.clone(), config.payment_api_key.clone(), GATEWAY_TIMEOUT)
                .map_err(|e| e.to_string())?,
        ),
        None => {
            warn!("PAYMENT_API_URL not set, wallet top-ups are disabled");
            Arc::new(UnconfiguredGateway)
        }
    };

    let system = WalletSystem::from_config(&config, store, gateway, Arc::new(TerminalLauncher::stdin()));

    let profile = UserProfile::new("student_1", "Ada Obi", "ada@unilag.edu.ng", UserRole::Student);
    system.account_client.sign_in(&profile);

    let balance = system.wallet_client.load_balance().await.map_err(|e| e.to_string())?;
    info!(balance, "Wallet loaded");

    if config.payment_api_url.is_some() {
        let span = tracing::info_span!("top_up");
        let result = async {
            info!(amount = DEMO_TOP_UP, "Starting wallet top-up");
            system
                .topup_client
                .start_top_up(TopUpForm::new(DEMO_TOP_UP, profile.email.clone()))
                .await
        }
        .instrument(span)
        .await;

        match result {
            Ok(outcome) => info!(balance = outcome.balance(), "Wallet topped up"),
            Err(e) => error!(error = %e, "Top-up failed"),
        }
    }

    // Demo purchase from the local balance
    let span = tracing::info_span!("order_processing");
    let order_result = async {
        system
            .cart_client
            .add_item(CartItem::new("jollof", "Jollof Rice", 1500, "Mama Put"))
            .await?;
        system
            .cart_client
            .add_item(CartItem::new("plantain", "Dodo", 500, "Mama Put").with_quantity(2))
            .await?;
        info!("Placing order through checkout");
        let order = system.checkout_client.place_order(Some(profile.email.clone())).await?;
        Ok::<_, OrderError>(order)
    }
    .instrument(span)
    .await;

    match order_result {
        Ok(order) => {
            info!(order_id = %order.id, total = order.total, "Order placed successfully");
            match system.order_client.update_status(order.id.clone(), OrderStatus::Preparing).await {
                Ok(order) => info!(status = %order.status, "Vendor accepted order"),
                Err(e) => error!(error = %e, "Vendor update failed"),
            }
        }
        Err(e) => error!(error = %e, "Order processing failed"),
    }

    match system.wallet_client.history().await {
        Ok(history) => {
            for entry in history.iter().take(5) {
                info!(kind = ?entry.kind, amount = entry.amount, reference = %entry.reference, "Payment");
            }
        }
        Err(e) => error!(error = %e, "Could not read payment history"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
