//! Typed handles for calling the services. Cloning a client is cheap; every
//! clone talks to the same actor.

#[macro_use]
mod macros;

mod account_client;
mod cart_client;
mod checkout_client;
mod order_client;
mod topup_client;
mod wallet_client;

pub use account_client::{AccountClient, AccountError, Favorites};
pub use cart_client::CartClient;
pub use checkout_client::CheckoutClient;
pub use order_client::OrderClient;
pub use topup_client::TopUpClient;
pub use wallet_client::WalletClient;
