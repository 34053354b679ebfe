//! Campus food wallet: a locally persisted Naira balance, verified top-ups
//! through a hosted checkout, and purchases paid from the balance.
//!
//! Every stateful concern is owned by one actor and reached through a typed
//! client. [`app_system::WalletSystem`] starts and wires them all.

pub mod actor_framework;
pub mod app_system;
pub mod cart_actor;
pub mod clients;
pub mod domain;
pub mod gateway;
pub mod messages;
pub mod order_actor;
pub mod store;
pub mod topup_actor;
pub mod wallet_actor;

#[cfg(test)]
mod mock_framework;
