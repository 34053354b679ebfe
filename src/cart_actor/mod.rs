//! Cart contents between "add to cart" and checkout.

pub mod error;
pub mod service;

pub use error::*;
pub use service::CartService;
