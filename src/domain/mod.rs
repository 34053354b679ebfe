pub mod account;
pub mod cart;
pub mod order;
pub mod qr;
pub mod wallet;

pub use account::*;
pub use cart::*;
pub use order::*;
pub use qr::*;
pub use wallet::*;
