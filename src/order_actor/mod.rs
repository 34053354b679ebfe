//! Order-specific domain logic: creation from a cart snapshot and the
//! forward-only status lifecycle driven by vendors.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
