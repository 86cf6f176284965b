//! Domain types for carts, profiles, addresses, and orders.
//!
//! These types represent validated domain objects separate from database
//! row shapes; stores translate rows into them at the boundary.

pub mod cart;
pub mod order;
pub mod profile;

pub use cart::CartLine;
pub use order::{NewOrder, Order, StatusHistoryEntry};
pub use profile::{Address, ProfileFields, UserProfile};
