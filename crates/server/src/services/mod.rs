//! Business logic services.
//!
//! # Services
//!
//! - `wishlist` - Per-user favorites over a `WishlistStore`
//! - `sell_requests` - Seller submissions and admin review
//! - `notifications` - Client for the remote notification service
//! - `payments` - Payment gateway handle (`Ready` or `Disabled`)

pub mod notifications;
pub mod payments;
pub mod sell_requests;
pub mod wishlist;

pub use notifications::{NotificationClient, NotificationError};
pub use payments::{DisabledReason, GatewayOrder, PaymentClient, PaymentError, PaymentGateway};
pub use sell_requests::SellRequestService;
pub use wishlist::WishlistService;
