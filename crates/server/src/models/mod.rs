//! Domain models for the server.
//!
//! These are validated domain objects, separate from database row types and
//! from the JSON payloads accepted by route handlers.

pub mod sell_request;
pub mod session;

pub use sell_request::{
    CreateSellRequest, DEFAULT_PAGE_SIZE, ItemDetails, MAX_PAGE_SIZE, NewSellRequest, SellRequest,
    SellRequestFilter, SellRequestPatch, SellRequestQuery, Submitter, UpdateSellRequest,
};
pub use session::{CurrentUser, keys as session_keys};
