//! Pulls sales rows and category mappings from POS vendor APIs.

mod auth;
mod client;
mod error;
mod normalize;
mod toast;

pub use auth::ApiAuth;
pub use client::{ApiConnection, PosClient, SalesPull};
pub use error::{PosApiError, Result};
pub use toast::GENERIC_ORDER_PLU;
