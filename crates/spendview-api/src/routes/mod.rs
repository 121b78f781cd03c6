//! Route modules for the server
//!
//! - transactions: list fragment, "View More", approval toggles
//! - filter: employee filter selection
//!
//! Each module splits JSON endpoints (api.rs) from HTMX rendering (page.rs)
//! where it has both.

pub mod filter;
pub mod transactions;
