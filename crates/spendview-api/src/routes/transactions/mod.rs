//! Transaction routes: list, pagination, approvals
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: full page and fragment rendering

pub mod api;
pub mod page;

pub use api::{
    api_load_more,
    api_set_approval,
    api_view,
    htmx_load_more,
    htmx_set_approval,
    htmx_transactions_list,
};

pub use page::page_index;
