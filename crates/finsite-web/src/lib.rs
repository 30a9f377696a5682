//! Server-rendered pages of the FinSite dashboard, plus the mock endpoints they fall
//! back to when no backend is configured.

use actix_web::web;

pub mod api;
pub mod error;
pub mod pages;
pub mod state;

pub use error::PageError;
pub use state::AppState;

/// Register every page and endpoint. Shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // pages
        .service(pages::root)
        .service(pages::stocks::stocks)
        .service(pages::ticker::price_card)
        .service(pages::ticker::ticker_page)
        .service(pages::ta::ta)
        // mock endpoints
        .service(api::mock::mock_fundamental)
        .service(api::mock::mock_price);
}
