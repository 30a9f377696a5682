use actix_web::http::header::{ContentType, CACHE_CONTROL};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use finsite_core::chart::escape_text;

use crate::pages::layout;

/// Failure of a server-rendered page. Aborts the whole render; no partial page is sent.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// The backend was unreachable, answered with a non-2xx status, or sent garbage.
    #[error("{0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("page render failed: {self}");
        let body = format!(
            "<main style='padding: 24px'>\n  <h1>Something went wrong</h1>\n  <p style='color: tomato'>{}</p>\n</main>",
            escape_text(&self.to_string())
        );
        HttpResponse::build(self.status_code())
            .insert_header((CACHE_CONTROL, "no-store"))
            .content_type(ContentType::html())
            .body(layout(&body))
    }
}
