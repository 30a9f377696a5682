pub mod stocks;
pub mod ta;
pub mod ticker;

use actix_web::http::header::{ContentType, CACHE_CONTROL};
use actix_web::{get, http::header::LOCATION, HttpResponse, Responder};
use finsite_core::chart::escape_text;
use finsite_core::model::Company;

pub const TITLE: &str = "FinSite";
pub const DESCRIPTION: &str = "A simple finance research site";

/// Shared document shell of every page.
pub fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang='zh-Hant'>
<head>
  <meta charset='utf-8'>
  <title>{TITLE}</title>
  <meta name='description' content='{DESCRIPTION}'>
</head>
<body style='margin: 0; font-family: system-ui, sans-serif'>
{body}
</body>
</html>"
    )
}

/// 200 page response; never cached.
pub fn page(body: &str) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, "no-store"))
        .content_type(ContentType::html())
        .body(layout(body))
}

pub(crate) fn esc(text: &str) -> String {
    escape_text(text)
}

/// Query-string value, with blank inputs treated as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A single path segment, percent-encoded for use in an href.
pub(crate) fn segment(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// `<option>` list of companies; `selected` is kept even when the backend does not list it.
pub(crate) fn company_options(companies: &[Company], selected: &str) -> String {
    let mut html = String::new();
    if !companies.iter().any(|c| c.ticker == selected) {
        html.push_str(&format!(
            "<option value='{0}' selected>{0}</option>",
            esc(selected)
        ));
    }
    for c in companies {
        let marker = if c.ticker == selected { " selected" } else { "" };
        let label = match c.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{} {}", c.ticker, name),
            _ => c.ticker.clone(),
        };
        html.push_str(&format!(
            "<option value='{}'{marker}>{}</option>",
            esc(&c.ticker),
            esc(&label)
        ));
    }
    html
}

// home
#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Found()
        .insert_header((LOCATION, "/stocks"))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(ticker: &str, name: Option<&str>) -> Company {
        Company {
            ticker: ticker.to_string(),
            name: name.map(str::to_string),
            sector: None,
        }
    }

    #[test]
    fn layout_carries_title_and_language() {
        let html = layout("<p>hi</p>");
        assert!(html.contains("<title>FinSite</title>"));
        assert!(html.contains("lang='zh-Hant'"));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn options_mark_the_selection() {
        let companies = vec![company("2317", Some("Hon Hai")), company("2330", Some("TSMC"))];
        let html = company_options(&companies, "2330");
        assert!(html.contains("<option value='2330' selected>2330 TSMC</option>"));
        assert!(html.contains("<option value='2317'>2317 Hon Hai</option>"));
    }

    #[test]
    fn unlisted_selection_is_kept() {
        let html = company_options(&[company("2317", None)], "9999");
        assert!(html.starts_with("<option value='9999' selected>9999</option>"));
        assert!(html.contains("<option value='2317'>2317</option>"));
    }

    #[test]
    fn blank_query_values_are_absent() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" 2330 ".into())), Some("2330".into()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn segments_are_encoded() {
        assert_eq!(segment("2330"), "2330");
        assert_eq!(segment("BRK/B"), "BRK%2FB");
        assert_eq!(segment("A B"), "A%20B");
    }
}
