use actix_web::{get, web, HttpResponse, Responder};
use rand::Rng;
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Mock fundamentals of a single stock
///
/// ```json
/// {
///     "ticker": "2330",
///     "name": "TSMC",
///     "sector": "Semiconductor",
///     "pe": 25.0,
///     "pb": 5.0
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, PartialEq, utoipa::ToSchema)]
pub struct MockFundamental {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
}

impl MockFundamental {
    /// Static lookup; unknown tickers get a placeholder record with null multiples.
    pub fn lookup(ticker: &str) -> Self {
        match ticker {
            "2330" => MockFundamental {
                ticker: "2330".to_string(),
                name: "TSMC".to_string(),
                sector: "Semiconductor".to_string(),
                pe: Some(25.0),
                pb: Some(5.0),
            },
            _ => MockFundamental {
                ticker: ticker.to_string(),
                name: "Unknown".to_string(),
                sector: "N/A".to_string(),
                pe: None,
                pb: None,
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/mock/fundamental/{ticker}",
    responses(
        (
            status = 200, description = "Static fundamentals; unknown tickers return an \"Unknown\" record with null multiples",
            body = MockFundamental, content_type = "application/json",
            example = json!({
                "ticker": "2330",
                "name": "TSMC",
                "sector": "Semiconductor",
                "pe": 25.0,
                "pb": 5.0
            })
        )
    ),
    params(
        ("ticker" = String, Path, description = "Stock ticker symbol")
    )
)]
#[get("/mock/fundamental/{ticker}")]
pub async fn mock_fundamental(path: web::Path<String>) -> impl Responder {
    let ticker = path.into_inner();
    HttpResponse::Ok().json(MockFundamental::lookup(&ticker))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Mock realtime price
///
/// ```json
/// {
///     "ticker": "2330",
///     "price": 803.0,
///     "ts": 1700000000000
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, PartialEq, utoipa::ToSchema)]
pub struct MockPrice {
    pub ticker: String,
    pub price: f64,
    pub ts: i64,
}

pub const BASE_PRICE: i64 = 800;
pub const JITTER: i64 = 10;

impl MockPrice {
    pub fn jittered<R: Rng>(ticker: &str, rng: &mut R, ts: i64) -> Self {
        let price = BASE_PRICE + rng.gen_range(-JITTER..=JITTER);
        MockPrice {
            ticker: ticker.to_string(),
            price: price as f64,
            ts,
        }
    }
}

#[utoipa::path(
    get,
    path = "/mock/price/{ticker}",
    responses(
        (
            status = 200, description = "Random price around 800, stamped with the current time in epoch milliseconds",
            body = MockPrice, content_type = "application/json",
            example = json!({
                "ticker": "2330",
                "price": 803.0,
                "ts": 1700000000000i64
            })
        )
    ),
    params(
        ("ticker" = String, Path, description = "Stock ticker symbol")
    )
)]
#[get("/mock/price/{ticker}")]
pub async fn mock_price(path: web::Path<String>) -> impl Responder {
    let ticker = path.into_inner();
    let ts = chrono::Utc::now().timestamp_millis();
    let data = MockPrice::jittered(&ticker, &mut rand::thread_rng(), ts);
    HttpResponse::Ok().json(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as web_test, App};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[actix_web::test]
    async fn known_ticker() {
        let app = web_test::init_service(App::new().service(mock_fundamental)).await;
        let req = web_test::TestRequest::get().uri("/mock/fundamental/2330").to_request();
        let body: serde_json::Value = web_test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            serde_json::json!({
                "ticker": "2330",
                "name": "TSMC",
                "sector": "Semiconductor",
                "pe": 25.0,
                "pb": 5.0
            })
        );
    }

    #[actix_web::test]
    async fn unknown_ticker() {
        let app = web_test::init_service(App::new().service(mock_fundamental)).await;
        let req = web_test::TestRequest::get().uri("/mock/fundamental/AAPL").to_request();
        let resp = web_test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: serde_json::Value = web_test::read_body_json(resp).await;
        assert_eq!(
            body,
            serde_json::json!({
                "ticker": "AAPL",
                "name": "Unknown",
                "sector": "N/A",
                "pe": null,
                "pb": null
            })
        );
    }

    #[actix_web::test]
    async fn price_is_jittered_around_800() {
        let app = web_test::init_service(App::new().service(mock_price)).await;
        for _ in 0..20 {
            let req = web_test::TestRequest::get().uri("/mock/price/2330").to_request();
            let body: MockPrice = web_test::call_and_read_body_json(&app, req).await;
            assert_eq!(body.ticker, "2330");
            assert!((790.0..=810.0).contains(&body.price), "{}", body.price);
            assert_eq!(body.price.fract(), 0.0);
            assert!(body.ts > 1_600_000_000_000);
        }
    }

    #[test]
    fn jitter_covers_both_ends() {
        let mut rng = StdRng::seed_from_u64(7);
        let prices: Vec<f64> = (0..2000)
            .map(|_| MockPrice::jittered("2330", &mut rng, 0).price)
            .collect();
        assert!(prices.iter().any(|p| *p == 790.0));
        assert!(prices.iter().any(|p| *p == 810.0));
    }
}
