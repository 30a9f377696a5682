pub mod mock;

use utoipa::OpenApi;

/// OpenAPI description of the endpoints this site serves itself.
#[derive(OpenApi)]
#[openapi(
    paths(mock::mock_fundamental, mock::mock_price),
    components(schemas(mock::MockFundamental, mock::MockPrice))
)]
pub struct ApiDoc;
