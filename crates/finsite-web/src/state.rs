use finsite_core::Config;
use reqwest::Client;

/// Shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub http: Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .user_agent(concat!("finsite/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(AppState { config, http })
    }

    /// Base URL of the backend, resolved from the configuration.
    pub fn api_base(&self) -> String {
        self.config.api_base()
    }
}
