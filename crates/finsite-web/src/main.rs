use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use finsite_core::Config;
use finsite_web::api::ApiDoc;
use finsite_web::{configure, AppState};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,actix_web=debug"),
    )
    .init();

    // settings are read once and shared
    let config = Config::from_env()?;
    let state = AppState::new(config.clone())?;
    log::info!(
        "serving on {}:{} (backend {}, poll every {} ms)",
        config.bind_addr,
        config.port,
        config.api_base(),
        config.poll_interval.as_millis()
    );

    // run server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(configure)
            // api documentation
            .service(Redoc::with_url("/redoc", ApiDoc::openapi()))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
