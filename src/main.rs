use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use dotenv::dotenv;
use rapidftr::children_api::controller::ChildrenController;
use rapidftr::children_api::handlers::configure;
use rapidftr::clock::system::SystemClock;
use rapidftr::config::settings::Settings;
use rapidftr::db::interface::ChildStore;
use rapidftr::db::sqlite::Database;
use rapidftr::forms::loader::FormConfig;
use rapidftr::pdf::photo_sheet::PhotoSheet;
use rapidftr::search::interface::SearchIndex;
use rapidftr::search::remote::RemoteSearch;
use rapidftr::search::summary::Summary;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let settings = Settings::from_env()?;

    let store: Arc<dyn ChildStore> = Arc::new(
        Database::new(&settings.database_path)
            .with_context(|| format!("cannot open database '{}'", settings.database_path))?,
    );
    info!(path = %settings.database_path, "record store opened");

    let forms = FormConfig::load(&settings.form_sections_path)?;

    let search: Arc<dyn SearchIndex> = match &settings.search_url {
        Some(url) => {
            info!(%url, "using remote search index");
            Arc::new(RemoteSearch::new(url))
        }
        None => Arc::new(Summary::new(store.clone())),
    };

    let controller = web::Data::new(ChildrenController::new(
        store,
        search,
        Arc::new(PhotoSheet),
        forms,
        Arc::new(SystemClock),
    ));

    info!(addr = %settings.bind_addr, "starting server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(controller.clone())
            .configure(configure)
    })
    .bind(settings.bind_addr)
    .with_context(|| format!("cannot bind {}", settings.bind_addr))?
    .run()
    .await?;

    Ok(())
}
