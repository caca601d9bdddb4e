mod auth;
mod clock;
mod config;
mod db;
mod error;
mod filters;
mod followup;
mod models;
mod routes;
mod state;
mod storage;
mod templates;
mod validation;

#[cfg(test)]
mod test_support;

use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};

use crate::{config::Config, state::AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;
    db::run_migrations(&pool).await?;
    db::seed_defaults(&pool, &config).await?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let address = config.bind_address();
    let static_dir = config.static_dir.clone();
    let upload_dir = config.upload_dir.clone();
    let payload_limit = config.max_upload_bytes;
    let state = AppState::new(pool, config);

    log::info!("Starting Glow at Home on http://{address}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(payload_limit))
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .service(Files::new(storage::PUBLIC_PREFIX, &upload_dir))
            .configure(routes::public::configure)
            .configure(routes::admin::configure)
            .default_service(web::to(routes::public::not_found))
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
