mod config;
mod db;
mod error;
mod middleware;
mod models;
mod policy;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Connecting to database...");
    let db = db::establish_connection(&config).await.map_err(|e| {
        log::error!("Failed to connect to database: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
    })?;
    log::info!("Database connected");

    if config.sync_schema {
        db::sync_schema(&db)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    let jwt_config = web::Data::new(config.jwt.clone());

    log::info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(db.clone()))
            .app_data(jwt_config.clone())
            .configure(routes::configure_routes)
    })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
