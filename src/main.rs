use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use clap::Parser;
use std::time::Duration;

use taskvault::auth::{AuthService, TokenKeys};
use taskvault::config::Config;
use taskvault::routes::{self, health};
use taskvault::store::{postgres, PgTaskStore, PgUserStore};
use taskvault::{AppState, API_PREFIX};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!(
        "Configuration loaded: listening on {}, database URL hidden",
        config.server_addr()
    );

    let pool = postgres::connect(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    postgres::bootstrap_schema(&pool)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let keys = TokenKeys::new(
        &config.jwt_secret,
        chrono::Duration::hours(config.token_ttl_hours),
    );
    let auth = AuthService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        keys,
        config.bcrypt_cost,
    );
    let state = web::Data::new(AppState::new(auth, Arc::new(PgTaskStore::new(pool.clone()))));

    let cors_origin = config.cors_origin.clone();
    log::info!("Starting taskvault server at {}", config.server_url());

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(300);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope(API_PREFIX).configure(routes::config))
    })
    .client_request_timeout(Duration::from_secs(10))
    .keep_alive(Duration::from_secs(120))
    .shutdown_timeout(15)
    .bind(config.server_addr())?
    .run()
    .await?;

    pool.close().await;
    log::info!("Server stopped");
    Ok(())
}
