use std::str::FromStr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use counsel::middleware::auth::Authentication;
use counsel::{configure, AppConfig, AppState, MIGRATOR};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app_config = Arc::new(AppConfig::from_env()?);

    let options = SqliteConnectOptions::from_str(&app_config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    MIGRATOR.run(&pool).await?;

    let app_state = Arc::new(AppState { pool });
    let bind_addr = app_config.bind_addr.clone();
    info!("Listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .wrap(Authentication {
                app_config: app_config.clone(),
            })
            .wrap(Cors::permissive())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
