pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod types;

pub use config::AppConfig;

use actix_web::web;
use sqlx::SqlitePool;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct AppState {
    pub pool: SqlitePool,
}

/// Registers every route group. The caller is responsible for attaching
/// `AppState`, `AppConfig` and the `Authentication` middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::auth::signup)
        .service(routes::auth::counsellor_signup)
        .service(routes::auth::login)
        .service(routes::auth::counsellor_login)
        .service(routes::assignments::get_assignments)
        .service(
            web::scope("/chat")
                .service(routes::chat::threads)
                .service(routes::chat::get_messages)
                .service(routes::chat::post_message),
        )
        .service(
            web::scope("/availability")
                .service(routes::availability::query_slots)
                .service(routes::availability::publish_slots)
                .service(routes::availability::book_slot),
        )
        .service(
            web::scope("/profile")
                .service(routes::profile::get_profile)
                .service(routes::profile::update_profile)
                .service(routes::profile::change_password)
                .service(routes::profile::get_activity),
        );
}
