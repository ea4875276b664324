use anyhow::anyhow;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL not found"))?;

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET not found"))?;

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        Ok(AppConfig {
            database_url,
            jwt_secret,
            bind_addr,
        })
    }
}
