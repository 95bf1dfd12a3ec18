use std::env;

use log::warn;

/// Development fallback; matches what the middleware assumes when no
/// application state is registered.
pub const DEFAULT_JWT_SECRET: &str = "saferide-secret-key";

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub frontend_origin: String,
    /// When true, `main` loads the demo fixture set after startup. Never the
    /// default: seeding is an explicit opt-in, not a constructor side effect.
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using the development default");
            DEFAULT_JWT_SECRET.to_string()
        });
        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        Self {
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            seed_demo_data,
        }
    }
}
