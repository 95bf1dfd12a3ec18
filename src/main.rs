use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use saferide::app_state::AppState;
use saferide::auth::Authentication;
use saferide::config::Config;
use saferide::store::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let store = Arc::new(Store::new());

    if config.seed_demo_data {
        match saferide::seed::load_demo_data(&store) {
            Ok(()) => info!("demo fixtures loaded"),
            Err(e) => error!("failed to load demo fixtures: {}", e),
        }
    }

    info!("server running at http://{}", config.bind_addr);
    info!("allowed CORS origin: {}", config.frontend_origin);

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.frontend_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
                http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Authentication)
            .app_data(web::Data::new(AppState {
                store: store.clone(),
                config: config.clone(),
            }))
            .configure(saferide::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
