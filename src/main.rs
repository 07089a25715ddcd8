use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use taskdeck::auth::AuthMiddleware;
use taskdeck::config::Config;
use taskdeck::error;
use taskdeck::routes;
use taskdeck::store::{IdentityStore, MemoryTaskStore, PgIdentityStore, TaskStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = sqlx::PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let identity_store: Arc<dyn IdentityStore> = Arc::new(PgIdentityStore::new(pool));
    // Task records live in process memory. Swapping in a persistent TaskStore
    // here is the only change needed to keep them across restarts.
    let task_store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());

    let identity_data = web::Data::from(identity_store);
    let task_data = web::Data::from(task_store);
    let auth_data = web::Data::new(config.auth.clone());

    log::info!("Starting taskdeck server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(identity_data.clone())
            .app_data(task_data.clone())
            .app_data(auth_data.clone())
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
