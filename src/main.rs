use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use freehub_backend::auth::jwks::JwksCache;
use freehub_backend::auth::middleware::JwtSecret;
use freehub_backend::cache::RedisCache;
use freehub_backend::config::AppConfig;
use freehub_backend::create_pool;
use freehub_backend::error::AppError;
use freehub_backend::handlers;
use migration::{Migrator, MigratorTrait};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    tracing::info!("Connected to Postgres");

    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(io::Error::other)?;
        tracing::info!("Migrations applied");
    }
    let db_data = web::Data::new(db);

    let redis_cache = RedisCache::new(&config.redis_url)
        .await
        .map_err(io::Error::other)?;
    let redis_data = web::Data::new(Arc::new(redis_cache));
    let cache_config = web::Data::new(config.cache.clone());
    tracing::info!("Connected to Redis");

    let jwks_cache = web::Data::new(Arc::new(JwksCache::new(
        &config.supabase_project_ref,
        &config.supabase_anon_key,
    )));
    let jwt_secret = config.jwt_secret.clone().map(|s| web::Data::new(JwtSecret(s)));
    if jwt_secret.is_some() {
        tracing::info!("Verifying tokens with the shared JWT secret");
    }

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());
        let query_config = web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());
        let path_config = web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

        let mut app = App::new()
            .wrap(cors)
            .app_data(json_config)
            .app_data(query_config)
            .app_data(path_config)
            .app_data(db_data.clone())
            .app_data(redis_data.clone())
            .app_data(cache_config.clone())
            .app_data(jwks_cache.clone());

        if let Some(secret) = &jwt_secret {
            app = app.app_data(secret.clone());
        }

        app.service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
