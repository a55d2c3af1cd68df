use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use lottery_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expires_in);
    if config.admin.password_hash.is_empty() {
        log::warn!("ADMIN_PASSWORD_HASH is not set, operator login is disabled");
    }

    let events = RoundEvents::default();
    let auth_service = AuthService::new(jwt_service.clone(), config.admin.clone());
    let round_service = RoundService::new(pool.clone(), config.lottery.clone(), events.clone());
    let allocation_service =
        AllocationService::new(pool.clone(), config.lottery.clone(), events.clone());
    let draw_service = DrawService::new(pool.clone(), events.clone());
    let statistics_service = StatisticsService::new(pool.clone(), config.lottery.clone());

    log::info!(
        "Starting HTTP server at {}:{} (pool size {})",
        config.server.host,
        config.server.port,
        config.lottery.pool_size
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .app_data(web::Data::new(events.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(round_service.clone()))
            .app_data(web::Data::new(allocation_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .app_data(web::Data::new(statistics_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
