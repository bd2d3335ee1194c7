use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use quiz_miner_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    config.warn_on_missing_credentials();

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let max_upload_bytes = config.max_upload_bytes;
    let sweep_interval = config.session_sweep_interval;
    let state = Arc::new(AppState::new(config));
    state.sessions.spawn_sweeper(sweep_interval);

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&state)))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
