use actix_web::{App, HttpServer, middleware::Logger, web};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};
mod api;
use crate::api::{
    health::health_config,
    job::{handlers::job_config, JobService},
    validation,
};
mod config;
mod db;
mod shutdown;
use crate::shutdown::ShutdownCoordinator;

/// Console output plus daily rotating files under `log_dir`:
/// logs/app.2026-10-18.log (INFO and above) and logs/error.2026-10-18.log
fn init_tracing(log_dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let app_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, "app.log"))
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(tracing_appender::rolling::daily(log_dir, "error.log"))
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(error_layer)
        .init();
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = config::Config::load(config::Cli::parse())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    init_tracing(&config.log_dir)?;

    info!("Starting jobs-api");
    info!("  - Store backend: {:?}", config.store);
    info!("  - Max payload size: {} bytes", config.max_payload_size);

    let repository = match db::connection::get_connection(&config).await {
        Ok(repository) => repository,
        Err(e) => {
            error!("Failed to connect to job store: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e));
        }
    };

    let job_service = web::Data::new(JobService::new(repository.clone()));
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(job_service.clone())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config(max_payload_size))
            .configure(health_config)
            .configure(job_config)
    })
    .disable_signals();

    let server = match server.bind((config.host.as_str(), config.port)) {
        Ok(server) => server.run(),
        Err(e) => {
            error!("Failed to bind {}:{}: {}", config.host, config.port, e);
            repository.close().await;
            return Err(e);
        }
    };
    info!("Listening on {}:{}", config.host, config.port);

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    ShutdownCoordinator::new(server_handle, server_task, repository)
        .wait_for_shutdown()
        .await
}
