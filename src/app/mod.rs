mod config;
mod error;
mod logging;
mod runtime;
pub mod services;

pub use error::AppError;

pub fn run_api() -> Result<(), AppError> {
    let config = config::AppConfig::from_env()?;

    logging::init(&config.log_level)?;

    tracing::info!(
        http_bind = %config.http_bind,
        http_workers = ?config.http_workers,
        cors_allowed_origin = ?config.cors_allowed_origin,
        env_file_loaded = config.env_file_loaded,
        "application bootstrap initialized"
    );

    runtime::run(config)
}
