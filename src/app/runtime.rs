use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{App, HttpServer, web};
use chrono::{Local, NaiveDateTime};

use crate::adapters::api::{ApiState, configure_routes};
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::services::InMemorySessionService;
use crate::domain::clock::Clock;
use crate::domain::session_registry::SessionRegistry;

const CORS_MAX_AGE_SECONDS: usize = 3600;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub fn run(config: AppConfig) -> Result<(), AppError> {
    let registry = Arc::new(SessionRegistry::new());
    let api_state = ApiState {
        sessions: InMemorySessionService::new(Arc::clone(&registry), Arc::new(SystemClock)),
    };
    let cors_origin = config.cors_allowed_origin.clone();

    tracing::info!(bind = %config.http_bind, "http server starting");

    let server_result = actix_web::rt::System::new().block_on(async move {
        let mut server = HttpServer::new(move || {
            App::new()
                .wrap(build_cors(cors_origin.as_deref()))
                .app_data(web::Data::new(api_state.clone()))
                .configure(configure_routes)
        });
        if let Some(workers) = config.http_workers {
            server = server.workers(workers);
        }

        server.bind(&config.http_bind)?.run().await
    });

    tracing::info!(sessions = registry.len(), "http server stopped");

    server_result.map_err(AppError::runtime)
}

fn build_cors(allowed_origin: Option<&str>) -> Condition<Cors> {
    let Some(origin) = allowed_origin else {
        return Condition::new(false, Cors::default());
    };

    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT"])
        .allow_any_header()
        .max_age(CORS_MAX_AGE_SECONDS);
    let cors = if origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(origin)
    };

    Condition::new(true, cors)
}
