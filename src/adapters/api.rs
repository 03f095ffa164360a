use actix_web::{HttpResponse, Responder, error::InternalError, get, post, put, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::services::{
    InMemorySessionService, ServiceError, SessionCommandHandler, SessionQueryHandler,
};
use crate::domain::models::{ChargingSession, SessionStatus, StatusSummary};

const LOCAL_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Clone)]
pub struct ApiState {
    pub sessions: InMemorySessionService,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSessionRequest {
    pub station_id: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSessionResponse {
    pub id: Uuid,
    pub station_id: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub station_id: String,
    pub started_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<NaiveDateTime>,
    pub status: SessionStatus,
}

impl From<ChargingSession> for SessionResponse {
    fn from(session: ChargingSession) -> Self {
        Self {
            id: session.id(),
            station_id: session.station_id().to_string(),
            started_at: session.started_at(),
            stopped_at: session.stopped_at(),
            status: session.status(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_count: usize,
    pub started_count: usize,
    pub stopped_count: usize,
}

impl From<StatusSummary> for SummaryResponse {
    fn from(summary: StatusSummary) -> Self {
        Self {
            total_count: summary.total_count,
            started_count: summary.started_count,
            stopped_count: summary.stopped_count,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|error, _request| {
        let response = error_response(
            HttpResponse::BadRequest(),
            format!("malformed request body: {error}"),
        );
        InternalError::from_response(error, response).into()
    });

    cfg.app_data(json_config)
        .service(health)
        .service(submit_session_endpoint)
        .service(stop_session_endpoint)
        .service(list_sessions_endpoint)
        .service(sessions_summary_endpoint);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[post("/chargingSessions")]
async fn submit_session_endpoint(
    state: web::Data<ApiState>,
    body: web::Json<SubmitSessionRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let (Some(station_id), Some(raw_timestamp)) = (
        non_blank(request.station_id),
        non_blank(request.timestamp),
    ) else {
        tracing::warn!("rejected session submit with empty stationId or timestamp");
        return error_response(
            HttpResponse::BadRequest(),
            "Timestamp and stationId cannot be empty",
        );
    };

    let Some(started_at) = parse_local_timestamp(&raw_timestamp) else {
        tracing::warn!(timestamp = %raw_timestamp, "rejected session submit with unparsable timestamp");
        return error_response(HttpResponse::BadRequest(), "Cannot parse timestamp");
    };

    let session = state.sessions.submit_session(&station_id, started_at);

    tracing::info!(
        session_id = %session.id(),
        station_id = %session.station_id(),
        started_at = %session.started_at(),
        "charging session started"
    );

    HttpResponse::Created().json(SubmitSessionResponse {
        id: session.id(),
        station_id: session.station_id().to_string(),
        timestamp: session.started_at(),
    })
}

#[put("/chargingSessions/{id}")]
async fn stop_session_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> impl Responder {
    let raw_id = path.into_inner();
    let Ok(id) = Uuid::parse_str(&raw_id) else {
        tracing::warn!(session_id = %raw_id, "stop requested for malformed session id");
        return session_not_found_response(&raw_id);
    };

    match state.sessions.stop_session(id) {
        Ok(session) => {
            tracing::info!(
                session_id = %session.id(),
                station_id = %session.station_id(),
                stopped_at = ?session.stopped_at(),
                "charging session stopped"
            );
            HttpResponse::Ok().finish()
        }
        Err(error) => service_error_response(error, &raw_id),
    }
}

#[get("/chargingSessions")]
async fn list_sessions_endpoint(state: web::Data<ApiState>) -> impl Responder {
    let sessions: Vec<SessionResponse> = state
        .sessions
        .list_sessions()
        .into_iter()
        .map(SessionResponse::from)
        .collect();

    HttpResponse::Ok().json(sessions)
}

#[get("/chargingSessions/summary")]
async fn sessions_summary_endpoint(state: web::Data<ApiState>) -> impl Responder {
    HttpResponse::Ok().json(SummaryResponse::from(state.sessions.summarize_last_minute()))
}

/// Parses an ISO-8601 local date-time without zone, e.g. `2019-05-06T19:00:20.529`.
/// Seconds and fractional seconds are optional.
pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    LOCAL_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn error_response(
    mut builder: actix_web::HttpResponseBuilder,
    message: impl Into<String>,
) -> HttpResponse {
    builder.json(serde_json::json!({ "error": message.into() }))
}

fn service_error_response(error: ServiceError, requested_id: &str) -> HttpResponse {
    match error {
        ServiceError::SessionNotFound(id) => {
            tracing::warn!(session_id = %id, "stop requested for unknown session");
            session_not_found_response(requested_id)
        }
    }
}

fn session_not_found_response(requested_id: &str) -> HttpResponse {
    error_response(
        HttpResponse::NotFound(),
        format!("No sessions found with id={requested_id}"),
    )
}
