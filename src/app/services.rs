use std::sync::Arc;

use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::models::{ChargingSession, StatusSummary};
use crate::domain::session_registry::{RegistryError, SessionRegistry};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    #[error("no sessions found with id={0}")]
    SessionNotFound(Uuid),
}

impl From<RegistryError> for ServiceError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound(id) => Self::SessionNotFound(id),
        }
    }
}

pub trait SessionQueryHandler {
    fn list_sessions(&self) -> Vec<ChargingSession>;
    fn summarize_last_minute(&self) -> StatusSummary;
}

pub trait SessionCommandHandler {
    fn submit_session(&self, station_id: &str, started_at: NaiveDateTime) -> ChargingSession;
    fn stop_session(&self, id: Uuid) -> Result<ChargingSession, ServiceError>;
}

#[derive(Clone)]
pub struct InMemorySessionService {
    registry: Arc<SessionRegistry>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionService {
    pub fn new(registry: Arc<SessionRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }
}

impl SessionQueryHandler for InMemorySessionService {
    fn list_sessions(&self) -> Vec<ChargingSession> {
        self.registry.list_all()
    }

    fn summarize_last_minute(&self) -> StatusSummary {
        let recent = self.registry.list_updated_last_minute(self.clock.now());
        StatusSummary::from_sessions(&recent)
    }
}

impl SessionCommandHandler for InMemorySessionService {
    fn submit_session(&self, station_id: &str, started_at: NaiveDateTime) -> ChargingSession {
        self.registry.create(station_id, started_at)
    }

    fn stop_session(&self, id: Uuid) -> Result<ChargingSession, ServiceError> {
        self.registry
            .stop(id, self.clock.now())
            .map_err(ServiceError::from)
    }
}
