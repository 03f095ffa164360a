use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;

use crate::adapters::api::ApiState;
use crate::app::services::InMemorySessionService;
use crate::domain::clock::Clock;
use crate::domain::session_registry::SessionRegistry;

pub fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .expect("test timestamp should parse")
}

pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn set(&self, value: NaiveDateTime) {
        *self.now.lock().expect("clock lock should be available") = value;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("clock lock should be available")
    }
}

pub fn test_service(clock: Arc<FixedClock>) -> (InMemorySessionService, Arc<SessionRegistry>) {
    let registry = Arc::new(SessionRegistry::new());
    let service = InMemorySessionService::new(Arc::clone(&registry), clock);
    (service, registry)
}

pub fn test_state(clock: Arc<FixedClock>) -> (ApiState, Arc<SessionRegistry>) {
    let (service, registry) = test_service(clock);
    (
        ApiState {
            sessions: service,
        },
        registry,
    )
}
