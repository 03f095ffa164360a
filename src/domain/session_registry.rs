use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::minute_key::MinuteKey;
use crate::domain::models::ChargingSession;

const RECENCY_WINDOW_SECONDS: i64 = 60;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no session with id {0}")]
    NotFound(Uuid),
}

type Bucket = HashMap<Uuid, ChargingSession>;

#[derive(Debug, Default)]
struct RegistryState {
    buckets: HashMap<MinuteKey, Bucket>,
    locations: HashMap<Uuid, MinuteKey>,
}

/// In-memory store of charging sessions, bucketed by the minute of their most
/// recent lifecycle event.
///
/// The bucket map and the location index live behind one mutex, so each
/// operation is a single unit of atomicity: a session is always in exactly one
/// bucket and the index always points at it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, station_id: &str, started_at: NaiveDateTime) -> ChargingSession {
        let session = ChargingSession::start(station_id, started_at);
        let key = MinuteKey::of(started_at);

        let mut state = self.lock();
        state
            .buckets
            .entry(key)
            .or_default()
            .insert(session.id(), session.clone());
        state.locations.insert(session.id(), key);
        drop(state);

        tracing::debug!(
            session_id = %session.id(),
            station_id = %session.station_id(),
            bucket = %key,
            "session registered"
        );

        session
    }

    /// Stops a session and moves it to the bucket of `stopped_at`.
    ///
    /// Stopping an already stopped session returns it unchanged.
    pub fn stop(
        &self,
        id: Uuid,
        stopped_at: NaiveDateTime,
    ) -> Result<ChargingSession, RegistryError> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let current_key = state
            .locations
            .get(&id)
            .copied()
            .ok_or(RegistryError::NotFound(id))?;
        let bucket = state
            .buckets
            .get_mut(&current_key)
            .ok_or(RegistryError::NotFound(id))?;

        let mut session = match bucket.entry(id) {
            Entry::Vacant(_) => return Err(RegistryError::NotFound(id)),
            Entry::Occupied(entry) if entry.get().is_stopped() => {
                return Ok(entry.get().clone());
            }
            Entry::Occupied(entry) => entry.remove(),
        };
        if bucket.is_empty() {
            state.buckets.remove(&current_key);
        }

        session.mark_stopped(stopped_at);
        let next_key = MinuteKey::of(stopped_at);
        state
            .buckets
            .entry(next_key)
            .or_default()
            .insert(id, session.clone());
        state.locations.insert(id, next_key);
        drop(guard);

        tracing::debug!(
            session_id = %id,
            from_bucket = %current_key,
            to_bucket = %next_key,
            "session stopped"
        );

        Ok(session)
    }

    pub fn list_all(&self) -> Vec<ChargingSession> {
        let state = self.lock();
        state
            .buckets
            .values()
            .flat_map(|bucket| bucket.values().cloned())
            .collect()
    }

    /// Sessions whose last lifecycle event happened within the 60 seconds before `now`.
    ///
    /// Only the bucket holding `now` and the bucket holding `now - 60s` are read.
    /// The first is taken whole; the second is filtered to events strictly after
    /// the cutoff. Older buckets are never inspected.
    pub fn list_updated_last_minute(&self, now: NaiveDateTime) -> Vec<ChargingSession> {
        let cutoff = now - Duration::seconds(RECENCY_WINDOW_SECONDS);
        let current_key = MinuteKey::of(now);
        let previous_key = MinuteKey::of(cutoff);

        let state = self.lock();
        let mut sessions: Vec<ChargingSession> = state
            .buckets
            .get(&current_key)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default();

        if previous_key != current_key
            && let Some(bucket) = state.buckets.get(&previous_key)
        {
            sessions.extend(
                bucket
                    .values()
                    .filter(|session| session.last_updated_at() > cutoff)
                    .cloned(),
            );
        }

        sessions
    }

    #[cfg(test)]
    pub(crate) fn bucket_of(&self, id: Uuid) -> Option<MinuteKey> {
        self.lock().locations.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every mutation happens after its fallible lookups, so a poisoned lock
    // still guards a settled state.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
