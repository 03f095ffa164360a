use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    InProgress,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargingSession {
    id: Uuid,
    station_id: String,
    started_at: NaiveDateTime,
    stopped_at: Option<NaiveDateTime>,
    status: SessionStatus,
}

impl ChargingSession {
    pub fn start(station_id: impl Into<String>, started_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            station_id: station_id.into(),
            started_at,
            stopped_at: None,
            status: SessionStatus::InProgress,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn stopped_at(&self) -> Option<NaiveDateTime> {
        self.stopped_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_stopped(&self) -> bool {
        self.status == SessionStatus::Stopped
    }

    /// Timestamp of the most recent lifecycle event: the stop time once stopped,
    /// otherwise the start time.
    pub fn last_updated_at(&self) -> NaiveDateTime {
        self.stopped_at.unwrap_or(self.started_at)
    }

    pub(crate) fn mark_stopped(&mut self, stopped_at: NaiveDateTime) {
        self.stopped_at = Some(stopped_at);
        self.status = SessionStatus::Stopped;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub total_count: usize,
    pub started_count: usize,
    pub stopped_count: usize,
}

impl StatusSummary {
    pub fn from_sessions(sessions: &[ChargingSession]) -> Self {
        sessions
            .iter()
            .fold(Self::default(), |mut summary, session| {
                summary.total_count += 1;
                match session.status() {
                    SessionStatus::InProgress => summary.started_count += 1,
                    SessionStatus::Stopped => summary.stopped_count += 1,
                }
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{ChargingSession, SessionStatus, StatusSummary};
    use crate::test_support::at;

    #[test]
    fn new_session_is_in_progress_without_stop_time() {
        let session = ChargingSession::start("ABC-12345", at("2019-05-06T19:00:20.529"));

        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.stopped_at(), None);
        assert_eq!(session.last_updated_at(), at("2019-05-06T19:00:20.529"));
    }

    #[test]
    fn stopping_moves_last_update_to_stop_time() {
        let mut session = ChargingSession::start("ABC-12345", at("2019-05-06T19:00:20"));
        session.mark_stopped(at("2019-05-06T19:45:00"));

        assert!(session.is_stopped());
        assert_eq!(session.stopped_at(), Some(at("2019-05-06T19:45:00")));
        assert_eq!(session.last_updated_at(), at("2019-05-06T19:45:00"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = ChargingSession::start("ABC-12345", at("2019-05-06T19:00:20"));
        let second = ChargingSession::start("ABC-12345", at("2019-05-06T19:00:20"));

        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn summary_groups_sessions_by_status() {
        let mut stopped = ChargingSession::start("ABC-12345", at("2019-05-06T19:00:00"));
        stopped.mark_stopped(at("2019-05-06T19:00:30"));
        let sessions = vec![
            ChargingSession::start("ABC-12345", at("2019-05-06T19:00:10")),
            ChargingSession::start("XYZ-1", at("2019-05-06T19:00:11")),
            stopped,
        ];

        assert_eq!(
            StatusSummary::from_sessions(&sessions),
            StatusSummary {
                total_count: 3,
                started_count: 2,
                stopped_count: 1,
            }
        );
    }

    #[test]
    fn summary_of_nothing_is_all_zero() {
        assert_eq!(StatusSummary::from_sessions(&[]), StatusSummary::default());
    }

    #[test]
    fn status_serializes_in_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::InProgress).expect("status should serialize"),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Stopped).expect("status should serialize"),
            "\"STOPPED\""
        );
    }
}
