use chrono::NaiveDateTime;

/// Source of the current local time for stop stamps and recency queries.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}
