pub mod clock;
pub mod minute_key;
pub mod models;
pub mod session_registry;
