use std::collections::HashMap;
use std::path::Path;

use crate::app::AppError;

const ENV_FILE: &str = ".env";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: String,
    pub http_workers: Option<usize>,
    pub cors_allowed_origin: Option<String>,
    pub log_level: String,
    pub env_file_loaded: bool,
}

impl AppConfig {
    /// Reads configuration from the process environment, falling back to an
    /// optional `.env` file in the working directory.
    pub fn from_env() -> Result<Self, AppError> {
        let file_values = read_env_file(Path::new(ENV_FILE))?;
        let env_file_loaded = file_values.is_some();
        let file_values = file_values.unwrap_or_default();

        let mut config = Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_values.get(key).cloned())
        })?;
        config.env_file_loaded = env_file_loaded;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_workers = match non_empty(&lookup, "HTTP_WORKERS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(workers) if workers > 0 => Some(workers),
                _ => {
                    return Err(AppError::config(
                        "HTTP_WORKERS must be a positive number",
                    ));
                }
            },
            None => None,
        };

        Ok(Self {
            http_bind: non_empty(&lookup, "HTTP_BIND")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            http_workers,
            cors_allowed_origin: non_empty(&lookup, "CORS_ALLOWED_ORIGIN"),
            log_level: non_empty(&lookup, "LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            env_file_loaded: false,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a dotenv file without touching the process environment.
/// A missing file yields `Ok(None)`.
fn read_env_file(path: &Path) -> Result<Option<HashMap<String, String>>, AppError> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(error) if error.not_found() => return Ok(None),
        Err(error) => return Err(AppError::config(format!("{}: {error}", path.display()))),
    };

    let mut values = HashMap::new();
    for entry in entries {
        let (key, value) =
            entry.map_err(|error| AppError::config(format!("{}: {error}", path.display())))?;
        values.insert(key, value);
    }

    Ok(Some(values))
}
