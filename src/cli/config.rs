use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session cookies kept between `gatectl` invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub server: String,
    pub token: String,
    /// Raw `user` cookie value (JSON principal)
    pub user: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(server: String, token: String, user: String) -> Self {
        Self {
            server,
            token,
            user,
            saved_at: Utc::now(),
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("GATECTL_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("gatectl")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> anyhow::Result<Option<StoredSession>> {
    let session_file = get_config_dir()?.join("session.json");

    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn save_session(session: &StoredSession) -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<()> {
    let session_file = get_config_dir()?.join("session.json");

    if session_file.exists() {
        fs::remove_file(session_file)?;
    }
    Ok(())
}
