use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Display name used when seeding a privilege record: explicit name,
    /// else the email local part, else a fixed fallback.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.email
            .split('@')
            .next()
            .filter(|part| !part.is_empty())
            .unwrap_or("Admin")
            .to_string()
    }
}
