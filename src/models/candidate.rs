use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle stage of an applicant. Any stage may be set directly at any
/// time; there is no enforced transition graph.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "candidate_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    #[default]
    New,
    Reviewing,
    Interviewed,
    Offer,
    Rejected,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::New => "new",
            CandidateStatus::Reviewing => "reviewing",
            CandidateStatus::Interviewed => "interviewed",
            CandidateStatus::Offer => "offer",
            CandidateStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(CandidateStatus::New),
            "reviewing" => Ok(CandidateStatus::Reviewing),
            "interviewed" => Ok(CandidateStatus::Interviewed),
            "offer" => Ok(CandidateStatus::Offer),
            "rejected" => Ok(CandidateStatus::Rejected),
            other => Err(format!("Invalid status value: {}", other)),
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub skills: Vec<String>,
    pub experience: i32,
    pub education: String,
    pub resume: Option<String>,
    pub status: CandidateStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_str() {
        for s in ["new", "reviewing", "interviewed", "offer", "rejected"] {
            assert_eq!(CandidateStatus::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(CandidateStatus::from_str("archived").is_err());
        assert!(CandidateStatus::from_str("New").is_err());
    }

    #[test]
    fn default_status_is_new() {
        assert_eq!(CandidateStatus::default(), CandidateStatus::New);
    }
}
