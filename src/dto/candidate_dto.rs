use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};

/// Inbound candidate payload. `skills` and `experience` stay loosely
/// typed because callers are known to send strings where lists and
/// numbers belong; normalization coerces them before anything touches
/// the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub skills: Option<JsonValue>,
    pub experience: Option<JsonValue>,
    pub education: Option<String>,
    pub resume: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// A payload that passed the create-path checks: every required field
/// present, skills a real list, experience a non-negative integer.
#[derive(Debug, Clone)]
pub struct NewCandidate {
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
}

/// Partial update: only supplied fields are touched.
#[derive(Debug, Clone, Default)]
pub struct CandidateUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<i32>,
    pub education: Option<String>,
    pub resume: Option<String>,
    pub status: Option<CandidateStatus>,
    pub notes: Option<String>,
}

impl CandidatePayload {
    /// Create-path normalization. Required fields are checked in a fixed
    /// order and the first missing one names itself in the rejection.
    pub fn normalize_new(self) -> Result<NewCandidate> {
        let name = require_text("name", self.name)?;
        let email = require_text("email", self.email)?;
        let position = require_text("position", self.position)?;
        let skills = coerce_skills(require_value("skills", self.skills)?);
        let experience = coerce_experience(require_value("experience", self.experience)?);
        let education = require_text("education", self.education)?;
        let status = parse_status(require_text("status", self.status)?)?;

        Ok(NewCandidate {
            name,
            email,
            phone: self.phone,
            position,
            skills,
            experience,
            education,
            resume: self.resume,
            status,
            notes: self.notes,
        })
    }

    /// Update-path normalization: no presence requirements, the same
    /// coercion rules for whatever was supplied.
    pub fn normalize_update(self) -> Result<CandidateUpdate> {
        let skills = self
            .skills
            .filter(|v| !v.is_null())
            .map(coerce_skills);
        let experience = self
            .experience
            .filter(|v| !v.is_null())
            .map(coerce_experience);
        let status = self.status.map(parse_status).transpose()?;

        Ok(CandidateUpdate {
            name: self.name,
            email: self.email,
            phone: self.phone,
            position: self.position,
            skills,
            experience,
            education: self.education,
            resume: self.resume,
            status,
            notes: self.notes,
        })
    }
}

fn missing(field: &str) -> Error {
    Error::BadRequest(format!("Missing required field: {}", field))
}

fn require_text(field: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| missing(field))
}

fn require_value(field: &str, value: Option<JsonValue>) -> Result<JsonValue> {
    match value {
        Some(JsonValue::Null) | None => Err(missing(field)),
        Some(v) => Ok(v),
    }
}

fn parse_status(raw: String) -> Result<CandidateStatus> {
    CandidateStatus::from_str(&raw).map_err(Error::BadRequest)
}

/// Skills arrive as a list, a JSON-encoded list, or a bare value. A bare
/// string that fails to parse as a JSON string array wraps into a
/// one-element list.
fn coerce_skills(value: JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items.into_iter().map(stringify).collect(),
        JsonValue::String(s) => match serde_json::from_str::<Vec<String>>(&s) {
            Ok(parsed) => parsed,
            Err(_) => vec![s],
        },
        JsonValue::Null => Vec::new(),
        other => vec![stringify(other)],
    }
}

fn stringify(value: JsonValue) -> String {
    match value {
        JsonValue::String(s) => s,
        other => other.to_string(),
    }
}

/// Experience arrives as a number or a numeric string; anything else
/// coerces to zero. Negative input floors to zero, the at-rest invariant
/// being a non-negative integer.
fn coerce_experience(value: JsonValue) -> i32 {
    let parsed = match value {
        JsonValue::Number(n) => n.as_i64().unwrap_or(0),
        JsonValue::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    parsed.clamp(0, i32::MAX as i64) as i32
}

/// Externally visible candidate shape (camelCase timestamps).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub position: String,
    pub skills: Vec<String>,
    pub experience: i32,
    pub education: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    pub status: CandidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Candidate> for CandidateResponse {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            position: c.position,
            skills: c.skills,
            experience: c.experience,
            education: c.education,
            resume: c.resume,
            status: c.status,
            notes: c.notes,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> CandidatePayload {
        serde_json::from_value(json!({
            "name": "Jo Doe",
            "email": "jo@example.com",
            "position": "Backend Engineer",
            "skills": ["rust", "sql"],
            "experience": 4,
            "education": "BSc",
            "status": "new"
        }))
        .unwrap()
    }

    #[test]
    fn valid_payload_normalizes() {
        let n = full_payload().normalize_new().unwrap();
        assert_eq!(n.name, "Jo Doe");
        assert_eq!(n.skills, vec!["rust", "sql"]);
        assert_eq!(n.experience, 4);
        assert_eq!(n.status, CandidateStatus::New);
        assert!(n.phone.is_none());
        assert!(n.resume.is_none());
        assert!(n.notes.is_none());
    }

    #[test]
    fn each_missing_required_field_is_named() {
        for field in [
            "name",
            "email",
            "position",
            "skills",
            "experience",
            "education",
            "status",
        ] {
            let mut value = json!({
                "name": "Jo",
                "email": "jo@example.com",
                "position": "Dev",
                "skills": [],
                "experience": 0,
                "education": "BSc",
                "status": "new"
            });
            value.as_object_mut().unwrap().remove(field);
            let payload: CandidatePayload = serde_json::from_value(value).unwrap();
            match payload.normalize_new() {
                Err(Error::BadRequest(msg)) => {
                    assert_eq!(msg, format!("Missing required field: {}", field))
                }
                other => panic!("expected rejection for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn null_required_field_is_treated_as_missing() {
        let mut payload = full_payload();
        payload.skills = Some(JsonValue::Null);
        match payload.normalize_new() {
            Err(Error::BadRequest(msg)) => assert_eq!(msg, "Missing required field: skills"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn skills_json_array_string_parses() {
        assert_eq!(
            coerce_skills(json!("[\"rust\", \"tokio\"]")),
            vec!["rust", "tokio"]
        );
    }

    #[test]
    fn skills_plain_string_wraps() {
        assert_eq!(coerce_skills(json!("rust")), vec!["rust"]);
        // A JSON-looking string that is not a string array still wraps.
        assert_eq!(coerce_skills(json!("[1, 2]")), vec!["[1, 2]"]);
    }

    #[test]
    fn skills_non_string_elements_are_stringified() {
        assert_eq!(coerce_skills(json!(["rust", 7])), vec!["rust", "7"]);
        assert_eq!(coerce_skills(json!(5)), vec!["5"]);
    }

    #[test]
    fn experience_numeric_string_parses() {
        assert_eq!(coerce_experience(json!("5")), 5);
        assert_eq!(coerce_experience(json!(" 12 ")), 12);
    }

    #[test]
    fn experience_garbage_defaults_to_zero() {
        assert_eq!(coerce_experience(json!("several")), 0);
        assert_eq!(coerce_experience(json!({"years": 3})), 0);
        assert_eq!(coerce_experience(json!(true)), 0);
    }

    #[test]
    fn experience_negative_floors_to_zero() {
        assert_eq!(coerce_experience(json!(-3)), 0);
        assert_eq!(coerce_experience(json!("-3")), 0);
    }

    #[test]
    fn invalid_status_is_rejected() {
        let mut payload = full_payload();
        payload.status = Some("archived".to_string());
        match payload.normalize_new() {
            Err(Error::BadRequest(msg)) => assert_eq!(msg, "Invalid status value: archived"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let payload: CandidatePayload = serde_json::from_value(json!({
            "status": "offer",
            "experience": "7"
        }))
        .unwrap();
        let update = payload.normalize_update().unwrap();
        assert_eq!(update.status, Some(CandidateStatus::Offer));
        assert_eq!(update.experience, Some(7));
        assert!(update.name.is_none());
        assert!(update.skills.is_none());
    }

    #[test]
    fn response_shape_uses_camel_case_timestamps() {
        let response = CandidateResponse {
            id: Uuid::nil(),
            name: "Jo".into(),
            email: "jo@example.com".into(),
            phone: None,
            position: "Dev".into(),
            skills: vec![],
            experience: 0,
            education: "BSc".into(),
            resume: None,
            status: CandidateStatus::New,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
        assert!(value.get("phone").is_none());
        assert_eq!(value["status"], "new");
    }
}
