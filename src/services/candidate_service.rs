use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::candidate_dto::{CandidateUpdate, NewCandidate};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, position, skills, experience, \
     education, resume, status, notes, created_at, updated_at";

/// Capacity of the insert-event fanout channel. Slow subscribers skip
/// events rather than block writers.
const EVENT_BUFFER: usize = 64;

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
    events: broadcast::Sender<Candidate>,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self { pool, events }
    }

    /// Subscription to candidate-insert events. The receiver closes when
    /// dropped; nothing is buffered for absent listeners.
    pub fn subscribe(&self) -> broadcast::Receiver<Candidate> {
        self.events.subscribe()
    }

    pub async fn list(&self) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {} FROM candidates ORDER BY created_at DESC",
            CANDIDATE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "SELECT {} FROM candidates WHERE id = $1",
            CANDIDATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    pub async fn create(&self, new: NewCandidate) -> Result<Candidate> {
        // Surfaces connectivity/configuration problems before the write.
        sqlx::query("SELECT 1 FROM candidates LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "INSERT INTO candidates \
                 (name, email, phone, position, skills, experience, education, resume, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {}",
            CANDIDATE_COLUMNS
        ))
        .bind(new.name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.position)
        .bind(new.skills)
        .bind(new.experience)
        .bind(new.education)
        .bind(new.resume)
        .bind(new.status)
        .bind(new.notes)
        .fetch_one(&self.pool)
        .await?;

        let _ = self.events.send(candidate.clone());
        Ok(candidate)
    }

    /// Merges the supplied fields onto the stored record and persists the
    /// result. `created_at` is immutable; `updated_at` refreshes.
    pub async fn update(&self, id: Uuid, update: CandidateUpdate) -> Result<Candidate> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        let candidate = sqlx::query_as::<_, Candidate>(&format!(
            "UPDATE candidates SET \
                 name = $1, email = $2, phone = $3, position = $4, skills = $5, \
                 experience = $6, education = $7, resume = $8, status = $9, notes = $10, \
                 updated_at = NOW() \
             WHERE id = $11 \
             RETURNING {}",
            CANDIDATE_COLUMNS
        ))
        .bind(update.name.unwrap_or(existing.name))
        .bind(update.email.unwrap_or(existing.email))
        .bind(update.phone.or(existing.phone))
        .bind(update.position.unwrap_or(existing.position))
        .bind(update.skills.unwrap_or(existing.skills))
        .bind(update.experience.unwrap_or(existing.experience))
        .bind(update.education.unwrap_or(existing.education))
        .bind(update.resume.or(existing.resume))
        .bind(update.status.unwrap_or(existing.status))
        .bind(update.notes.or(existing.notes))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(candidate)
    }

    /// Removes the row if present. Deleting an id that does not exist is
    /// not an error; only a genuine store failure surfaces.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn total_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM candidates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn status_counts(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status::TEXT, COUNT(*) FROM candidates GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
