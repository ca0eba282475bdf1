use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::admin_dto::RepairedAccount;
use crate::error::Result;
use crate::models::account::Account;
use crate::models::profile::Profile;

const PROFILE_COLUMNS: &str =
    "id, email, full_name, designation, phone, is_admin, created_at, updated_at";

/// Privilege-record repository. Every write path here forces the admin
/// flag on; the system has no non-privileged authenticated identity.
#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Insert-or-update keyed on the account id. One parameterized
    /// statement; repeating it for the same identity leaves exactly one
    /// row with `is_admin` true. Absent inputs never overwrite data a
    /// previous bootstrap already stored.
    pub async fn upsert_privilege(
        &self,
        id: Uuid,
        email: Option<&str>,
        full_name: Option<&str>,
        designation: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (id, email, full_name, designation, phone, is_admin) \
             VALUES ($1, $2, $3, $4, $5, TRUE) \
             ON CONFLICT (id) DO UPDATE SET \
                 is_admin = TRUE, \
                 email = COALESCE(EXCLUDED.email, profiles.email), \
                 full_name = COALESCE(EXCLUDED.full_name, profiles.full_name), \
                 designation = COALESCE(EXCLUDED.designation, profiles.designation), \
                 phone = COALESCE(EXCLUDED.phone, profiles.phone), \
                 updated_at = NOW() \
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(email)
        .bind(full_name)
        .bind(designation)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Post-authentication bootstrap: guarantee the identity has a
    /// privilege record with the flag set. Callers on the login path
    /// swallow the error; a stale flag beats a failed login.
    pub async fn ensure_admin(&self, account: &Account) -> Result<()> {
        match self.get(account.id).await? {
            Some(profile) if profile.is_admin => Ok(()),
            _ => {
                self.upsert_privilege(
                    account.id,
                    Some(&account.email),
                    Some(&account.display_name()),
                    None,
                    None,
                )
                .await?;
                Ok(())
            }
        }
    }

    /// Operator repair tool: re-applies the privilege upsert to every
    /// known identity, one at a time. A failure is recorded against its
    /// account and the loop moves on.
    pub async fn fix_all_accounts(&self, accounts: &[Account]) -> (String, Vec<RepairedAccount>) {
        let mut report = Vec::with_capacity(accounts.len());
        for account in accounts {
            let outcome = self
                .upsert_privilege(
                    account.id,
                    Some(&account.email),
                    Some(&account.display_name()),
                    None,
                    None,
                )
                .await;
            match outcome {
                Ok(_) => report.push(RepairedAccount {
                    id: account.id,
                    email: account.email.clone(),
                    fixed: true,
                    error: None,
                }),
                Err(e) => {
                    tracing::error!(account = %account.id, error = %e, "failed to repair account");
                    report.push(RepairedAccount {
                        id: account.id,
                        email: account.email.clone(),
                        fixed: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        let fixed = report.iter().filter(|r| r.fixed).count();
        let message = format!("Fixed {} out of {} users", fixed, report.len());
        (message, report)
    }

    /// Idempotent schema ensure backing the setup endpoint. Returns
    /// whether the profiles table already existed, then re-arms the
    /// privilege flag on any row that lost it.
    pub async fn ensure_schema(&self) -> Result<bool> {
        let existed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (\
                 SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_name = 'profiles'\
             )",
        )
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profiles (\
                 id UUID PRIMARY KEY, \
                 email TEXT, \
                 full_name TEXT, \
                 designation TEXT, \
                 phone TEXT, \
                 is_admin BOOLEAN NOT NULL DEFAULT TRUE, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("UPDATE profiles SET is_admin = TRUE WHERE is_admin = FALSE")
            .execute(&self.pool)
            .await?;

        Ok(existed)
    }
}
