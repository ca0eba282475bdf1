use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::account::Account;
use crate::utils::crypto;

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, full_name, designation, phone, created_at";

/// Identity store: owns the accounts table and the password checks.
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
}

impl AccountService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts ORDER BY created_at",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    /// Password sign-in. The same rejection covers an unknown email and a
    /// wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Account> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

        let verified = crypto::verify_password(password, &account.password_hash)
            .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
        if !verified {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }
        Ok(account)
    }

    pub async fn create(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        designation: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Account> {
        let password_hash = crypto::hash_password(password)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (email, password_hash, full_name, designation, phone) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(designation)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    /// Signup path: an identity that already exists is reused rather than
    /// recreated, so repeating a signup never duplicates accounts.
    pub async fn find_or_create(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
        designation: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Account> {
        if let Some(existing) = self.find_by_email(email).await? {
            return Ok(existing);
        }
        self.create(email, password, full_name, designation, phone)
            .await
    }
}
