use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")] // SQL value name
#[serde(rename_all = "UPPERCASE")] // JSON value name
pub enum Role {
    Student,
    Counsellor,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Shared lookup column: a student's roll number or a counsellor's
    /// employee id.
    pub roll_no: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal projection of a user shown to their assigned peer.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub institute_name: Option<String>,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

impl User {
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        roll_no: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Self> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            roll_no: roll_no.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, roll_no, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.roll_no)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Role-scoped credential check. Counsellor logins must additionally
    /// present the employee id stored in `roll_no`. Any mismatch yields
    /// `None`; the caller cannot tell which check failed.
    pub async fn verify_credentials(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        role: Role,
        employee_id: Option<&str>,
    ) -> Result<Option<Self>> {
        let Some(user) = Self::find_by_email(pool, email).await? else {
            return Ok(None);
        };
        if user.role != role {
            return Ok(None);
        }
        if let Some(employee_id) = employee_id {
            if user.roll_no != employee_id {
                return Ok(None);
            }
        }
        if !verify_password(&user.password_hash, password) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub async fn email_or_roll_taken(
        pool: &SqlitePool,
        email: &str,
        roll_no: &str,
    ) -> Result<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? OR roll_no = ?)")
                .bind(email)
                .bind(roll_no)
                .fetch_one(pool)
                .await?;
        Ok(taken)
    }

    pub async fn update_name(pool: &SqlitePool, user_id: &str, name: &str) -> Result<()> {
        sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(
        pool: &SqlitePool,
        user_id: &str,
        password_hash: &str,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Id pool used by the assignment resolver's random pick.
    pub async fn counsellor_ids(pool: &SqlitePool) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM users WHERE role = ?")
            .bind(Role::Counsellor)
            .fetch_all(pool)
            .await?;
        Ok(ids)
    }

    pub async fn peer_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<PeerProfile>> {
        let profile = sqlx::query_as::<_, PeerProfile>(
            r#"
            SELECT u.id, u.name, u.email, u.roll_no, p.institute_name
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_round_trips() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password(&hashed, "correct horse"));
        assert!(!verify_password(&hashed, "wrong horse"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
