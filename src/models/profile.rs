use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Optional extension record alongside the core user row. Absence of the row
/// means "no extended profile yet" and is never an error.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileExtension {
    #[serde(skip_serializing)]
    pub user_id: String,
    pub gender: Option<Gender>,
    pub degree: Option<String>,
    pub institute_name: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub share_reports: Option<bool>,
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Field-wise patch; `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub gender: Option<Gender>,
    pub degree: Option<String>,
    pub institute_name: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub share_reports: Option<bool>,
    pub profile_image_url: Option<String>,
}

impl ProfileExtension {
    pub async fn find(pool: &SqlitePool, user_id: &str) -> Result<Option<Self>> {
        let extension =
            sqlx::query_as::<_, ProfileExtension>("SELECT * FROM user_profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(extension)
    }

    /// Creates or updates the extension row. COALESCE keeps existing values
    /// for fields the patch does not provide.
    pub async fn upsert(pool: &SqlitePool, user_id: &str, patch: &ProfilePatch) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles
                (user_id, gender, degree, institute_name, age, phone, share_reports, profile_image_url, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                gender = COALESCE(excluded.gender, gender),
                degree = COALESCE(excluded.degree, degree),
                institute_name = COALESCE(excluded.institute_name, institute_name),
                age = COALESCE(excluded.age, age),
                phone = COALESCE(excluded.phone, phone),
                share_reports = COALESCE(excluded.share_reports, share_reports),
                profile_image_url = COALESCE(excluded.profile_image_url, profile_image_url),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(patch.gender)
        .bind(&patch.degree)
        .bind(&patch.institute_name)
        .bind(patch.age)
        .bind(&patch.phone)
        .bind(patch.share_reports)
        .bind(&patch.profile_image_url)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }
}
