use serde::{Deserialize, Serialize};

use crate::models::profile::Gender;
use crate::models::user::{Role, User};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub gender: Gender,
    pub institute_name: String,
    pub degree: String,
    pub roll_no: String,
    pub age: i64,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounsellorSignupRequest {
    pub name: String,
    pub gender: Gender,
    pub institute_name: String,
    pub email: String,
    pub phone: String,
    pub employee_id: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounsellorLoginRequest {
    pub email: String,
    pub employee_id: String,
    pub password: String,
}

/// Projection of the caller returned alongside a fresh token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        SessionUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}
