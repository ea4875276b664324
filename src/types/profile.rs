use serde::{Deserialize, Serialize};

use crate::models::profile::{Gender, ProfileExtension};
use crate::models::user::{Role, User};
use crate::models::ActivityEntry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub degree: Option<String>,
    pub institute_name: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub share_reports: Option<bool>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Core user row merged with the optional extension record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub role: Role,
    pub gender: Option<Gender>,
    pub degree: Option<String>,
    pub institute_name: Option<String>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub share_reports: Option<bool>,
    pub profile_image_url: Option<String>,
}

impl ProfileUser {
    pub fn assemble(user: User, extension: Option<ProfileExtension>) -> Self {
        let extension = extension.unwrap_or(ProfileExtension {
            user_id: user.id.clone(),
            gender: None,
            degree: None,
            institute_name: None,
            age: None,
            phone: None,
            share_reports: None,
            profile_image_url: None,
            updated_at: user.updated_at,
        });
        ProfileUser {
            id: user.id,
            name: user.name,
            email: user.email,
            roll_no: user.roll_no,
            role: user.role,
            gender: extension.gender,
            degree: extension.degree,
            institute_name: extension.institute_name,
            age: extension.age,
            phone: extension.phone,
            share_reports: extension.share_reports,
            profile_image_url: extension.profile_image_url,
        }
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

#[derive(Serialize)]
pub struct ActivityResponse {
    pub items: Vec<ActivityEntry>,
}
