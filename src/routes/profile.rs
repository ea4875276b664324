use std::sync::Arc;

use actix_web::{get, post, put, web, Error};
use serde_json::json;
use tracing::{error, warn};

use crate::error;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::profile::{ProfileExtension, ProfilePatch};
use crate::models::user::{hash_password, verify_password, User};
use crate::models::ActivityEntry;
use crate::types::{
    ActivityResponse, ChangePasswordRequest, ProfileResponse, ProfileUser, SuccessResponse,
    UpdateProfileRequest,
};
use crate::AppState;

#[get("")]
pub async fn get_profile(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<web::Json<ProfileResponse>, Error> {
    let pool = &app_state.pool;

    let core = User::find_by_id(pool, &user.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {:?}", e);
            error::internal("Internal Server Error")
        })?
        .ok_or_else(|| error::not_found("User not found"))?;

    // The extension record is optional; a failed read degrades to the core
    // profile rather than failing the request.
    let extension = ProfileExtension::find(pool, &user.user_id)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to load extended profile for {}: {:?}", user.user_id, e);
            None
        });

    Ok(web::Json(ProfileResponse {
        user: ProfileUser::assemble(core, extension),
    }))
}

#[put("")]
pub async fn update_profile(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<web::Json<ProfileResponse>, Error> {
    let pool = &app_state.pool;
    let req = body.into_inner();

    if let Some(name) = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        User::update_name(pool, &user.user_id, name).await.map_err(|e| {
            error!("Failed to update name: {:?}", e);
            error::bad_request("Failed to update profile")
        })?;
    }

    let patch = ProfilePatch {
        gender: req.gender,
        degree: req.degree.clone(),
        institute_name: req.institute_name.clone(),
        age: req.age,
        phone: req.phone.clone(),
        share_reports: req.share_reports,
        profile_image_url: req.profile_image_url.clone(),
    };
    if let Err(e) = ProfileExtension::upsert(pool, &user.user_id, &patch).await {
        warn!("Failed to update extended profile for {}: {:?}", user.user_id, e);
    }

    ActivityEntry::record(
        pool,
        &user.user_id,
        "PROFILE_UPDATED",
        Some(json!({
            "name": req.name,
            "gender": req.gender,
            "degree": req.degree,
            "instituteName": req.institute_name,
            "age": req.age,
            "phone": req.phone,
            "shareReports": req.share_reports,
            "profileImageUrl": req.profile_image_url,
        })),
    )
    .await;

    let core = User::find_by_id(pool, &user.user_id)
        .await
        .map_err(|e| {
            error!("Failed to reload user: {:?}", e);
            error::internal("Internal Server Error")
        })?
        .ok_or_else(|| error::not_found("User not found"))?;
    let extension = ProfileExtension::find(pool, &user.user_id)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to load extended profile for {}: {:?}", user.user_id, e);
            None
        });

    Ok(web::Json(ProfileResponse {
        user: ProfileUser::assemble(core, extension),
    }))
}

#[post("/change-password")]
pub async fn change_password(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<ChangePasswordRequest>,
) -> Result<web::Json<SuccessResponse>, Error> {
    let pool = &app_state.pool;
    let req = body.into_inner();

    let (Some(current_password), Some(new_password), Some(confirm_password)) =
        (req.current_password, req.new_password, req.confirm_password)
    else {
        return Err(error::bad_request("All fields are required"));
    };
    if new_password.len() < 8 {
        return Err(error::bad_request("New password must be at least 8 characters"));
    }
    if new_password != confirm_password {
        return Err(error::bad_request("Passwords do not match"));
    }

    let core = User::find_by_id(pool, &user.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {:?}", e);
            error::internal("Internal Server Error")
        })?
        .ok_or_else(|| error::not_found("User not found"))?;

    if !verify_password(&core.password_hash, &current_password) {
        return Err(error::bad_request("Current password is incorrect"));
    }

    let password_hash = hash_password(&new_password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        error::internal("Internal Server Error")
    })?;
    User::update_password(pool, &core.id, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to update password: {:?}", e);
            error::internal("Internal Server Error")
        })?;

    ActivityEntry::record(
        pool,
        &core.id,
        "PASSWORD_CHANGED",
        Some(json!({ "at": chrono::Utc::now().to_rfc3339() })),
    )
    .await;

    Ok(web::Json(SuccessResponse::ok()))
}

#[get("/activity")]
pub async fn get_activity(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<web::Json<ActivityResponse>, Error> {
    let items = ActivityEntry::recent(&app_state.pool, &user.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load activity: {:?}", e);
            error::internal("Internal Server Error")
        })?;

    Ok(web::Json(ActivityResponse { items }))
}
