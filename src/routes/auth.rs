use std::sync::Arc;

use actix_web::{post, web, Error};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error;
use crate::models::profile::{ProfileExtension, ProfilePatch};
use crate::models::user::{hash_password, Role, User};
use crate::models::Assignment;
use crate::types::{
    CounsellorLoginRequest, CounsellorSignupRequest, LoginRequest, LoginResponse, SessionUser,
    SignupRequest, SuccessResponse,
};
use crate::{AppConfig, AppState};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex");
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

pub fn sign_token(user: &User, app_config: &AppConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id.clone(),
        role: user.role,
        exp: now + 3600 * 24 * 7, // Token expires after 1 week
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app_config.jwt_secret.as_ref()),
    )
}

/// Lowercases and checks shape plus the Gmail-only rule.
fn normalize_email(email: &str) -> Result<String, &'static str> {
    let email = email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err("Valid email required");
    }
    let domain = email.split('@').nth(1).unwrap_or_default();
    if !domain.ends_with("gmail.com") {
        return Err("Please use your official Gmail address");
    }
    Ok(email)
}

fn validate_password(password: &str, confirm_password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if password != confirm_password {
        return Err("Passwords do not match");
    }
    Ok(())
}

fn require(value: &str, message: &'static str) -> Result<String, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(message);
    }
    Ok(value.to_string())
}

#[post("/signup")]
pub async fn signup(
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<SignupRequest>,
) -> Result<web::Json<SuccessResponse>, Error> {
    let req = body.into_inner();
    let pool = &app_state.pool;

    let name = require(&req.name, "Name is required").map_err(error::bad_request)?;
    let institute_name =
        require(&req.institute_name, "Institute name is required").map_err(error::bad_request)?;
    let degree = require(&req.degree, "Degree is required").map_err(error::bad_request)?;
    let roll_no = require(&req.roll_no, "Roll number is required").map_err(error::bad_request)?;
    if !(15..=100).contains(&req.age) {
        return Err(error::bad_request("Age must be between 15 and 100"));
    }
    let email = normalize_email(&req.email).map_err(error::bad_request)?;
    validate_password(&req.password, &req.confirm_password).map_err(error::bad_request)?;

    let taken = User::email_or_roll_taken(pool, &email, &roll_no)
        .await
        .map_err(|e| {
            error!("Failed to check signup uniqueness: {:?}", e);
            error::internal("Internal Server Error")
        })?;
    if taken {
        return Err(error::conflict("Email or Roll No already in use"));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        error::internal("Internal Server Error")
    })?;

    let user = User::create(pool, &name, &email, &roll_no, &password_hash, Role::Student)
        .await
        .map_err(|e| {
            error!("Failed to create student: {:?}", e);
            error::internal("Internal Server Error")
        })?;

    let patch = ProfilePatch {
        gender: Some(req.gender),
        degree: Some(degree),
        institute_name: Some(institute_name),
        age: Some(req.age),
        ..Default::default()
    };
    if let Err(e) = ProfileExtension::upsert(pool, &user.id, &patch).await {
        warn!("Failed to store extended profile for {}: {:?}", user.id, e);
    }

    // Best-effort: pair the new student with a random counsellor right away.
    if let Err(e) = Assignment::resolve_for_student(pool, &user.id).await {
        warn!("Failed to auto-assign counsellor for {}: {:?}", user.id, e);
    }

    Ok(web::Json(SuccessResponse::ok()))
}

#[post("/counsellor-signup")]
pub async fn counsellor_signup(
    app_state: web::Data<Arc<AppState>>,
    body: web::Json<CounsellorSignupRequest>,
) -> Result<web::Json<SuccessResponse>, Error> {
    let req = body.into_inner();
    let pool = &app_state.pool;

    let name = require(&req.name, "Name is required").map_err(error::bad_request)?;
    let institute_name =
        require(&req.institute_name, "Institute name is required").map_err(error::bad_request)?;
    let employee_id =
        require(&req.employee_id, "Employee ID is required").map_err(error::bad_request)?;
    let phone = req.phone.trim().to_string();
    if !(5..=20).contains(&phone.len()) {
        return Err(error::bad_request("Phone must be between 5 and 20 characters"));
    }
    let email = normalize_email(&req.email).map_err(error::bad_request)?;
    validate_password(&req.password, &req.confirm_password).map_err(error::bad_request)?;

    // The employee id lives in the shared roll_no column.
    let taken = User::email_or_roll_taken(pool, &email, &employee_id)
        .await
        .map_err(|e| {
            error!("Failed to check signup uniqueness: {:?}", e);
            error::internal("Internal Server Error")
        })?;
    if taken {
        return Err(error::conflict("Email or Employee ID already in use"));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        error::internal("Internal Server Error")
    })?;

    let user = User::create(
        pool,
        &name,
        &email,
        &employee_id,
        &password_hash,
        Role::Counsellor,
    )
    .await
    .map_err(|e| {
        error!("Failed to create counsellor: {:?}", e);
        error::internal("Internal Server Error")
    })?;

    let patch = ProfilePatch {
        gender: Some(req.gender),
        institute_name: Some(institute_name),
        phone: Some(phone),
        ..Default::default()
    };
    if let Err(e) = ProfileExtension::upsert(pool, &user.id, &patch).await {
        warn!("Failed to store extended profile for {}: {:?}", user.id, e);
    }

    Ok(web::Json(SuccessResponse::ok()))
}

#[post("/login")]
pub async fn login(
    app_state: web::Data<Arc<AppState>>,
    app_config: web::Data<Arc<AppConfig>>,
    body: web::Json<LoginRequest>,
) -> Result<web::Json<LoginResponse>, Error> {
    let req = body.into_inner();
    let email = req.email.trim().to_lowercase();

    let user = User::verify_credentials(&app_state.pool, &email, &req.password, Role::Student, None)
        .await
        .map_err(|e| {
            error!("Failed to verify credentials: {:?}", e);
            error::internal("Internal Server Error")
        })?
        .ok_or_else(|| error::unauthorized("Invalid email or password"))?;

    let token = sign_token(&user, app_config.get_ref()).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        error::internal("Internal Server Error")
    })?;

    Ok(web::Json(LoginResponse {
        token,
        user: SessionUser::from(&user),
    }))
}

#[post("/counsellor-login")]
pub async fn counsellor_login(
    app_state: web::Data<Arc<AppState>>,
    app_config: web::Data<Arc<AppConfig>>,
    body: web::Json<CounsellorLoginRequest>,
) -> Result<web::Json<LoginResponse>, Error> {
    let req = body.into_inner();
    let email = req.email.trim().to_lowercase();

    let user = User::verify_credentials(
        &app_state.pool,
        &email,
        &req.password,
        Role::Counsellor,
        Some(req.employee_id.trim()),
    )
    .await
    .map_err(|e| {
        error!("Failed to verify credentials: {:?}", e);
        error::internal("Internal Server Error")
    })?
    .ok_or_else(|| error::unauthorized("Invalid credentials"))?;

    let token = sign_token(&user, app_config.get_ref()).map_err(|e| {
        error!("Failed to sign token: {:?}", e);
        error::internal("Internal Server Error")
    })?;

    Ok(web::Json(LoginResponse {
        token,
        user: SessionUser::from(&user),
    }))
}
