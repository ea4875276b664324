use std::sync::Arc;

use actix_web::{get, web, Error, HttpResponse};
use sqlx::SqlitePool;
use tracing::error;

use crate::error;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::Role;
use crate::models::{Assignment, User};
use crate::types::{CounsellorAssignmentsResponse, StudentAssignmentsResponse};
use crate::AppState;

#[get("/assignments")]
pub async fn get_assignments(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, Error> {
    let pool = &app_state.pool;
    match user.role {
        Role::Student => student_assignments(pool, &user.user_id).await,
        Role::Counsellor => counsellor_assignments(pool, &user.user_id).await,
    }
}

/// The student's view: their assigned counsellor, or null if nothing has
/// been assigned yet. A plain read; assignment creation happens at signup
/// or on first chat access.
async fn student_assignments(pool: &SqlitePool, student_id: &str) -> Result<HttpResponse, Error> {
    let assignment = Assignment::find_for_student(pool, student_id)
        .await
        .map_err(|e| {
            error!("Failed to load assignment: {:?}", e);
            error::internal("Failed to load assignments")
        })?;

    let counsellor = match assignment {
        Some(assignment) => User::peer_profile(pool, &assignment.counsellor_id)
            .await
            .map_err(|e| {
                error!("Failed to load counsellor profile: {:?}", e);
                error::internal("Failed to load assignments")
            })?,
        None => None,
    };

    Ok(HttpResponse::Ok().json(StudentAssignmentsResponse { counsellor }))
}

async fn counsellor_assignments(
    pool: &SqlitePool,
    counsellor_id: &str,
) -> Result<HttpResponse, Error> {
    let assignments = Assignment::list_for_counsellor(pool, counsellor_id)
        .await
        .map_err(|e| {
            error!("Failed to load assignments: {:?}", e);
            error::internal("Failed to load assignments")
        })?;

    let mut students = Vec::with_capacity(assignments.len());
    for assignment in &assignments {
        let student = User::peer_profile(pool, &assignment.student_id)
            .await
            .map_err(|e| {
                error!("Failed to load student profile: {:?}", e);
                error::internal("Failed to load assignments")
            })?;
        if let Some(student) = student {
            students.push(student);
        }
    }

    Ok(HttpResponse::Ok().json(CounsellorAssignmentsResponse { students }))
}
