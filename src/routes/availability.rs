use std::sync::Arc;

use actix_web::{get, post, web, Error};
use tracing::error;

use crate::error;
use crate::middleware::auth::{AuthenticatedUser, CounsellorUser, StudentUser};
use crate::models::availability::BookOutcome;
use crate::models::Slot;
use crate::types::{AvailabilityQuery, PublishSlotsRequest, SlotsResponse, SuccessResponse};
use crate::AppState;

#[get("")]
pub async fn query_slots(
    app_state: web::Data<Arc<AppState>>,
    _user: AuthenticatedUser,
    query: web::Query<AvailabilityQuery>,
) -> Result<web::Json<SlotsResponse>, Error> {
    let Some(counsellor_id) = &query.counsellor_id else {
        return Err(error::bad_request("counsellorId is required"));
    };

    let slots = Slot::query(&app_state.pool, counsellor_id, query.from, query.to)
        .await
        .map_err(|e| {
            error!("Failed to query slots: {:?}", e);
            error::internal("Internal Server Error")
        })?;

    Ok(web::Json(SlotsResponse { slots }))
}

#[post("")]
pub async fn publish_slots(
    app_state: web::Data<Arc<AppState>>,
    user: CounsellorUser,
    body: web::Json<PublishSlotsRequest>,
) -> Result<web::Json<SuccessResponse>, Error> {
    let req = body.into_inner();
    if req.slots.is_empty() {
        return Err(error::bad_request("slots array required"));
    }

    Slot::publish(&app_state.pool, &user.0.user_id, &req.slots)
        .await
        .map_err(|e| {
            error!("Failed to publish slots: {:?}", e);
            error::internal("Internal Server Error")
        })?;

    Ok(web::Json(SuccessResponse::ok()))
}

#[post("/{slot_id}/book")]
pub async fn book_slot(
    app_state: web::Data<Arc<AppState>>,
    _user: StudentUser,
    path: web::Path<String>,
) -> Result<web::Json<SuccessResponse>, Error> {
    let slot_id = path.into_inner();

    let outcome = Slot::book(&app_state.pool, &slot_id).await.map_err(|e| {
        error!("Failed to book slot: {:?}", e);
        error::internal("Internal Server Error")
    })?;

    match outcome {
        BookOutcome::Booked => Ok(web::Json(SuccessResponse::ok())),
        BookOutcome::AlreadyBooked => Err(error::conflict("Slot is already booked")),
        BookOutcome::NotFound => Err(error::not_found("Slot not found")),
    }
}
