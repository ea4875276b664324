pub mod assignments;
pub mod auth;
pub mod availability;
pub mod chat;
pub mod profile;

pub use assignments::{CounsellorAssignmentsResponse, StudentAssignmentsResponse};
pub use auth::{
    CounsellorLoginRequest, CounsellorSignupRequest, LoginRequest, LoginResponse, SessionUser,
    SignupRequest,
};
pub use availability::{AvailabilityQuery, PublishSlotsRequest, SlotsResponse};
pub use chat::{
    MessageResponse, MessagesQuery, MessagesResponse, SendMessageRequest, ThreadItem,
    ThreadsResponse,
};
pub use profile::{
    ActivityResponse, ChangePasswordRequest, ProfileResponse, ProfileUser, UpdateProfileRequest,
};

use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        SuccessResponse { success: true }
    }
}
