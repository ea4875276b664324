use serde::Serialize;

use crate::models::user::PeerProfile;

#[derive(Serialize)]
pub struct StudentAssignmentsResponse {
    pub counsellor: Option<PeerProfile>,
}

#[derive(Serialize)]
pub struct CounsellorAssignmentsResponse {
    pub students: Vec<PeerProfile>,
}
