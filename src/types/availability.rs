use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::availability::NewSlot;
use crate::models::Slot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub counsellor_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PublishSlotsRequest {
    pub slots: Vec<NewSlot>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<Slot>,
}
