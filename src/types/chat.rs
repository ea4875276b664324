use serde::{Deserialize, Serialize};

use crate::models::user::PeerProfile;
use crate::models::Message;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: String,
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItem {
    pub conversation_id: String,
    pub peer: PeerProfile,
    pub last: Option<Message>,
}

#[derive(Serialize)]
pub struct ThreadsResponse {
    pub items: Vec<ThreadItem>,
}

#[derive(Serialize)]
pub struct MessagesResponse {
    pub items: Vec<Message>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: Message,
}
