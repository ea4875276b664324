use std::sync::Arc;

use actix_web::{get, post, web, Error, HttpResponse};
use sqlx::SqlitePool;
use tracing::error;

use crate::error;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::Role;
use crate::models::{Assignment, Conversation, Message, User};
use crate::types::{
    MessageResponse, MessagesQuery, MessagesResponse, SendMessageRequest, ThreadItem,
    ThreadsResponse,
};
use crate::AppState;

#[get("/threads")]
pub async fn threads(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, Error> {
    let pool = &app_state.pool;
    match user.role {
        Role::Student => student_threads(pool, &user.user_id).await,
        Role::Counsellor => counsellor_threads(pool, &user.user_id).await,
    }
}

/// The student's thread list holds at most one item: the conversation with
/// their counsellor. First access lazily resolves the assignment (creating
/// one if a counsellor exists) and provisions the conversation.
async fn student_threads(pool: &SqlitePool, student_id: &str) -> Result<HttpResponse, Error> {
    let Some(assignment) = Assignment::resolve_for_student(pool, student_id)
        .await
        .map_err(|e| {
            error!("Failed to resolve assignment: {:?}", e);
            error::internal("Failed to load threads")
        })?
    else {
        return Ok(HttpResponse::Ok().json(ThreadsResponse { items: vec![] }));
    };

    let conversation = Conversation::get_or_create(pool, student_id, &assignment.counsellor_id)
        .await
        .map_err(|e| {
            error!("Failed to provision conversation: {:?}", e);
            error::internal("Failed to load threads")
        })?;

    let peer = User::peer_profile(pool, &assignment.counsellor_id)
        .await
        .map_err(|e| {
            error!("Failed to load peer profile: {:?}", e);
            error::internal("Failed to load threads")
        })?;
    let last = Message::last(pool, &conversation.id).await.map_err(|e| {
        error!("Failed to load last message: {:?}", e);
        error::internal("Failed to load threads")
    })?;

    let items = match peer {
        Some(peer) => vec![ThreadItem {
            conversation_id: conversation.id,
            peer,
            last,
        }],
        None => vec![],
    };

    Ok(HttpResponse::Ok().json(ThreadsResponse { items }))
}

/// One thread per assigned student, newest activity first; conversations are
/// provisioned lazily here as well so a student who has never opened the
/// chat still shows up.
async fn counsellor_threads(pool: &SqlitePool, counsellor_id: &str) -> Result<HttpResponse, Error> {
    let assignments = Assignment::list_for_counsellor(pool, counsellor_id)
        .await
        .map_err(|e| {
            error!("Failed to load assignments: {:?}", e);
            error::internal("Failed to load threads")
        })?;

    let mut items = Vec::with_capacity(assignments.len());
    for assignment in &assignments {
        let peer = User::peer_profile(pool, &assignment.student_id)
            .await
            .map_err(|e| {
                error!("Failed to load peer profile: {:?}", e);
                error::internal("Failed to load threads")
            })?;
        let Some(peer) = peer else { continue };

        let conversation =
            Conversation::get_or_create(pool, &assignment.student_id, counsellor_id)
                .await
                .map_err(|e| {
                    error!("Failed to provision conversation: {:?}", e);
                    error::internal("Failed to load threads")
                })?;
        let last = Message::last(pool, &conversation.id).await.map_err(|e| {
            error!("Failed to load last message: {:?}", e);
            error::internal("Failed to load threads")
        })?;

        items.push(ThreadItem {
            conversation_id: conversation.id,
            peer,
            last,
        });
    }

    items.sort_by(|a, b| {
        let a_key = a.last.as_ref().map(|m| m.created_at);
        let b_key = b.last.as_ref().map(|m| m.created_at);
        b_key.cmp(&a_key)
    });

    Ok(HttpResponse::Ok().json(ThreadsResponse { items }))
}

#[get("/messages")]
pub async fn get_messages(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    query: web::Query<MessagesQuery>,
) -> Result<web::Json<MessagesResponse>, Error> {
    let pool = &app_state.pool;
    let Some(conversation_id) = &query.conversation_id else {
        return Ok(web::Json(MessagesResponse { items: vec![] }));
    };

    let conversation = Conversation::find_by_id(pool, conversation_id)
        .await
        .map_err(|e| {
            error!("Failed to load conversation: {:?}", e);
            error::internal("Failed to load messages")
        })?
        .ok_or_else(|| error::not_found("Not found"))?;

    if !conversation.includes(&user.user_id) {
        return Err(error::forbidden("Forbidden"));
    }

    let items = Message::list(pool, &conversation.id).await.map_err(|e| {
        error!("Failed to list messages: {:?}", e);
        error::internal("Failed to load messages")
    })?;

    Ok(web::Json(MessagesResponse { items }))
}

#[post("/messages")]
pub async fn post_message(
    app_state: web::Data<Arc<AppState>>,
    user: AuthenticatedUser,
    body: web::Json<SendMessageRequest>,
) -> Result<web::Json<MessageResponse>, Error> {
    let pool = &app_state.pool;
    let req = body.into_inner();

    let text = req.text.trim().to_string();
    if text.is_empty() {
        return Err(error::bad_request("Invalid payload"));
    }

    let conversation = Conversation::find_by_id(pool, &req.conversation_id)
        .await
        .map_err(|e| {
            error!("Failed to load conversation: {:?}", e);
            error::internal("Failed to send")
        })?
        .ok_or_else(|| error::not_found("Not found"))?;

    if !conversation.includes(&user.user_id) {
        return Err(error::forbidden("Forbidden"));
    }

    let message = Message::append(pool, &conversation, &user.user_id, &text)
        .await
        .map_err(|e| {
            error!("Failed to append message: {:?}", e);
            error::internal("Failed to send")
        })?;

    Ok(web::Json(MessageResponse { message }))
}
