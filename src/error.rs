use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn json_error(status: StatusCode, message: impl Into<String>) -> actix_web::Error {
    let message = message.into();
    let response = HttpResponse::build(status).json(ErrorBody {
        error: message.clone(),
    });
    InternalError::from_response(message, response).into()
}

pub fn bad_request(message: impl Into<String>) -> actix_web::Error {
    json_error(StatusCode::BAD_REQUEST, message)
}

pub fn unauthorized(message: impl Into<String>) -> actix_web::Error {
    json_error(StatusCode::UNAUTHORIZED, message)
}

pub fn forbidden(message: impl Into<String>) -> actix_web::Error {
    json_error(StatusCode::FORBIDDEN, message)
}

pub fn not_found(message: impl Into<String>) -> actix_web::Error {
    json_error(StatusCode::NOT_FOUND, message)
}

pub fn conflict(message: impl Into<String>) -> actix_web::Error {
    json_error(StatusCode::CONFLICT, message)
}

pub fn internal(message: impl Into<String>) -> actix_web::Error {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
