use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::InsertMessage;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Result-size ceiling, not a cursor.
    pub limit: Option<usize>,
}

/// Messages sent or received by the caller, newest first.
pub async fn get_messages(
    who: AuthUser,
    data: web::Data<AppState>,
    query: web::Query<MessageQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.messages_by_user(&who.user_id, query.limit)))
}

/// The exchange between the caller and another user, oldest first.
pub async fn get_conversation(
    who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.conversation(&who.user_id, &path)))
}

pub async fn create_message(
    who: AuthUser,
    data: web::Data<AppState>,
    body: web::Json<InsertMessage>,
) -> Result<HttpResponse, ApiError> {
    // The sender is always the authenticated caller, never the payload.
    let message = data.store.create_message(&who.user_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(message))
}

pub async fn mark_message_read(
    _who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let message = data.store.mark_message_read(&path)?;
    Ok(HttpResponse::Ok().json(message))
}
