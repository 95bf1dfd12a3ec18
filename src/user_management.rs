use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::Role;

/// The caller's own account. The password hash never serializes, so the raw
/// user record is safe to return.
pub async fn me(who: AuthUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let user = data
        .store
        .get_user(&who.user_id)
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectoryEntry {
    id: String,
    name: String,
    email: String,
    role: Role,
}

/// Directory of staff contacts (admins and managers) for the messaging view.
pub async fn get_admins(
    _who: AuthUser,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let entries: Vec<DirectoryEntry> = data
        .store
        .admin_directory()
        .into_iter()
        .map(|u| DirectoryEntry {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        })
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}
