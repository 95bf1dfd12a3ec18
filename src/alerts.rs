use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::InsertAlert;

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Result-size ceiling, not a cursor.
    pub limit: Option<usize>,
}

/// Alerts addressed to the caller, newest first.
pub async fn get_alerts(
    who: AuthUser,
    data: web::Data<AppState>,
    query: web::Query<AlertQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.alerts_by_user(&who.user_id, query.limit)))
}

pub async fn create_alert(
    _who: AuthUser,
    data: web::Data<AppState>,
    body: web::Json<InsertAlert>,
) -> Result<HttpResponse, ApiError> {
    let alert = data.store.create_alert(body.into_inner())?;
    Ok(HttpResponse::Ok().json(alert))
}

pub async fn mark_alert_read(
    _who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let alert = data.store.mark_alert_read(&path)?;
    Ok(HttpResponse::Ok().json(alert))
}
