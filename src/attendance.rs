use actix_web::{web, HttpResponse};
use log::info;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{InsertAttendance, UpdateAttendance};

pub async fn get_attendance_by_trip(
    _who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.store.attendance_by_trip(&path)))
}

pub async fn create_attendance(
    _who: AuthUser,
    data: web::Data<AppState>,
    body: web::Json<InsertAttendance>,
) -> Result<HttpResponse, ApiError> {
    let record = data.store.create_attendance(body.into_inner())?;
    info!(
        "attendance recorded: student {} {:?} on trip {}",
        record.student_id, record.status, record.trip_id
    );
    Ok(HttpResponse::Ok().json(record))
}

pub async fn update_attendance(
    _who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateAttendance>,
) -> Result<HttpResponse, ApiError> {
    let record = data.store.update_attendance(&path, body.into_inner())?;
    Ok(HttpResponse::Ok().json(record))
}
