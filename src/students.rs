use actix_web::{web, HttpResponse};
use log::info;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{InsertStudent, Role};

/// Parents see their own students; admins and managers see everyone.
pub async fn get_students(
    who: AuthUser,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let students = match who.role {
        Role::Admin | Role::Manager => data.store.all_students(),
        _ => data.store.students_by_parent(&who.user_id),
    };
    Ok(HttpResponse::Ok().json(students))
}

pub async fn create_student(
    who: AuthUser,
    data: web::Data<AppState>,
    body: web::Json<InsertStudent>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    // Parents register their own children; staff may name any parent.
    let parent_id = match who.role {
        Role::Parent => who.user_id.clone(),
        Role::Admin | Role::Manager => payload
            .parent_id
            .clone()
            .ok_or_else(|| ApiError::Validation("parentId is required".to_string()))?,
        Role::Driver => {
            return Err(ApiError::Forbidden(
                "drivers cannot register students".to_string(),
            ))
        }
    };

    let student = data.store.create_student(&parent_id, payload)?;
    info!("student {} registered for parent {}", student.id, parent_id);
    Ok(HttpResponse::Ok().json(student))
}
