use actix_web::{web, HttpResponse};
use log::info;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{InsertRoute, Role, UpdateRoute};

/// Drivers see the routes assigned to them; everyone else sees all routes.
pub async fn get_routes(who: AuthUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let routes = match who.role {
        Role::Driver => data.store.routes_by_driver(&who.user_id),
        _ => data.store.all_routes(),
    };
    Ok(HttpResponse::Ok().json(routes))
}

pub async fn create_route(
    who: AuthUser,
    data: web::Data<AppState>,
    body: web::Json<InsertRoute>,
) -> Result<HttpResponse, ApiError> {
    if !matches!(who.role, Role::Admin | Role::Manager) {
        return Err(ApiError::Forbidden(
            "only admins and managers can create routes".to_string(),
        ));
    }
    let route = data.store.create_route(body.into_inner())?;
    info!("route {} created ({})", route.id, route.name);
    Ok(HttpResponse::Ok().json(route))
}

pub async fn update_route(
    who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateRoute>,
) -> Result<HttpResponse, ApiError> {
    if !matches!(who.role, Role::Admin | Role::Manager) {
        return Err(ApiError::Forbidden(
            "only admins and managers can update routes".to_string(),
        ));
    }
    let route = data.store.update_route(&path, body.into_inner())?;
    Ok(HttpResponse::Ok().json(route))
}
