use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{InsertTrip, Role, Trip, UpdateTrip};

/// Role-scoped trip listing.
///
/// Drivers get their currently active trips, parents get the active trips
/// their students have attendance on, and staff get every trip reachable
/// through a route.
pub async fn get_trips(who: AuthUser, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let trips: Vec<Trip> = match who.role {
        Role::Driver => data.store.active_trips_by_driver(&who.user_id),
        Role::Parent => data.store.active_trips_by_parent(&who.user_id),
        Role::Admin | Role::Manager => data.store.all_trips(),
    };
    Ok(HttpResponse::Ok().json(trips))
}

pub async fn create_trip(
    who: AuthUser,
    data: web::Data<AppState>,
    body: web::Json<InsertTrip>,
) -> Result<HttpResponse, ApiError> {
    let payload = body.into_inner();
    let driver_id = match who.role {
        Role::Driver => who.user_id.clone(),
        Role::Admin | Role::Manager => payload
            .driver_id
            .clone()
            .ok_or_else(|| ApiError::Validation("driverId is required".to_string()))?,
        Role::Parent => {
            return Err(ApiError::Forbidden(
                "parents cannot start trips".to_string(),
            ))
        }
    };

    let trip = data.store.create_trip(&driver_id, payload)?;
    info!(
        "trip {} started on route {} by driver {}",
        trip.id, trip.route_id, trip.driver_id
    );
    Ok(HttpResponse::Ok().json(trip))
}

pub async fn update_trip(
    who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateTrip>,
) -> Result<HttpResponse, ApiError> {
    let trip_id = path.into_inner();
    if who.role == Role::Parent {
        return Err(ApiError::Forbidden(
            "parents cannot modify trips".to_string(),
        ));
    }
    if who.role == Role::Driver {
        let trip = data
            .store
            .get_trip(&trip_id)
            .ok_or_else(|| ApiError::NotFound(format!("trip {} not found", trip_id)))?;
        if trip.driver_id != who.user_id {
            return Err(ApiError::Forbidden(
                "trip belongs to another driver".to_string(),
            ));
        }
    }

    let trip = data.store.update_trip(&trip_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(trip))
}

#[derive(Debug, Deserialize)]
pub struct DelayReport {
    pub message: String,
}

/// Marks the trip delayed and creates one delay alert per affected parent
/// (joined through the trip's attendance records).
pub async fn report_delay(
    who: AuthUser,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<DelayReport>,
) -> Result<HttpResponse, ApiError> {
    let trip_id = path.into_inner();
    let trip = data
        .store
        .get_trip(&trip_id)
        .ok_or_else(|| ApiError::NotFound(format!("trip {} not found", trip_id)))?;

    match who.role {
        Role::Driver if trip.driver_id != who.user_id => {
            return Err(ApiError::Forbidden(
                "trip belongs to another driver".to_string(),
            ))
        }
        Role::Parent => {
            return Err(ApiError::Forbidden(
                "parents cannot report delays".to_string(),
            ))
        }
        _ => {}
    }

    let alerts = data.store.report_delay(&trip_id, &body.message)?;
    info!(
        "delay reported for trip {}: {} parent(s) alerted",
        trip_id,
        alerts.len()
    );
    Ok(HttpResponse::Ok().json(alerts))
}
