pub mod alerts;
pub mod app_state;
pub mod attendance;
pub mod auth;
pub mod bus_routes;
pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod seed;
pub mod store;
pub mod students;
pub mod trips;
pub mod user_management;

use actix_web::web;

/// Registers the full `/api` surface. Shared between `main` and the
/// integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/signin", web::post().to(auth::signin)),
            )
            .route("/users/me", web::get().to(user_management::me))
            .route("/admins", web::get().to(user_management::get_admins))
            .route("/students", web::get().to(students::get_students))
            .route("/students", web::post().to(students::create_student))
            .route("/routes", web::get().to(bus_routes::get_routes))
            .route("/routes", web::post().to(bus_routes::create_route))
            .route("/routes/{id}", web::put().to(bus_routes::update_route))
            .route("/trips", web::get().to(trips::get_trips))
            .route("/trips", web::post().to(trips::create_trip))
            .route("/trips/{id}", web::put().to(trips::update_trip))
            .route("/trips/{id}/delay", web::post().to(trips::report_delay))
            .route(
                "/attendance/{trip_id}",
                web::get().to(attendance::get_attendance_by_trip),
            )
            .route("/attendance", web::post().to(attendance::create_attendance))
            .route(
                "/attendance/{id}",
                web::put().to(attendance::update_attendance),
            )
            .route("/alerts", web::get().to(alerts::get_alerts))
            .route("/alerts", web::post().to(alerts::create_alert))
            .route("/alerts/{id}/read", web::put().to(alerts::mark_alert_read))
            .route("/messages", web::get().to(messages::get_messages))
            .route("/messages", web::post().to(messages::create_message))
            .route(
                "/messages/conversation/{user_id}",
                web::get().to(messages::get_conversation),
            )
            .route(
                "/messages/{id}/read",
                web::put().to(messages::mark_message_read),
            ),
    );
}
