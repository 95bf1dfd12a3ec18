//! Demo fixtures for manual testing.
//!
//! Loading is always an explicit call (gated by `SEED_DEMO_DATA` in `main`,
//! or invoked directly from a test); the store constructor never seeds.

use bcrypt::{hash, DEFAULT_COST};
use chrono::{Duration, Utc};
use log::info;
use thiserror::Error;

use crate::models::{
    AlertType, AttendanceStatus, InsertAlert, InsertAttendance, InsertMessage, InsertRoute,
    InsertStudent, InsertTrip, InsertUser, Role, Stop, TripStatus,
};
use crate::store::{Store, StoreError};

/// Placeholder hash for demo accounts that are never signed into.
const DEMO_PASSWORD_HASH: &str = "$2b$10$hash.demo.password.123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to hash demo password: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

fn demo_user(email: &str, name: &str, phone: &str, role: Role) -> InsertUser {
    InsertUser {
        email: email.to_string(),
        password: DEMO_PASSWORD_HASH.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        role,
    }
}

fn stop(id: &str, name: &str, location: &str, time: &str, order: i32) -> Stop {
    Stop {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        time: time.to_string(),
        order,
    }
}

fn demo_student(name: &str, grade: &str, route_id: &str, pickup: &str) -> InsertStudent {
    InsertStudent {
        name: name.to_string(),
        grade: grade.to_string(),
        parent_id: None,
        route_id: Some(route_id.to_string()),
        pickup_location: Some(pickup.to_string()),
        dropoff_location: Some("Central School".to_string()),
        is_active: None,
    }
}

pub fn load_demo_data(store: &Store) -> Result<(), SeedError> {
    let now = Utc::now();

    // The admin is the one demo account meant for real sign-ins.
    let admin = store.create_user(InsertUser {
        email: "admin@saferide.school".to_string(),
        password: hash("admin123", DEFAULT_COST)?,
        name: "Sarah Johnson".to_string(),
        phone: "+1-555-0123".to_string(),
        role: Role::Admin,
    })?;

    let d1 = store.create_user(demo_user(
        "mike.driver@saferide.school",
        "Mike Thompson",
        "+1-555-0201",
        Role::Driver,
    ))?;
    let d2 = store.create_user(demo_user(
        "sarah.drive@saferide.school",
        "Sarah Martinez",
        "+1-555-0202",
        Role::Driver,
    ))?;
    let d3 = store.create_user(demo_user(
        "john.bus@saferide.school",
        "John Williams",
        "+1-555-0203",
        Role::Driver,
    ))?;

    let m1 = store.create_user(demo_user(
        "lisa.manager@saferide.school",
        "Lisa Chen",
        "+1-555-0301",
        Role::Manager,
    ))?;
    store.create_user(demo_user(
        "david.ops@saferide.school",
        "David Rodriguez",
        "+1-555-0302",
        Role::Manager,
    ))?;

    let p1 = store.create_user(demo_user(
        "jennifer.smith@email.com",
        "Jennifer Smith",
        "+1-555-0401",
        Role::Parent,
    ))?;
    let p2 = store.create_user(demo_user(
        "michael.jones@email.com",
        "Michael Jones",
        "+1-555-0402",
        Role::Parent,
    ))?;
    let p3 = store.create_user(demo_user(
        "maria.garcia@email.com",
        "Maria Garcia",
        "+1-555-0403",
        Role::Parent,
    ))?;
    let p4 = store.create_user(demo_user(
        "robert.brown@email.com",
        "Robert Brown",
        "+1-555-0404",
        Role::Parent,
    ))?;

    let r1 = store.create_route(InsertRoute {
        name: "Central School Route A".to_string(),
        description: Some("Main route covering downtown area".to_string()),
        driver_id: Some(d1.id.clone()),
        bus_number: Some("BUS-001".to_string()),
        stops: vec![
            stop("stop-1", "Main Street", "Main St & 1st Ave", "7:30 AM", 1),
            stop("stop-2", "Park Avenue", "Park Ave & Oak St", "7:45 AM", 2),
            stop("stop-3", "Elm Street", "Elm St & 3rd Ave", "7:50 AM", 3),
            stop("stop-4", "School Entrance", "Central School Main Gate", "8:00 AM", 4),
        ],
        is_active: None,
    })?;
    let r2 = store.create_route(InsertRoute {
        name: "Westside Express".to_string(),
        description: Some("Route serving west side neighborhoods".to_string()),
        driver_id: Some(d2.id.clone()),
        bus_number: Some("BUS-002".to_string()),
        stops: vec![
            stop("stop-w1", "West Plaza", "West Plaza Shopping Center", "7:25 AM", 1),
            stop("stop-w2", "Maple Grove", "Maple St & Grove Ave", "7:35 AM", 2),
            stop("stop-w3", "Cedar Heights", "Cedar Ave & Heights Blvd", "7:45 AM", 3),
            stop("stop-w4", "School West Gate", "Central School West Entrance", "7:55 AM", 4),
        ],
        is_active: None,
    })?;
    let r3 = store.create_route(InsertRoute {
        name: "North Valley Route".to_string(),
        description: Some("Covering northern suburbs".to_string()),
        driver_id: Some(d3.id.clone()),
        bus_number: Some("BUS-003".to_string()),
        stops: vec![
            stop("stop-n1", "Valley View", "Valley View Dr & North St", "7:20 AM", 1),
            stop("stop-n2", "Hillcrest", "Hillcrest Ave & Pine St", "7:30 AM", 2),
            stop("stop-n3", "Mountain View", "Mountain View Rd & Oak Dr", "7:40 AM", 3),
            stop("stop-n4", "School North Gate", "Central School North Entrance", "7:50 AM", 4),
        ],
        is_active: None,
    })?;

    let emma = store.create_student(&p1.id, demo_student("Emma Smith", "5th Grade", &r1.id, "Main Street"))?;
    let liam = store.create_student(&p1.id, demo_student("Liam Smith", "3rd Grade", &r1.id, "Main Street"))?;
    let olivia = store.create_student(&p2.id, demo_student("Olivia Jones", "4th Grade", &r2.id, "West Plaza"))?;
    let noah = store.create_student(&p2.id, demo_student("Noah Jones", "1st Grade", &r2.id, "West Plaza"))?;
    store.create_student(&p3.id, demo_student("Sofia Garcia", "6th Grade", &r3.id, "Valley View"))?;
    let ethan = store.create_student(&p4.id, demo_student("Ethan Brown", "2nd Grade", &r1.id, "Elm Street"))?;
    let ava = store.create_student(&p4.id, demo_student("Ava Brown", "4th Grade", &r1.id, "Elm Street"))?;

    // Yesterday's completed run precedes today's active one so the driver's
    // single-active-trip check stays satisfied.
    let completed = store.create_trip(
        &d1.id,
        InsertTrip {
            route_id: r1.id.clone(),
            driver_id: None,
            status: Some(TripStatus::Completed),
            start_time: Some(now - Duration::hours(24)),
            end_time: Some(now - Duration::minutes(23 * 60 + 30)),
            current_location: Some("Central School Main Gate".to_string()),
            estimated_arrival: None,
            notes: Some("Completed successfully".to_string()),
        },
    )?;
    let active = store.create_trip(
        &d1.id,
        InsertTrip {
            route_id: r1.id.clone(),
            driver_id: None,
            status: Some(TripStatus::Active),
            start_time: Some(now - Duration::minutes(25)),
            end_time: None,
            current_location: Some("Park Ave & Oak St - Loading passengers".to_string()),
            estimated_arrival: Some(now + Duration::minutes(10)),
            notes: Some("Running on schedule".to_string()),
        },
    )?;
    let delayed = store.create_trip(
        &d2.id,
        InsertTrip {
            route_id: r2.id.clone(),
            driver_id: None,
            status: Some(TripStatus::Delayed),
            start_time: Some(now - Duration::minutes(20)),
            end_time: None,
            current_location: Some("Maple St & Grove Ave - Traffic delay".to_string()),
            estimated_arrival: Some(now + Duration::minutes(20)),
            notes: Some("Heavy traffic on Maple Street".to_string()),
        },
    )?;
    let scheduled = store.create_trip(
        &d3.id,
        InsertTrip {
            route_id: r3.id.clone(),
            driver_id: None,
            status: Some(TripStatus::Scheduled),
            start_time: Some(now + Duration::minutes(5)),
            end_time: None,
            current_location: None,
            estimated_arrival: Some(now + Duration::minutes(35)),
            notes: None,
        },
    )?;

    for (trip, student, status, location) in [
        (&active, &emma, AttendanceStatus::Boarding, "Main Street"),
        (&active, &liam, AttendanceStatus::Boarding, "Main Street"),
        (&active, &ethan, AttendanceStatus::Present, "Elm Street"),
        (&active, &ava, AttendanceStatus::Present, "Elm Street"),
        (&delayed, &olivia, AttendanceStatus::Boarding, "West Plaza"),
        (&delayed, &noah, AttendanceStatus::Boarding, "West Plaza"),
        (&completed, &emma, AttendanceStatus::Dropped, "Central School"),
        (&completed, &liam, AttendanceStatus::Dropped, "Central School"),
    ] {
        store.create_attendance(InsertAttendance {
            trip_id: trip.id.clone(),
            student_id: student.id.clone(),
            status,
            location: Some(location.to_string()),
        })?;
    }

    for (trip_id, kind, message, recipient, is_read) in [
        (
            Some(active.id.clone()),
            AlertType::Pickup,
            "Emma and Liam have boarded the bus at Main Street",
            &p1,
            false,
        ),
        (
            Some(active.id.clone()),
            AlertType::General,
            "Bus is approaching Park Avenue stop",
            &p1,
            false,
        ),
        (
            Some(delayed.id.clone()),
            AlertType::Delay,
            "Bus Route 2 is running 15 minutes late due to traffic",
            &p2,
            false,
        ),
        (
            Some(delayed.id.clone()),
            AlertType::Pickup,
            "Olivia and Noah have been picked up",
            &p2,
            true,
        ),
        (
            Some(scheduled.id.clone()),
            AlertType::General,
            "Route 3 will begin boarding in 5 minutes",
            &p3,
            false,
        ),
        (
            Some(active.id.clone()),
            AlertType::Pickup,
            "Ethan and Ava are on board",
            &p4,
            true,
        ),
        (
            None,
            AlertType::General,
            "Weather Alert: Light rain expected. All buses equipped with safety equipment.",
            &p1,
            false,
        ),
        (
            None,
            AlertType::General,
            "School Closure: Early dismissal tomorrow due to parent-teacher conferences",
            &p2,
            false,
        ),
    ] {
        store.create_alert(InsertAlert {
            trip_id,
            kind,
            message: message.to_string(),
            recipient_id: Some(recipient.id.clone()),
            is_read: Some(is_read),
        })?;
    }

    store.create_message(
        &p1.id,
        InsertMessage {
            recipient_id: admin.id.clone(),
            subject: "Bus Stop Change Request".to_string(),
            content: "Hi, I would like to request a bus stop change for my children Emma and Liam. We are moving to a new address next week.".to_string(),
            parent_message_id: None,
        },
    )?;
    store.create_message(
        &admin.id,
        InsertMessage {
            recipient_id: p1.id.clone(),
            subject: "Re: Bus Stop Change Request".to_string(),
            content: "Hello Jennifer, I received your request. Please fill out the address change form and submit it to the main office. The new stop will be effective next Monday.".to_string(),
            parent_message_id: None,
        },
    )?;
    store.create_message(
        &p2.id,
        InsertMessage {
            recipient_id: admin.id.clone(),
            subject: "Late Bus Feedback".to_string(),
            content: "The bus has been consistently 10-15 minutes late this week. Is there anything we can do to improve the timing?".to_string(),
            parent_message_id: None,
        },
    )?;
    store.create_message(
        &m1.id,
        InsertMessage {
            recipient_id: d2.id.clone(),
            subject: "Route Optimization".to_string(),
            content: "Please review the new route optimization suggestions for the Westside Express. The changes should reduce travel time by 5 minutes.".to_string(),
            parent_message_id: None,
        },
    )?;

    info!("demo fixtures loaded: 10 users, 3 routes, 4 trips, 7 students");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_fixtures_load_into_an_empty_store() {
        let store = Store::new();
        load_demo_data(&store).unwrap();

        let admin = store
            .get_user_by_email("admin@saferide.school")
            .expect("demo admin exists");
        assert_eq!(admin.role, Role::Admin);
        assert!(bcrypt::verify("admin123", &admin.password).unwrap());

        assert_eq!(store.all_routes().len(), 3);
        assert_eq!(store.all_trips().len(), 4);
        assert_eq!(store.admin_directory().len(), 3);

        // Jennifer Smith's children ride the active trip.
        let p1 = store
            .get_user_by_email("jennifer.smith@email.com")
            .expect("demo parent exists");
        assert_eq!(store.students_by_parent(&p1.id).len(), 2);
        assert_eq!(store.active_trips_by_parent(&p1.id).len(), 1);
    }

    #[test]
    fn loading_twice_conflicts_on_demo_emails() {
        let store = Store::new();
        load_demo_data(&store).unwrap();
        assert!(matches!(
            load_demo_data(&store),
            Err(SeedError::Store(StoreError::EmailTaken { .. }))
        ));
    }
}
