use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Alert, AlertType, Attendance, InsertAlert, InsertAttendance, InsertMessage, InsertRoute,
    InsertStudent, InsertTrip, InsertUser, Message, Role, Route, Student, Trip, TripStatus,
    UpdateAttendance, UpdateRoute, UpdateStudent, UpdateTrip, UpdateUser, User,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email {email} is already registered")]
    EmailTaken { email: String },
    #[error("driver {driver_id} already has an active trip")]
    ActiveTripExists { driver_id: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("referenced {entity} {id} does not exist")]
    DanglingReference { entity: &'static str, id: String },
}

fn not_found(entity: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn dangling(entity: &'static str, id: &str) -> StoreError {
    StoreError::DanglingReference {
        entity,
        id: id.to_string(),
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Process-lifetime keyed storage for every entity type.
///
/// Each map sits behind its own `RwLock`; single-entity invariants (unique
/// email, one active trip per driver) are checked under the corresponding
/// write lock. Methods never hold more than one lock at a time: cross-entity
/// reads copy out of one map before touching the next.
#[derive(Default)]
pub struct Store {
    users: RwLock<HashMap<String, User>>,
    students: RwLock<HashMap<String, Student>>,
    routes: RwLock<HashMap<String, Route>>,
    trips: RwLock<HashMap<String, Trip>>,
    attendance: RwLock<HashMap<String, Attendance>>,
    alerts: RwLock<HashMap<String, Alert>>,
    messages: RwLock<HashMap<String, Message>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- users -----

    /// `data.password` must already be a bcrypt hash; the store never sees
    /// plaintext credentials.
    pub fn create_user(&self, data: InsertUser) -> Result<User, StoreError> {
        let mut users = write(&self.users);
        if users.values().any(|u| u.email == data.email) {
            return Err(StoreError::EmailTaken { email: data.email });
        }
        let user = User {
            id: new_id(),
            email: data.email,
            password: data.password,
            name: data.name,
            phone: data.phone,
            role: data.role,
            created_at: Utc::now(),
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Option<User> {
        read(&self.users).get(id).cloned()
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        read(&self.users).values().find(|u| u.email == email).cloned()
    }

    pub fn update_user(&self, id: &str, updates: UpdateUser) -> Result<User, StoreError> {
        let mut users = write(&self.users);
        let user = users.get_mut(id).ok_or_else(|| not_found("user", id))?;
        if let Some(name) = updates.name {
            user.name = name;
        }
        if let Some(phone) = updates.phone {
            user.phone = phone;
        }
        Ok(user.clone())
    }

    /// Administrator directory: admins and managers only.
    pub fn admin_directory(&self) -> Vec<User> {
        read(&self.users)
            .values()
            .filter(|u| matches!(u.role, Role::Admin | Role::Manager))
            .cloned()
            .collect()
    }

    // ----- students -----

    pub fn create_student(
        &self,
        parent_id: &str,
        data: InsertStudent,
    ) -> Result<Student, StoreError> {
        self.require_user(parent_id)?;
        if let Some(route_id) = &data.route_id {
            self.require_route(route_id)?;
        }
        let student = Student {
            id: new_id(),
            name: data.name,
            grade: data.grade,
            parent_id: parent_id.to_string(),
            route_id: data.route_id,
            pickup_location: data.pickup_location,
            dropoff_location: data.dropoff_location,
            is_active: data.is_active.unwrap_or(true),
        };
        write(&self.students).insert(student.id.clone(), student.clone());
        Ok(student)
    }

    pub fn get_student(&self, id: &str) -> Option<Student> {
        read(&self.students).get(id).cloned()
    }

    pub fn students_by_parent(&self, parent_id: &str) -> Vec<Student> {
        read(&self.students)
            .values()
            .filter(|s| s.parent_id == parent_id)
            .cloned()
            .collect()
    }

    pub fn all_students(&self) -> Vec<Student> {
        read(&self.students).values().cloned().collect()
    }

    pub fn update_student(&self, id: &str, updates: UpdateStudent) -> Result<Student, StoreError> {
        if let Some(route_id) = &updates.route_id {
            self.require_route(route_id)?;
        }
        let mut students = write(&self.students);
        let student = students.get_mut(id).ok_or_else(|| not_found("student", id))?;
        if let Some(name) = updates.name {
            student.name = name;
        }
        if let Some(grade) = updates.grade {
            student.grade = grade;
        }
        if let Some(route_id) = updates.route_id {
            student.route_id = Some(route_id);
        }
        if let Some(pickup) = updates.pickup_location {
            student.pickup_location = Some(pickup);
        }
        if let Some(dropoff) = updates.dropoff_location {
            student.dropoff_location = Some(dropoff);
        }
        if let Some(is_active) = updates.is_active {
            student.is_active = is_active;
        }
        Ok(student.clone())
    }

    // ----- routes -----

    pub fn create_route(&self, data: InsertRoute) -> Result<Route, StoreError> {
        if let Some(driver_id) = &data.driver_id {
            self.require_user(driver_id)?;
        }
        let route = Route {
            id: new_id(),
            name: data.name,
            description: data.description,
            driver_id: data.driver_id,
            bus_number: data.bus_number,
            stops: data.stops,
            is_active: data.is_active.unwrap_or(true),
        };
        write(&self.routes).insert(route.id.clone(), route.clone());
        Ok(route)
    }

    pub fn get_route(&self, id: &str) -> Option<Route> {
        read(&self.routes).get(id).cloned()
    }

    pub fn all_routes(&self) -> Vec<Route> {
        read(&self.routes).values().cloned().collect()
    }

    pub fn routes_by_driver(&self, driver_id: &str) -> Vec<Route> {
        read(&self.routes)
            .values()
            .filter(|r| r.driver_id.as_deref() == Some(driver_id))
            .cloned()
            .collect()
    }

    pub fn update_route(&self, id: &str, updates: UpdateRoute) -> Result<Route, StoreError> {
        if let Some(driver_id) = &updates.driver_id {
            self.require_user(driver_id)?;
        }
        let mut routes = write(&self.routes);
        let route = routes.get_mut(id).ok_or_else(|| not_found("route", id))?;
        if let Some(name) = updates.name {
            route.name = name;
        }
        if let Some(description) = updates.description {
            route.description = Some(description);
        }
        if let Some(driver_id) = updates.driver_id {
            route.driver_id = Some(driver_id);
        }
        if let Some(bus_number) = updates.bus_number {
            route.bus_number = Some(bus_number);
        }
        if let Some(stops) = updates.stops {
            route.stops = stops;
        }
        if let Some(is_active) = updates.is_active {
            route.is_active = is_active;
        }
        Ok(route.clone())
    }

    // ----- trips -----

    /// Creates a trip for `driver_id`. A trip created as `active` is a started
    /// trip: `start_time` defaults to now, and a driver may hold at most one
    /// active trip at a time (checked under the trips write lock).
    pub fn create_trip(&self, driver_id: &str, data: InsertTrip) -> Result<Trip, StoreError> {
        self.require_user(driver_id)?;
        self.require_route(&data.route_id)?;
        let status = data.status.unwrap_or(TripStatus::Active);

        let mut trips = write(&self.trips);
        if status == TripStatus::Active
            && trips
                .values()
                .any(|t| t.driver_id == driver_id && t.status == TripStatus::Active)
        {
            return Err(StoreError::ActiveTripExists {
                driver_id: driver_id.to_string(),
            });
        }
        let start_time = match (data.start_time, status) {
            (None, TripStatus::Active) => Some(Utc::now()),
            (given, _) => given,
        };
        let trip = Trip {
            id: new_id(),
            route_id: data.route_id,
            driver_id: driver_id.to_string(),
            status,
            start_time,
            end_time: data.end_time,
            current_location: data.current_location,
            estimated_arrival: data.estimated_arrival,
            notes: data.notes,
            created_at: Utc::now(),
        };
        trips.insert(trip.id.clone(), trip.clone());
        Ok(trip)
    }

    pub fn get_trip(&self, id: &str) -> Option<Trip> {
        read(&self.trips).get(id).cloned()
    }

    pub fn trips_by_route(&self, route_id: &str) -> Vec<Trip> {
        read(&self.trips)
            .values()
            .filter(|t| t.route_id == route_id)
            .cloned()
            .collect()
    }

    /// Every trip reachable through a route, the admin/manager view.
    /// Trips whose route id no longer resolves are excluded by the join.
    pub fn all_trips(&self) -> Vec<Trip> {
        let route_ids: Vec<String> = read(&self.routes).keys().cloned().collect();
        read(&self.trips)
            .values()
            .filter(|t| route_ids.contains(&t.route_id))
            .cloned()
            .collect()
    }

    pub fn active_trips_by_driver(&self, driver_id: &str) -> Vec<Trip> {
        read(&self.trips)
            .values()
            .filter(|t| t.driver_id == driver_id && t.status == TripStatus::Active)
            .cloned()
            .collect()
    }

    /// Trips visible to a parent: active trips carrying at least one
    /// attendance row for one of the parent's students. Route assignment
    /// alone grants nothing; attendance is the sole visibility signal.
    pub fn active_trips_by_parent(&self, parent_id: &str) -> Vec<Trip> {
        let student_ids: Vec<String> = read(&self.students)
            .values()
            .filter(|s| s.parent_id == parent_id)
            .map(|s| s.id.clone())
            .collect();
        let trip_ids: Vec<String> = read(&self.attendance)
            .values()
            .filter(|a| student_ids.contains(&a.student_id))
            .map(|a| a.trip_id.clone())
            .collect();
        read(&self.trips)
            .values()
            .filter(|t| t.status == TripStatus::Active && trip_ids.contains(&t.id))
            .cloned()
            .collect()
    }

    pub fn update_trip(&self, id: &str, updates: UpdateTrip) -> Result<Trip, StoreError> {
        let mut trips = write(&self.trips);
        if updates.status == Some(TripStatus::Active) {
            let driver_id = trips
                .get(id)
                .ok_or_else(|| not_found("trip", id))?
                .driver_id
                .clone();
            if trips
                .values()
                .any(|t| t.id != id && t.driver_id == driver_id && t.status == TripStatus::Active)
            {
                return Err(StoreError::ActiveTripExists { driver_id });
            }
        }
        let trip = trips.get_mut(id).ok_or_else(|| not_found("trip", id))?;
        if let Some(status) = updates.status {
            trip.status = status;
        }
        if let Some(start_time) = updates.start_time {
            trip.start_time = Some(start_time);
        }
        if let Some(end_time) = updates.end_time {
            trip.end_time = Some(end_time);
        }
        if let Some(location) = updates.current_location {
            trip.current_location = Some(location);
        }
        if let Some(eta) = updates.estimated_arrival {
            trip.estimated_arrival = Some(eta);
        }
        if let Some(notes) = updates.notes {
            trip.notes = Some(notes);
        }
        // Completing a trip stamps the end time when the caller left it out.
        if trip.status == TripStatus::Completed && trip.end_time.is_none() {
            trip.end_time = Some(Utc::now());
        }
        Ok(trip.clone())
    }

    pub fn end_trip(&self, id: &str) -> Result<Trip, StoreError> {
        self.update_trip(
            id,
            UpdateTrip {
                status: Some(TripStatus::Completed),
                ..UpdateTrip::default()
            },
        )
    }

    /// Marks the trip delayed and fans one delay alert out to every distinct
    /// parent of a student with an attendance row on the trip.
    pub fn report_delay(&self, trip_id: &str, message: &str) -> Result<Vec<Alert>, StoreError> {
        {
            let mut trips = write(&self.trips);
            let trip = trips.get_mut(trip_id).ok_or_else(|| not_found("trip", trip_id))?;
            trip.status = TripStatus::Delayed;
        }
        let student_ids: Vec<String> = read(&self.attendance)
            .values()
            .filter(|a| a.trip_id == trip_id)
            .map(|a| a.student_id.clone())
            .collect();
        let mut parent_ids: Vec<String> = read(&self.students)
            .values()
            .filter(|s| student_ids.contains(&s.id))
            .map(|s| s.parent_id.clone())
            .collect();
        parent_ids.sort();
        parent_ids.dedup();

        let mut alerts = write(&self.alerts);
        let created = parent_ids
            .into_iter()
            .map(|parent_id| {
                let alert = Alert {
                    id: new_id(),
                    trip_id: Some(trip_id.to_string()),
                    kind: AlertType::Delay,
                    message: message.to_string(),
                    is_read: false,
                    recipient_id: Some(parent_id),
                    created_at: Utc::now(),
                };
                alerts.insert(alert.id.clone(), alert.clone());
                alert
            })
            .collect();
        Ok(created)
    }

    // ----- attendance -----

    pub fn create_attendance(&self, data: InsertAttendance) -> Result<Attendance, StoreError> {
        self.require_trip(&data.trip_id)?;
        if !read(&self.students).contains_key(&data.student_id) {
            return Err(dangling("student", &data.student_id));
        }
        let record = Attendance {
            id: new_id(),
            trip_id: data.trip_id,
            student_id: data.student_id,
            status: data.status,
            timestamp: Utc::now(),
            location: data.location,
        };
        write(&self.attendance).insert(record.id.clone(), record.clone());
        Ok(record)
    }

    pub fn attendance_by_trip(&self, trip_id: &str) -> Vec<Attendance> {
        read(&self.attendance)
            .values()
            .filter(|a| a.trip_id == trip_id)
            .cloned()
            .collect()
    }

    pub fn update_attendance(
        &self,
        id: &str,
        updates: UpdateAttendance,
    ) -> Result<Attendance, StoreError> {
        let mut attendance = write(&self.attendance);
        let record = attendance
            .get_mut(id)
            .ok_or_else(|| not_found("attendance record", id))?;
        if let Some(status) = updates.status {
            record.status = status;
        }
        if let Some(location) = updates.location {
            record.location = Some(location);
        }
        Ok(record.clone())
    }

    // ----- alerts -----

    pub fn create_alert(&self, data: InsertAlert) -> Result<Alert, StoreError> {
        if let Some(trip_id) = &data.trip_id {
            self.require_trip(trip_id)?;
        }
        if let Some(recipient_id) = &data.recipient_id {
            self.require_user(recipient_id)?;
        }
        let alert = Alert {
            id: new_id(),
            trip_id: data.trip_id,
            kind: data.kind,
            message: data.message,
            is_read: data.is_read.unwrap_or(false),
            recipient_id: data.recipient_id,
            created_at: Utc::now(),
        };
        write(&self.alerts).insert(alert.id.clone(), alert.clone());
        Ok(alert)
    }

    pub fn get_alert(&self, id: &str) -> Option<Alert> {
        read(&self.alerts).get(id).cloned()
    }

    /// Alerts addressed to `user_id`, newest first.
    pub fn alerts_by_user(&self, user_id: &str, limit: Option<usize>) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = read(&self.alerts)
            .values()
            .filter(|a| a.recipient_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            alerts.truncate(limit);
        }
        alerts
    }

    /// Idempotent: a second call on an already-read alert is a no-op.
    pub fn mark_alert_read(&self, id: &str) -> Result<Alert, StoreError> {
        let mut alerts = write(&self.alerts);
        let alert = alerts.get_mut(id).ok_or_else(|| not_found("alert", id))?;
        alert.is_read = true;
        Ok(alert.clone())
    }

    // ----- messages -----

    pub fn create_message(
        &self,
        sender_id: &str,
        data: InsertMessage,
    ) -> Result<Message, StoreError> {
        self.require_user(&data.recipient_id)?;
        if let Some(parent_id) = &data.parent_message_id {
            if !read(&self.messages).contains_key(parent_id) {
                return Err(dangling("message", parent_id));
            }
        }
        let message = Message {
            id: new_id(),
            sender_id: sender_id.to_string(),
            recipient_id: data.recipient_id,
            subject: data.subject,
            content: data.content,
            is_read: false,
            parent_message_id: data.parent_message_id,
            created_at: Utc::now(),
        };
        write(&self.messages).insert(message.id.clone(), message.clone());
        Ok(message)
    }

    pub fn get_message(&self, id: &str) -> Option<Message> {
        read(&self.messages).get(id).cloned()
    }

    /// Messages sent or received by `user_id`, newest first.
    pub fn messages_by_user(&self, user_id: &str, limit: Option<usize>) -> Vec<Message> {
        let mut messages: Vec<Message> = read(&self.messages)
            .values()
            .filter(|m| m.sender_id == user_id || m.recipient_id == user_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        messages
    }

    /// The message exchange between two users, either direction, oldest
    /// first. Symmetric in its arguments.
    pub fn conversation(&self, user_a: &str, user_b: &str) -> Vec<Message> {
        let mut messages: Vec<Message> = read(&self.messages)
            .values()
            .filter(|m| {
                (m.sender_id == user_a && m.recipient_id == user_b)
                    || (m.sender_id == user_b && m.recipient_id == user_a)
            })
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        messages
    }

    pub fn mark_message_read(&self, id: &str) -> Result<Message, StoreError> {
        let mut messages = write(&self.messages);
        let message = messages.get_mut(id).ok_or_else(|| not_found("message", id))?;
        message.is_read = true;
        Ok(message.clone())
    }

    // ----- reference checks -----

    fn require_user(&self, id: &str) -> Result<(), StoreError> {
        if read(&self.users).contains_key(id) {
            Ok(())
        } else {
            Err(dangling("user", id))
        }
    }

    fn require_route(&self, id: &str) -> Result<(), StoreError> {
        if read(&self.routes).contains_key(id) {
            Ok(())
        } else {
            Err(dangling("route", id))
        }
    }

    fn require_trip(&self, id: &str) -> Result<(), StoreError> {
        if read(&self.trips).contains_key(id) {
            Ok(())
        } else {
            Err(dangling("trip", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;

    fn insert_user(email: &str, role: Role) -> InsertUser {
        InsertUser {
            email: email.to_string(),
            password: "$2b$12$demo.hash".to_string(),
            name: "Test User".to_string(),
            phone: "+1-555-0100".to_string(),
            role,
        }
    }

    fn insert_route(driver_id: Option<&str>) -> InsertRoute {
        InsertRoute {
            name: "Route A".to_string(),
            description: None,
            driver_id: driver_id.map(str::to_string),
            bus_number: Some("BUS-001".to_string()),
            stops: vec![],
            is_active: None,
        }
    }

    fn insert_trip(route_id: &str) -> InsertTrip {
        InsertTrip {
            route_id: route_id.to_string(),
            driver_id: None,
            status: None,
            start_time: None,
            end_time: None,
            current_location: None,
            estimated_arrival: None,
            notes: None,
        }
    }

    fn insert_student(name: &str) -> InsertStudent {
        InsertStudent {
            name: name.to_string(),
            grade: "3rd Grade".to_string(),
            parent_id: None,
            route_id: None,
            pickup_location: None,
            dropoff_location: None,
            is_active: None,
        }
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let store = Store::new();
        store
            .create_user(insert_user("a@x.com", Role::Parent))
            .unwrap();
        let err = store
            .create_user(insert_user("a@x.com", Role::Driver))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::EmailTaken {
                email: "a@x.com".to_string()
            }
        );
    }

    #[test]
    fn students_by_parent_returns_exactly_that_parents_students() {
        let store = Store::new();
        let p1 = store
            .create_user(insert_user("p1@x.com", Role::Parent))
            .unwrap();
        let p2 = store
            .create_user(insert_user("p2@x.com", Role::Parent))
            .unwrap();
        let s1 = store.create_student(&p1.id, insert_student("Emma")).unwrap();
        let s2 = store.create_student(&p1.id, insert_student("Liam")).unwrap();
        store.create_student(&p2.id, insert_student("Olivia")).unwrap();

        let mut got: Vec<String> = store
            .students_by_parent(&p1.id)
            .into_iter()
            .map(|s| s.id)
            .collect();
        got.sort();
        let mut want = vec![s1.id, s2.id];
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn student_with_unknown_parent_is_rejected() {
        let store = Store::new();
        let err = store
            .create_student("nobody", insert_student("Ghost"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference { entity: "user", .. }));
    }

    #[test]
    fn ending_a_trip_completes_it_and_stamps_end_time() {
        let store = Store::new();
        let driver = store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();
        let route = store.create_route(insert_route(Some(&driver.id))).unwrap();
        let trip = store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();
        assert_eq!(trip.status, TripStatus::Active);
        let start = trip.start_time.expect("active trip has a start time");

        let ended = store.end_trip(&trip.id).unwrap();
        assert_eq!(ended.status, TripStatus::Completed);
        let end = ended.end_time.expect("completed trip has an end time");
        assert!(end >= start);
    }

    #[test]
    fn ending_an_unknown_trip_is_not_found() {
        let store = Store::new();
        let err = store.end_trip("missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "trip", .. }));
    }

    #[test]
    fn second_active_trip_for_a_driver_is_a_conflict() {
        let store = Store::new();
        let driver = store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();
        let route = store.create_route(insert_route(Some(&driver.id))).unwrap();
        store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();
        let err = store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap_err();
        assert!(matches!(err, StoreError::ActiveTripExists { .. }));
    }

    #[test]
    fn completed_trip_frees_the_driver_for_another() {
        let store = Store::new();
        let driver = store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();
        let route = store.create_route(insert_route(Some(&driver.id))).unwrap();
        let first = store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();
        store.end_trip(&first.id).unwrap();
        store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();
    }

    #[test]
    fn alerts_round_trip_newest_first() {
        let store = Store::new();
        let parent = store
            .create_user(insert_user("p@x.com", Role::Parent))
            .unwrap();
        for i in 0..3 {
            store
                .create_alert(InsertAlert {
                    trip_id: None,
                    kind: AlertType::General,
                    message: format!("alert {}", i),
                    recipient_id: Some(parent.id.clone()),
                    is_read: None,
                })
                .unwrap();
        }
        let alerts = store.alerts_by_user(&parent.id, None);
        assert_eq!(alerts.len(), 3);
        assert!(alerts.windows(2).all(|w| w[0].created_at > w[1].created_at));

        let capped = store.alerts_by_user(&parent.id, Some(2));
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn marking_an_alert_read_is_idempotent() {
        let store = Store::new();
        let parent = store
            .create_user(insert_user("p@x.com", Role::Parent))
            .unwrap();
        let alert = store
            .create_alert(InsertAlert {
                trip_id: None,
                kind: AlertType::General,
                message: "hello".to_string(),
                recipient_id: Some(parent.id.clone()),
                is_read: None,
            })
            .unwrap();
        assert!(!alert.is_read);
        assert!(store.mark_alert_read(&alert.id).unwrap().is_read);
        assert!(store.mark_alert_read(&alert.id).unwrap().is_read);
    }

    #[test]
    fn conversation_is_symmetric_and_oldest_first() {
        let store = Store::new();
        let a = store
            .create_user(insert_user("a@x.com", Role::Parent))
            .unwrap();
        let b = store
            .create_user(insert_user("b@x.com", Role::Admin))
            .unwrap();
        let c = store
            .create_user(insert_user("c@x.com", Role::Manager))
            .unwrap();
        for (from, to, subject) in [
            (&a, &b, "first"),
            (&b, &a, "second"),
            (&a, &b, "third"),
            (&a, &c, "unrelated"),
        ] {
            store
                .create_message(
                    &from.id,
                    InsertMessage {
                        recipient_id: to.id.clone(),
                        subject: subject.to_string(),
                        content: "...".to_string(),
                        parent_message_id: None,
                    },
                )
                .unwrap();
        }

        let ab = store.conversation(&a.id, &b.id);
        let ba = store.conversation(&b.id, &a.id);
        let ab_ids: Vec<&str> = ab.iter().map(|m| m.id.as_str()).collect();
        let ba_ids: Vec<&str> = ba.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ab_ids, ba_ids);
        let subjects: Vec<&str> = ab.iter().map(|m| m.subject.as_str()).collect();
        assert_eq!(subjects, ["first", "second", "third"]);
    }

    #[test]
    fn parent_without_attendance_sees_no_trips() {
        let store = Store::new();
        let parent = store
            .create_user(insert_user("p@x.com", Role::Parent))
            .unwrap();
        let driver = store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();
        let route = store.create_route(insert_route(Some(&driver.id))).unwrap();
        // The student rides this route on paper, but no attendance exists.
        store
            .create_student(
                &parent.id,
                InsertStudent {
                    route_id: Some(route.id.clone()),
                    ..insert_student("Emma")
                },
            )
            .unwrap();
        store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();

        assert!(store.active_trips_by_parent(&parent.id).is_empty());
    }

    #[test]
    fn attendance_row_makes_the_active_trip_visible_to_the_parent() {
        let store = Store::new();
        let parent = store
            .create_user(insert_user("p@x.com", Role::Parent))
            .unwrap();
        let driver = store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();
        let route = store.create_route(insert_route(Some(&driver.id))).unwrap();
        let student = store.create_student(&parent.id, insert_student("Emma")).unwrap();
        let trip = store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();
        store
            .create_attendance(InsertAttendance {
                trip_id: trip.id.clone(),
                student_id: student.id.clone(),
                status: AttendanceStatus::Boarding,
                location: Some("Main Street".to_string()),
            })
            .unwrap();

        let visible = store.active_trips_by_parent(&parent.id);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, trip.id);

        // Visibility ends when the trip does.
        store.end_trip(&trip.id).unwrap();
        assert!(store.active_trips_by_parent(&parent.id).is_empty());
    }

    #[test]
    fn delay_report_fans_out_one_alert_per_affected_parent() {
        let store = Store::new();
        let p1 = store
            .create_user(insert_user("p1@x.com", Role::Parent))
            .unwrap();
        let p2 = store
            .create_user(insert_user("p2@x.com", Role::Parent))
            .unwrap();
        let driver = store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();
        let route = store.create_route(insert_route(Some(&driver.id))).unwrap();
        let trip = store
            .create_trip(&driver.id, insert_trip(&route.id))
            .unwrap();
        // Two siblings for p1, one student for p2: still one alert per parent.
        for (parent, name) in [(&p1, "Emma"), (&p1, "Liam"), (&p2, "Olivia")] {
            let student = store.create_student(&parent.id, insert_student(name)).unwrap();
            store
                .create_attendance(InsertAttendance {
                    trip_id: trip.id.clone(),
                    student_id: student.id,
                    status: AttendanceStatus::Boarding,
                    location: None,
                })
                .unwrap();
        }

        let alerts = store.report_delay(&trip.id, "Traffic on Maple Street").unwrap();
        assert_eq!(alerts.len(), 2);
        let mut recipients: Vec<String> = alerts
            .iter()
            .filter_map(|a| a.recipient_id.clone())
            .collect();
        recipients.sort();
        let mut want = vec![p1.id.clone(), p2.id.clone()];
        want.sort();
        assert_eq!(recipients, want);
        assert!(alerts.iter().all(|a| a.kind == AlertType::Delay));

        assert_eq!(store.get_trip(&trip.id).unwrap().status, TripStatus::Delayed);
        assert_eq!(store.alerts_by_user(&p1.id, None).len(), 1);
    }

    #[test]
    fn update_merges_fields_and_rejects_unknown_ids() {
        let store = Store::new();
        let parent = store
            .create_user(insert_user("p@x.com", Role::Parent))
            .unwrap();
        let student = store.create_student(&parent.id, insert_student("Emma")).unwrap();

        let updated = store
            .update_student(
                &student.id,
                UpdateStudent {
                    grade: Some("4th Grade".to_string()),
                    is_active: Some(false),
                    ..UpdateStudent::default()
                },
            )
            .unwrap();
        assert_eq!(updated.grade, "4th Grade");
        assert!(!updated.is_active);
        // Untouched fields survive the merge.
        assert_eq!(updated.name, "Emma");

        let err = store
            .update_student("missing", UpdateStudent::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn message_to_unknown_recipient_is_rejected() {
        let store = Store::new();
        let sender = store
            .create_user(insert_user("s@x.com", Role::Parent))
            .unwrap();
        let err = store
            .create_message(
                &sender.id,
                InsertMessage {
                    recipient_id: "nobody".to_string(),
                    subject: "hi".to_string(),
                    content: "there".to_string(),
                    parent_message_id: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::DanglingReference { entity: "user", .. }));
    }

    #[test]
    fn admin_directory_lists_admins_and_managers_only() {
        let store = Store::new();
        store.create_user(insert_user("a@x.com", Role::Admin)).unwrap();
        store
            .create_user(insert_user("m@x.com", Role::Manager))
            .unwrap();
        store
            .create_user(insert_user("p@x.com", Role::Parent))
            .unwrap();
        store
            .create_user(insert_user("d@x.com", Role::Driver))
            .unwrap();

        let directory = store.admin_directory();
        assert_eq!(directory.len(), 2);
        assert!(directory
            .iter()
            .all(|u| matches!(u.role, Role::Admin | Role::Manager)));
    }
}
