mod alert;
mod attendance;
mod message;
mod route;
mod student;
mod trip;
mod user;

pub use alert::{Alert, AlertType, InsertAlert};
pub use attendance::{Attendance, AttendanceStatus, InsertAttendance, UpdateAttendance};
pub use message::{InsertMessage, Message};
pub use route::{InsertRoute, Route, Stop, UpdateRoute};
pub use student::{InsertStudent, Student, UpdateStudent};
pub use trip::{InsertTrip, Trip, TripStatus, UpdateTrip};
pub use user::{InsertUser, Role, UpdateUser, User};
