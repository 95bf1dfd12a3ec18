use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Boarding,
    Dropped,
}

/// One boarding/drop-off event. A student may accumulate several rows over a
/// single trip (boarding first, dropped later).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub trip_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAttendance {
    pub trip_id: String,
    pub student_id: String,
    pub status: AttendanceStatus,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttendance {
    pub status: Option<AttendanceStatus>,
    pub location: Option<String>,
}
