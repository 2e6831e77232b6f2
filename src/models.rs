use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 2] = [AttendanceStatus::Present, AttendanceStatus::Absent];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid status (expected Present or Absent)", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for AttendanceStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AttendanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// One attendance entry. `timestamp` is fixed at creation; only `status` ever changes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
}

/// Row shape as stored; `status` is still raw text here.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AttendanceRow {
    pub id: i64,
    pub student_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: Option<String>,
}
