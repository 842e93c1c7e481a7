use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(rename = "USN")]
    pub usn: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    pub course: String,
    #[serde(
        rename = "currentClass",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_class: Option<String>,
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    #[serde(with = "record_date")]
    pub date: NaiveDateTime,
    pub student_id: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn day(&self) -> CalendarDay {
        CalendarDay::of(&self.date)
    }
}

/// An attendance mark before it has been given an id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendanceRecord {
    #[serde(with = "record_date")]
    pub date: NaiveDateTime,
    pub student_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewAttendanceRecord {
    pub fn with_id(self, id: String) -> AttendanceRecord {
        AttendanceRecord {
            id,
            date: self.date,
            student_id: self.student_id,
            status: self.status,
            notes: self.notes,
        }
    }
}

/// A date compared at day granularity. All "same day" checks go through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn of(date: &NaiveDateTime) -> Self {
        CalendarDay(date.date())
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDay {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(CalendarDay)
    }
}

/// Parses the date forms a UI sends: `YYYY-MM-DD`, a local
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, or an RFC 3339 timestamp (shifted to local time).
pub fn parse_record_date(raw: &str) -> Option<NaiveDateTime> {
    let t = raw.trim();
    if let Ok(v) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(v);
    }
    if let Ok(v) = DateTime::parse_from_rfc3339(t) {
        return Some(v.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub mod record_date {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    // `%.f` writes nothing for whole seconds and keeps sub-second input intact.
    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_record_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}
