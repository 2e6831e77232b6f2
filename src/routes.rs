use axum::body::Bytes;
use axum::extract::Path;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::{Extension, Json};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::err::Error;
use crate::models::{AttendanceRecord, AttendanceStatus};
use crate::render::render_attendance_page;
use crate::store::{AttendanceStore, UpdateOutcome};

pub type Reply<T> = Result<T, Error>;

const INDEX_PAGE: &str = include_str!("../public/index.html");
const INDEX_SCRIPT: &str = include_str!("../public/script.js");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript")], INDEX_SCRIPT)
}

pub async fn submit_attendance(
    Extension(store): Extension<AttendanceStore>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply<&'static str> {
    let SubmitAttendance { student_name } = parse_body(&headers, &body)?;
    let student_name = match student_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(Error::invalid("Student name is required.")),
    };

    let id = store
        .create(&student_name)
        .await
        .map_err(|err| Error::storage(err, "Failed to save attendance."))?;
    log::info!("Saved attendance #{} for `{}`", id, student_name.trim());
    Ok("Attendance saved successfully!")
}

pub async fn update_status(
    Extension(store): Extension<AttendanceStore>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply<&'static str> {
    let UpdateStatus { id, status } = parse_body(&headers, &body)?;
    let (id, status) = match (id, status) {
        (Some(id), Some(status)) if !id.is_blank() && !status.trim().is_empty() => (id, status),
        _ => return Err(Error::invalid("ID and status are required.")),
    };
    let id = id.parse()?;
    let status: AttendanceStatus = status
        .parse()
        .map_err(|_| Error::invalid("Status must be Present or Absent."))?;

    let outcome = store
        .update_status(id, status)
        .await
        .map_err(|err| Error::storage(err, "Failed to update status."))?;
    match outcome {
        UpdateOutcome::Updated => {
            log::info!("Attendance #{} marked {}", id, status);
            Ok("Status updated successfully!")
        }
        UpdateOutcome::NotFound => Err(Error::NotFound {
            message: format!("Attendance record {} not found.", id),
        }),
    }
}

pub async fn list_attendance(
    Extension(store): Extension<AttendanceStore>,
) -> Reply<Html<String>> {
    let records = store
        .list_all()
        .await
        .map_err(|err| Error::storage(err, "Failed to fetch attendance data."))?;
    Ok(Html(render_attendance_page(&records)))
}

pub async fn list_attendance_json(
    Extension(store): Extension<AttendanceStore>,
) -> Reply<Json<Vec<AttendanceRecord>>> {
    let records = store
        .list_all()
        .await
        .map_err(|err| Error::storage(err, "Failed to fetch attendance data."))?;
    Ok(Json(records))
}

pub async fn show_attendance(
    Extension(store): Extension<AttendanceStore>,
    Path(id): Path<i64>,
) -> Reply<Json<AttendanceRecord>> {
    let record = store
        .get(id)
        .await
        .map_err(|err| Error::storage(err, "Failed to fetch attendance data."))?;
    record.map(Json).ok_or_else(|| Error::NotFound {
        message: format!("Attendance record {} not found.", id),
    })
}

/// Reads the body as a urlencoded form when declared so, JSON otherwise.
/// An empty body is treated as an empty object.
fn parse_body<T: DeserializeOwned>(headers: &HeaderMap, body: &[u8]) -> Reply<T> {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    if is_form {
        return Ok(serde_urlencoded::from_bytes(body)?);
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}

#[derive(Debug, Deserialize)]
struct SubmitAttendance {
    #[serde(rename = "studentName")]
    student_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateStatus {
    id: Option<RecordId>,
    status: Option<String>,
}

/// JSON clients send a number, forms send text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Empty text and 0 count as missing; ids start at 1.
    fn is_blank(&self) -> bool {
        match self {
            RecordId::Number(id) => *id == 0,
            RecordId::Text(text) => matches!(text.trim(), "" | "0"),
        }
    }

    fn parse(self) -> Reply<i64> {
        match self {
            RecordId::Number(id) => Ok(id),
            RecordId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| Error::invalid("ID must be an integer.")),
        }
    }
}
