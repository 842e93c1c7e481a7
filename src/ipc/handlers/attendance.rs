use super::params::{get_date, get_object};
use crate::export;
use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_id, record_date, AttendanceRecord, AttendanceStatus, CalendarDay, NewAttendanceRecord};
use crate::store::AttendanceStore;
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

/// A mark as the UI sends it in a batch: the id is optional for rows the
/// user has only just ticked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(with = "record_date")]
    date: NaiveDateTime,
    student_id: String,
    status: AttendanceStatus,
    #[serde(default)]
    notes: Option<String>,
}

impl BatchRecord {
    fn into_record(self) -> AttendanceRecord {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => new_id(),
        };
        AttendanceRecord {
            id,
            date: self.date,
            student_id: self.student_id,
            status: self.status,
            notes: self.notes,
        }
    }
}

fn get_batch(params: &serde_json::Value) -> Result<Vec<AttendanceRecord>, HandlerErr> {
    let batch: Vec<BatchRecord> = get_object(params, "records")?;
    Ok(batch.into_iter().map(BatchRecord::into_record).collect())
}

fn attendance_for_date(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date = get_date(params, "date")?;
    let records = state.attendance.records_for_date(&date);
    Ok(json!({
        "date": CalendarDay::of(&date).to_string(),
        "records": records,
    }))
}

fn attendance_upsert(
    attendance: &mut AttendanceStore,
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let record: NewAttendanceRecord = get_object(params, "record")?;
    let saved = attendance.add_or_update_record(conn, record)?;
    Ok(json!({ "record": saved }))
}

fn attendance_save(
    attendance: &mut AttendanceStore,
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let records = get_batch(params)?;
    let saved = attendance.save_attendance(conn, records)?;
    Ok(json!({ "saved": saved }))
}

fn attendance_replace_day(
    attendance: &mut AttendanceStore,
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let day = CalendarDay::of(&get_date(params, "date")?);
    let records = get_batch(params)?;
    let written = attendance.replace_day(conn, day, records)?;
    Ok(json!({ "date": day.to_string(), "saved": written }))
}

fn attendance_delete_old(
    attendance: &mut AttendanceStore,
    conn: &Connection,
    retention_days: u32,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let days = match params.get("days") {
        None | Some(serde_json::Value::Null) => retention_days,
        Some(v) => v
            .as_u64()
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(|| HandlerErr::bad_params("days must be a non-negative integer"))?,
    };
    let removed = attendance.delete_old_records(conn, days, Local::now().naive_local())?;
    Ok(json!({ "days": days, "removed": removed }))
}

fn attendance_export_csv(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let day = CalendarDay::of(&get_date(params, "date")?);
    let records = state.attendance.records_for_day(day);
    let csv = export::attendance_csv(&records, state.students.list()).map_err(|e| HandlerErr {
        code: "export_failed",
        message: e.to_string(),
        details: None,
    })?;
    let filename = export::export_filename(day);

    let out_dir = params
        .get("outDir")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let path = match out_dir {
        Some(dir) => {
            let out = PathBuf::from(dir).join(&filename);
            std::fs::create_dir_all(dir)
                .and_then(|_| std::fs::write(&out, &csv))
                .map_err(|e| HandlerErr {
                    code: "io_failed",
                    message: e.to_string(),
                    details: Some(json!({ "path": out.to_string_lossy() })),
                })?;
            Some(out.to_string_lossy().to_string())
        }
        None => None,
    };

    Ok(json!({
        "filename": filename,
        "rowsExported": records.len(),
        "csv": csv,
        "path": path,
    }))
}

fn handle_read(
    state: &AppState,
    req: &Request,
    f: fn(&AppState, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    match f(state, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

fn handle_write<F>(state: &mut AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut AttendanceStore, &Connection) -> Result<serde_json::Value, HandlerErr>,
{
    let AppState { db, attendance, .. } = state;
    let Some(conn) = db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(attendance, conn) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let params = &req.params;
    match req.method.as_str() {
        "attendance.list" => Some(ok(&req.id, json!({ "records": state.attendance.records() }))),
        "attendance.forDate" => Some(handle_read(state, req, attendance_for_date)),
        "attendance.exportCsv" => Some(handle_read(state, req, attendance_export_csv)),
        "attendance.upsert" => Some(handle_write(state, req, |a, c| attendance_upsert(a, c, params))),
        "attendance.save" => Some(handle_write(state, req, |a, c| attendance_save(a, c, params))),
        "attendance.replaceDay" => Some(handle_write(state, req, |a, c| {
            attendance_replace_day(a, c, params)
        })),
        "attendance.deleteOld" => {
            let retention_days = state.config.attendance.retention_days;
            Some(handle_write(state, req, |a, c| {
                attendance_delete_old(a, c, retention_days, params)
            }))
        }
        _ => None,
    }
}
