use super::params::{get_non_empty_str, get_object, get_required_str};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store::students::{NewStudent, StudentPatch};
use crate::store::StudentStore;
use chrono::Utc;
use serde_json::json;

fn students_create(
    students: &mut StudentStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let data: NewStudent = get_object(params, "student")?;
    let blank = [&data.name, &data.usn, &data.branch, &data.course]
        .iter()
        .any(|v| v.trim().is_empty());
    if blank {
        return Err(HandlerErr::bad_params("name, USN, Branch and course are required"));
    }
    let student = students.add_student(data);
    Ok(json!({ "student": student }))
}

fn students_update(
    students: &mut StudentStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "studentId")?;
    let patch: StudentPatch = get_object(params, "patch")?;
    let found = students.update_student(&id, patch);
    Ok(json!({ "found": found, "student": students.get(&id) }))
}

fn students_delete(
    students: &mut StudentStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "studentId")?;
    Ok(json!({ "found": students.delete_student(&id) }))
}

fn students_update_location(
    students: &mut StudentStore,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = get_required_str(params, "studentId")?;
    let location = get_non_empty_str(params, "location")?;
    let found = students.update_location(&id, location.trim(), Utc::now());
    Ok(json!({ "found": found, "student": students.get(&id) }))
}

fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let students = &mut state.students;
    match req.method.as_str() {
        "students.list" => Some(ok(&req.id, json!({ "students": students.list() }))),
        "students.create" => Some(respond(req, students_create(students, &req.params))),
        "students.update" => Some(respond(req, students_update(students, &req.params))),
        "students.delete" => Some(respond(req, students_delete(students, &req.params))),
        "students.updateLocation" => Some(respond(req, students_update_location(students, &req.params))),
        _ => None,
    }
}
