use crate::model::{new_id, Student};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    #[serde(rename = "USN")]
    pub usn: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    pub course: String,
    #[serde(rename = "currentClass", default)]
    pub current_class: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    #[serde(rename = "USN")]
    pub usn: Option<String>,
    #[serde(rename = "Branch")]
    pub branch: Option<String>,
    pub course: Option<String>,
    #[serde(rename = "currentClass")]
    pub current_class: Option<String>,
}

#[derive(Debug, Default)]
pub struct StudentStore {
    students: Vec<Student>,
}

impl StudentStore {
    pub fn list(&self) -> &[Student] {
        &self.students
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn add_student(&mut self, data: NewStudent) -> &Student {
        let student = Student {
            id: new_id(),
            name: data.name,
            usn: data.usn,
            branch: data.branch,
            course: data.course,
            current_class: data.current_class,
            last_updated: None,
        };
        debug!(student_id = %student.id, "student added");
        self.students.push(student);
        &self.students[self.students.len() - 1]
    }

    pub fn update_student(&mut self, id: &str, patch: StudentPatch) -> bool {
        let Some(s) = self.students.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        if let Some(v) = patch.name {
            s.name = v;
        }
        if let Some(v) = patch.usn {
            s.usn = v;
        }
        if let Some(v) = patch.branch {
            s.branch = v;
        }
        if let Some(v) = patch.course {
            s.course = v;
        }
        if let Some(v) = patch.current_class {
            s.current_class = Some(v);
        }
        true
    }

    pub fn delete_student(&mut self, id: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        self.students.len() != before
    }

    pub fn update_location(&mut self, id: &str, location: &str, now: DateTime<Utc>) -> bool {
        let Some(s) = self.students.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        s.current_class = Some(location.to_string());
        s.last_updated = Some(now);
        debug!(student_id = %id, location, "location updated");
        true
    }
}
