use crate::model::{AttendanceRecord, CalendarDay, Student};

const HEADER: [&str; 5] = [
    "Date",
    "Student Name",
    "University Seat Number",
    "Status",
    "Notes",
];

pub fn export_filename(day: CalendarDay) -> String {
    format!("attendance_{day}.csv")
}

/// One row per record. Records pointing at a deleted student export with a blank name and USN.
pub fn attendance_csv(records: &[&AttendanceRecord], students: &[Student]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for rec in records {
        let student = students.iter().find(|s| s.id == rec.student_id);
        let day = rec.day().to_string();
        wtr.write_record([
            day.as_str(),
            student.map(|s| s.name.as_str()).unwrap_or(""),
            student.map(|s| s.usn.as_str()).unwrap_or(""),
            rec.status.as_str(),
            rec.notes.as_deref().unwrap_or(""),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_record_date, AttendanceStatus};

    fn student(id: &str, name: &str, usn: &str) -> Student {
        Student {
            id: id.into(),
            name: name.into(),
            usn: usn.into(),
            branch: "ECE".into(),
            course: "BE".into(),
            current_class: None,
            last_updated: None,
        }
    }

    fn record(student_id: &str, status: AttendanceStatus, notes: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("r-{student_id}"),
            date: parse_record_date("2024-03-01T14:00:00").expect("date"),
            student_id: student_id.into(),
            status,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn filename_uses_iso_day() {
        let day: CalendarDay = "2024-03-01".parse().expect("day");
        assert_eq!(export_filename(day), "attendance_2024-03-01.csv");
    }

    #[test]
    fn rows_join_student_fields_and_quote_notes() {
        let students = vec![student("s1", "Ravi Kumar", "1AB21EC010")];
        let a = record("s1", AttendanceStatus::Present, Some("late, excused"));
        let b = record("gone", AttendanceStatus::Absent, None);
        let csv = attendance_csv(&[&a, &b], &students).expect("csv");

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Student Name,University Seat Number,Status,Notes");
        assert_eq!(lines[1], "2024-03-01,Ravi Kumar,1AB21EC010,present,\"late, excused\"");
        assert_eq!(lines[2], "2024-03-01,,,absent,");
        assert_eq!(lines.len(), 3);
    }
}
