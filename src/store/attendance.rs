use super::{read_json, StoreError};
use crate::db::KvStorage;
use crate::model::{new_id, AttendanceRecord, CalendarDay, NewAttendanceRecord};
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

pub const RECORDS_KEY: &str = "attendanceRecords";

/// Per-student, per-day attendance marks. At most one record exists for each
/// (student, calendar day) pair. Every mutation writes the whole collection
/// through to storage before the in-memory copy is replaced.
#[derive(Debug, Default)]
pub struct AttendanceStore {
    records: Vec<AttendanceRecord>,
}

impl AttendanceStore {
    pub fn load(storage: &dyn KvStorage) -> Self {
        let records: Vec<AttendanceRecord> = read_json(storage, RECORDS_KEY).unwrap_or_default();
        info!(count = records.len(), "attendance records loaded");
        Self { records }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn records_for_date(&self, date: &NaiveDateTime) -> Vec<&AttendanceRecord> {
        self.records_for_day(CalendarDay::of(date))
    }

    pub fn records_for_day(&self, day: CalendarDay) -> Vec<&AttendanceRecord> {
        self.records.iter().filter(|r| r.day() == day).collect()
    }

    /// Upserts on (student, day). An existing mark keeps its id.
    pub fn add_or_update_record(
        &mut self,
        storage: &dyn KvStorage,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut next = self.records.clone();
        let day = CalendarDay::of(&record.date);
        let saved = match next
            .iter_mut()
            .find(|r| r.student_id == record.student_id && r.day() == day)
        {
            Some(existing) => {
                let id = existing.id.clone();
                *existing = record.with_id(id);
                existing.clone()
            }
            None => {
                let rec = record.with_id(new_id());
                next.push(rec.clone());
                rec
            }
        };
        self.commit(storage, next)?;
        debug!(record_id = %saved.id, student_id = %saved.student_id, %day, "attendance upserted");
        Ok(saved)
    }

    /// Saves a batch of marks. Each record replaces whatever the same student
    /// has on the same day; marks of students outside the batch are untouched.
    pub fn save_attendance(
        &mut self,
        storage: &dyn KvStorage,
        records: Vec<AttendanceRecord>,
    ) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let saved = records.len();
        let mut next = self.records.clone();
        for rec in records {
            let day = rec.day();
            next.retain(|r| !(r.student_id == rec.student_id && r.day() == day));
            push_unique(&mut next, rec);
        }
        self.commit(storage, next)?;
        debug!(saved, "attendance batch saved");
        Ok(saved)
    }

    /// Overwrites one whole day: every existing mark on `day` is dropped and
    /// the batch takes its place. All records must fall on `day`.
    pub fn replace_day(
        &mut self,
        storage: &dyn KvStorage,
        day: CalendarDay,
        records: Vec<AttendanceRecord>,
    ) -> Result<usize, StoreError> {
        if let Some(stray) = records.iter().find(|r| r.day() != day) {
            return Err(StoreError::DayMismatch {
                student_id: stray.student_id.clone(),
                expected: day,
                found: stray.day(),
            });
        }
        let mut next: Vec<AttendanceRecord> =
            self.records.iter().filter(|r| r.day() != day).cloned().collect();
        let kept = next.len();
        for rec in records {
            next.retain(|r| !(r.day() == day && r.student_id == rec.student_id));
            push_unique(&mut next, rec);
        }
        let written = next.len() - kept;
        self.commit(storage, next)?;
        debug!(%day, written, "attendance day replaced");
        Ok(written)
    }

    /// Drops records dated before `now - days`. A record exactly at the cutoff stays.
    pub fn delete_old_records(
        &mut self,
        storage: &dyn KvStorage,
        days: u32,
        now: NaiveDateTime,
    ) -> Result<usize, StoreError> {
        // A window reaching past the calendar's range keeps everything.
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDateTime::MIN);
        let next: Vec<AttendanceRecord> = self
            .records
            .iter()
            .filter(|r| r.date >= cutoff)
            .cloned()
            .collect();
        let removed = self.records.len() - next.len();
        self.commit(storage, next)?;
        info!(days, removed, %cutoff, "old attendance records pruned");
        Ok(removed)
    }

    fn commit(
        &mut self,
        storage: &dyn KvStorage,
        next: Vec<AttendanceRecord>,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&next)?;
        storage.set(RECORDS_KEY, &encoded)?;
        self.records = next;
        Ok(())
    }
}

/// Appends `rec`, minting a fresh id if another mark already holds its id.
fn push_unique(records: &mut Vec<AttendanceRecord>, mut rec: AttendanceRecord) {
    if records.iter().any(|r| r.id == rec.id) {
        let id = new_id();
        warn!(taken = %rec.id, %id, student_id = %rec.student_id, "attendance id already in use, reassigned");
        rec.id = id;
    }
    records.push(rec);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStorage;
    use crate::model::{parse_record_date, AttendanceStatus};
    use chrono::Timelike;

    fn at(s: &str) -> NaiveDateTime {
        parse_record_date(s).expect("date")
    }

    fn mark(student: &str, date: &str, status: AttendanceStatus) -> NewAttendanceRecord {
        NewAttendanceRecord {
            date: at(date),
            student_id: student.into(),
            status,
            notes: None,
        }
    }

    fn saved(id: &str, student: &str, date: &str, status: AttendanceStatus) -> AttendanceRecord {
        mark(student, date, status).with_id(id.into())
    }

    #[test]
    fn same_day_resubmission_keeps_one_record() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        let first = store
            .add_or_update_record(&storage, mark("s1", "2024-03-01T08:00:00", AttendanceStatus::Present))
            .expect("first");
        let mut second = mark("s1", "2024-03-01T15:30:00", AttendanceStatus::Absent);
        second.notes = Some("left early".into());
        let second = store.add_or_update_record(&storage, second).expect("second");

        assert_eq!(store.records().len(), 1);
        assert_eq!(second.id, first.id);
        let only = &store.records()[0];
        assert_eq!(only.status, AttendanceStatus::Absent);
        assert_eq!(only.notes.as_deref(), Some("left early"));
    }

    #[test]
    fn different_days_or_students_append() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        for (s, d) in [("s1", "2024-03-01"), ("s1", "2024-03-02"), ("s2", "2024-03-01")] {
            store
                .add_or_update_record(&storage, mark(s, d, AttendanceStatus::Present))
                .expect("upsert");
        }
        assert_eq!(store.records().len(), 3);
    }

    #[test]
    fn query_matches_on_calendar_day_only() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .add_or_update_record(&storage, mark("s1", "2024-03-01T23:59:00", AttendanceStatus::Present))
            .expect("late");
        store
            .add_or_update_record(&storage, mark("s2", "2024-03-02T00:00:00", AttendanceStatus::Present))
            .expect("next day");

        let hits = store.records_for_date(&at("2024-03-01T00:00:00"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].student_id, "s1");
    }

    #[test]
    fn successive_batches_for_one_day_coexist() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .save_attendance(&storage, vec![saved("a", "s1", "2024-03-01", AttendanceStatus::Present)])
            .expect("first batch");
        store
            .save_attendance(&storage, vec![saved("b", "s2", "2024-03-01", AttendanceStatus::Absent)])
            .expect("second batch");

        let day = store.records_for_date(&at("2024-03-01"));
        assert_eq!(day.len(), 2);
        assert!(day.iter().any(|r| r.student_id == "s1" && r.status == AttendanceStatus::Present));
        assert!(day.iter().any(|r| r.student_id == "s2" && r.status == AttendanceStatus::Absent));
    }

    #[test]
    fn batch_replaces_same_student_same_day() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .save_attendance(
                &storage,
                vec![
                    saved("a", "s1", "2024-03-01", AttendanceStatus::Present),
                    saved("b", "s1", "2024-03-02", AttendanceStatus::Present),
                ],
            )
            .expect("seed");
        store
            .save_attendance(&storage, vec![saved("c", "s1", "2024-03-01T10:00:00", AttendanceStatus::Absent)])
            .expect("resave");

        assert_eq!(store.records().len(), 2);
        let day = store.records_for_date(&at("2024-03-01"));
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].id, "c");
    }

    #[test]
    fn batch_id_taken_by_another_mark_is_reassigned() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .save_attendance(&storage, vec![saved("a", "s1", "2024-03-01", AttendanceStatus::Present)])
            .expect("seed");
        store
            .save_attendance(
                &storage,
                vec![
                    saved("a", "s2", "2024-03-01", AttendanceStatus::Absent),
                    saved("b", "s1", "2024-03-02", AttendanceStatus::Present),
                    saved("b", "s3", "2024-03-02", AttendanceStatus::Present),
                ],
            )
            .expect("colliding batch");

        assert_eq!(store.records().len(), 4);
        let mut ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(store.records()[0].id, "a");
        assert_eq!(store.records()[0].student_id, "s1");

        // Re-saving a mark under its own id keeps that id.
        store
            .save_attendance(&storage, vec![saved("a", "s1", "2024-03-01T11:00:00", AttendanceStatus::Absent)])
            .expect("resave");
        let s1 = store.records_for_date(&at("2024-03-01"));
        assert!(s1.iter().any(|r| r.id == "a" && r.student_id == "s1" && r.status == AttendanceStatus::Absent));
    }

    #[test]
    fn empty_batch_changes_nothing() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .add_or_update_record(&storage, mark("s1", "2024-03-01", AttendanceStatus::Present))
            .expect("seed");
        assert_eq!(store.save_attendance(&storage, Vec::new()).expect("save"), 0);
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn replace_day_overwrites_whole_day() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .save_attendance(
                &storage,
                vec![
                    saved("a", "s1", "2024-03-01", AttendanceStatus::Present),
                    saved("b", "s2", "2024-03-01", AttendanceStatus::Present),
                    saved("c", "s1", "2024-02-29", AttendanceStatus::Absent),
                ],
            )
            .expect("seed");

        let day: CalendarDay = "2024-03-01".parse().expect("day");
        let written = store
            .replace_day(&storage, day, vec![saved("d", "s2", "2024-03-01", AttendanceStatus::Absent)])
            .expect("replace");
        assert_eq!(written, 1);

        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn replace_day_rejects_records_from_other_days() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .save_attendance(&storage, vec![saved("a", "s1", "2024-03-01", AttendanceStatus::Present)])
            .expect("seed");

        let day: CalendarDay = "2024-03-01".parse().expect("day");
        let err = store
            .replace_day(&storage, day, vec![saved("x", "s2", "2024-03-02", AttendanceStatus::Absent)])
            .expect_err("mismatch");
        assert!(matches!(err, StoreError::DayMismatch { .. }));
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn prune_keeps_the_cutoff_day() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        let now = at("2024-04-10T12:00:00");
        store
            .save_attendance(
                &storage,
                vec![
                    AttendanceRecord {
                        date: now - Duration::days(30),
                        ..saved("thirty", "s1", "2024-01-01", AttendanceStatus::Present)
                    },
                    AttendanceRecord {
                        date: now - Duration::days(31),
                        ..saved("thirty-one", "s2", "2024-01-01", AttendanceStatus::Present)
                    },
                ],
            )
            .expect("seed");

        assert_eq!(store.delete_old_records(&storage, u32::MAX, now).expect("wide window"), 0);
        let removed = store.delete_old_records(&storage, 30, now).expect("prune");
        assert_eq!(removed, 1);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].id, "thirty");
    }

    #[test]
    fn persisted_records_reload_equal() {
        let storage = MemoryStorage::default();
        let mut store = AttendanceStore::default();
        store
            .add_or_update_record(&storage, mark("s1", "2024-03-01T09:15:00", AttendanceStatus::Present))
            .expect("one");
        let mut with_notes = mark("s2", "2024-03-01", AttendanceStatus::Absent);
        with_notes.notes = Some("sick".into());
        store.add_or_update_record(&storage, with_notes).expect("two");
        let stamped = store
            .add_or_update_record(&storage, mark("s3", "2024-03-01T09:15:00.123Z", AttendanceStatus::Present))
            .expect("browser timestamp");
        assert_eq!(stamped.date.nanosecond(), 123_000_000);

        let reloaded = AttendanceStore::load(&storage);
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn malformed_storage_loads_empty() {
        let storage = MemoryStorage::with(&[(RECORDS_KEY, "[{\"id\":1}]")]);
        assert!(AttendanceStore::load(&storage).records().is_empty());
    }
}
