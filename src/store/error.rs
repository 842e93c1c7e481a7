use crate::db::StorageError;
use crate::model::CalendarDay;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("record for student {student_id} is dated {found}, expected {expected}")]
    DayMismatch {
        student_id: String,
        expected: CalendarDay,
        found: CalendarDay,
    },
}
