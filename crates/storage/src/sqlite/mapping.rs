use exam_core::model::{ScoreRecord, TaskId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRecord, StorageError> {
    let task_id = TaskId::new(row.try_get::<String, _>("task_id").map_err(ser)?).map_err(ser)?;
    let date = row.try_get("date").map_err(ser)?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let pct = u32_from_i64("pct", row.try_get::<i64, _>("pct").map_err(ser)?)?;
    let elapsed_seconds = u64_from_i64(
        "elapsed_seconds",
        row.try_get::<i64, _>("elapsed_seconds").map_err(ser)?,
    )?;
    let question_file: Option<String> = row.try_get("question_file").map_err(ser)?;

    ScoreRecord::from_persisted(
        task_id,
        date,
        correct,
        total,
        pct,
        elapsed_seconds,
        question_file,
    )
    .map_err(ser)
}
