use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TaskId;
use crate::scoring::rounded_percentage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreRecordError {
    #[error("a score needs at least one question")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("stored percentage {pct} does not match {correct}/{total}")]
    PercentageMismatch { pct: u32, correct: u32, total: u32 },
}

/// One completed practice session, as submitted to the score history.
///
/// Serializes to the score API's JSON shape (camelCase, millisecond ISO-8601 date,
/// `questionFile` omitted when absent). Deserializing goes through the same checks as
/// [`ScoreRecord::from_persisted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawScoreRecord")]
pub struct ScoreRecord {
    task_id: TaskId,
    #[serde(serialize_with = "iso_millis::serialize")]
    date: DateTime<Utc>,
    correct: u32,
    total: u32,
    pct: u32,
    elapsed_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    question_file: Option<String>,
}

/// Unchecked wire shape; older entries may lack `elapsedSeconds`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScoreRecord {
    task_id: TaskId,
    #[serde(deserialize_with = "iso_millis::deserialize")]
    date: DateTime<Utc>,
    correct: u32,
    total: u32,
    pct: u32,
    #[serde(default)]
    elapsed_seconds: u64,
    #[serde(default)]
    question_file: Option<String>,
}

impl TryFrom<RawScoreRecord> for ScoreRecord {
    type Error = ScoreRecordError;

    fn try_from(raw: RawScoreRecord) -> Result<Self, Self::Error> {
        Self::from_persisted(
            raw.task_id,
            raw.date,
            raw.correct,
            raw.total,
            raw.pct,
            raw.elapsed_seconds,
            raw.question_file,
        )
    }
}

impl ScoreRecord {
    /// Build a record for a finished session, deriving `pct` from the counts.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError::NoQuestions` when `total` is zero and
    /// `ScoreRecordError::CorrectExceedsTotal` when the counts are inconsistent.
    pub fn new(
        task_id: TaskId,
        date: DateTime<Utc>,
        correct: u32,
        total: u32,
        elapsed_seconds: u64,
    ) -> Result<Self, ScoreRecordError> {
        validate_counts(correct, total)?;
        Ok(Self {
            task_id,
            date,
            correct,
            total,
            pct: rounded_percentage(correct, total),
            elapsed_seconds,
            question_file: None,
        })
    }

    /// Rehydrate a record from storage, checking that the stored percentage agrees
    /// with the counts.
    ///
    /// # Errors
    ///
    /// Returns `ScoreRecordError` if the counts are invalid or `pct` was tampered with.
    pub fn from_persisted(
        task_id: TaskId,
        date: DateTime<Utc>,
        correct: u32,
        total: u32,
        pct: u32,
        elapsed_seconds: u64,
        question_file: Option<String>,
    ) -> Result<Self, ScoreRecordError> {
        validate_counts(correct, total)?;
        if pct != rounded_percentage(correct, total) {
            return Err(ScoreRecordError::PercentageMismatch {
                pct,
                correct,
                total,
            });
        }
        Ok(Self {
            task_id,
            date,
            correct,
            total,
            pct,
            elapsed_seconds,
            question_file,
        })
    }

    #[must_use]
    pub fn with_question_file(mut self, file: impl Into<String>) -> Self {
        self.question_file = Some(file.into());
        self
    }

    #[must_use]
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn pct(&self) -> u32 {
        self.pct
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub fn question_file(&self) -> Option<&str> {
        self.question_file.as_deref()
    }
}

fn validate_counts(correct: u32, total: u32) -> Result<(), ScoreRecordError> {
    if total == 0 {
        return Err(ScoreRecordError::NoQuestions);
    }
    if correct > total {
        return Err(ScoreRecordError::CorrectExceedsTotal { correct, total });
    }
    Ok(())
}

/// `2026-02-18T00:00:00.000Z` on the wire; any RFC 3339 timestamp is accepted back.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use serde_json::json;

    fn part5() -> TaskId {
        TaskId::new("toeic/part5").unwrap()
    }

    #[test]
    fn derives_rounded_percentage() {
        let record = ScoreRecord::new(part5(), fixed_now(), 7, 9, 12).unwrap();
        assert_eq!(record.pct(), 78);
        assert_eq!(record.elapsed_seconds(), 12);
    }

    #[test]
    fn rejects_empty_and_inconsistent_counts() {
        assert_eq!(
            ScoreRecord::new(part5(), fixed_now(), 0, 0, 0),
            Err(ScoreRecordError::NoQuestions)
        );
        assert_eq!(
            ScoreRecord::new(part5(), fixed_now(), 4, 3, 0),
            Err(ScoreRecordError::CorrectExceedsTotal {
                correct: 4,
                total: 3
            })
        );
    }

    #[test]
    fn serializes_to_score_api_shape() {
        let record = ScoreRecord::new(part5(), fixed_now(), 7, 9, 12).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "taskId": "toeic/part5",
                "date": "2026-02-18T00:00:00.000Z",
                "correct": 7,
                "total": 9,
                "pct": 78,
                "elapsedSeconds": 12
            })
        );

        let with_file = record.with_question_file("set-01.json");
        let value = serde_json::to_value(&with_file).unwrap();
        assert_eq!(value["questionFile"], "set-01.json");
    }

    #[test]
    fn reads_entries_without_elapsed_seconds() {
        let raw = r#"{"taskId":"toeic/part6","date":"2026-02-18T00:00:00.000Z","correct":4,"total":5,"pct":80}"#;
        let record: ScoreRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.pct(), 80);
        assert_eq!(record.elapsed_seconds(), 0);
        assert_eq!(record.date(), fixed_now());
        assert_eq!(record.question_file(), None);
    }

    #[test]
    fn deserialization_rejects_inconsistent_records() {
        let no_questions = r#"{"taskId":"toeic/part5","date":"2026-02-18T00:00:00.000Z","correct":9,"total":0,"pct":999}"#;
        let err = serde_json::from_str::<ScoreRecord>(no_questions).unwrap_err();
        assert!(err.to_string().contains("at least one question"));

        let wrong_pct = r#"{"taskId":"toeic/part5","date":"2026-02-18T00:00:00.000Z","correct":1,"total":2,"pct":90}"#;
        let err = serde_json::from_str::<ScoreRecord>(wrong_pct).unwrap_err();
        assert!(err.to_string().contains("does not match"));

        let too_many = r#"{"taskId":"toeic/part5","date":"2026-02-18T00:00:00.000Z","correct":3,"total":2,"pct":150}"#;
        assert!(serde_json::from_str::<ScoreRecord>(too_many).is_err());
    }

    #[test]
    fn json_round_trip_keeps_question_file() {
        let record = ScoreRecord::new(part5(), fixed_now(), 3, 4, 20)
            .unwrap()
            .with_question_file("set-02.json");
        let raw = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<ScoreRecord>(&raw).unwrap(), record);
    }

    #[test]
    fn persisted_percentage_must_match() {
        let err = ScoreRecord::from_persisted(part5(), fixed_now(), 1, 2, 60, 0, None).unwrap_err();
        assert!(matches!(err, ScoreRecordError::PercentageMismatch { .. }));
    }
}
