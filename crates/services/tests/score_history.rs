use std::sync::Arc;

use exam_core::model::TaskId;
use exam_core::time::fixed_now;
use serde_json::json;
use services::{Clock, ScoreHistoryService};
use storage::repository::Storage;

fn task(id: &str) -> TaskId {
    TaskId::new(id).expect("task id")
}

#[tokio::test]
async fn zero_question_sessions_are_not_recorded() {
    let service = ScoreHistoryService::in_memory(Clock::fixed(fixed_now()));
    let saved = service
        .save_score(&task("toeic/part5"), 0, 0, 40, None)
        .await
        .expect("save");
    assert_eq!(saved, None);
    assert!(service.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn records_are_dated_by_the_service_clock() {
    let service = ScoreHistoryService::in_memory(Clock::fixed(fixed_now()));
    let record = service
        .save_score(&task("toeic/part5"), 7, 9, 12, None)
        .await
        .expect("save")
        .expect("record");

    assert_eq!(
        serde_json::to_value(&record).expect("json"),
        json!({
            "taskId": "toeic/part5",
            "date": "2026-02-18T00:00:00.000Z",
            "correct": 7,
            "total": 9,
            "pct": 78,
            "elapsedSeconds": 12
        })
    );
}

#[tokio::test]
async fn inconsistent_counts_are_rejected() {
    let service = ScoreHistoryService::in_memory(Clock::fixed(fixed_now()));
    let result = service
        .save_score(&task("toeic/part5"), 5, 4, 0, None)
        .await;
    assert!(matches!(result, Err(services::ScoreServiceError::Record(_))));
}

#[tokio::test]
async fn dashboard_over_sqlite_history() {
    let storage = Storage::sqlite("sqlite:file:memdb_score_history?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let service = ScoreHistoryService::new(Clock::fixed(fixed_now()), Arc::clone(&storage.scores));

    service
        .save_score(&task("toefl/reading/daily-life"), 4, 5, 60, Some("daily-01.json"))
        .await
        .expect("save");
    service
        .save_score(&task("toeic/part7"), 1, 4, 300, None)
        .await
        .expect("save");
    service
        .save_score(&task("toefl/reading/daily-life"), 5, 5, 55, None)
        .await
        .expect("save");

    let daily = service
        .list_for_task(&task("toefl/reading/daily-life"))
        .await
        .expect("list");
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].question_file(), Some("daily-01.json"));

    let dashboard = service.dashboard().await.expect("dashboard");
    assert_eq!(dashboard.total_sessions, 3);
    assert_eq!(dashboard.tasks.len(), 2);
    let first = &dashboard.tasks[0];
    assert_eq!(first.task_id.as_str(), "toefl/reading/daily-life");
    assert_eq!(first.sessions, 2);
    assert_eq!(first.best_pct, 100);
    assert_eq!(first.average_pct, 90);
    assert_eq!(first.latest.elapsed_seconds(), 55);
    // (80 + 25 + 100) / 3 = 68.33
    assert_eq!(dashboard.average_pct, 68);

    service.clear_all().await.expect("clear");
    assert!(service.dashboard().await.expect("dashboard").is_empty());
}
