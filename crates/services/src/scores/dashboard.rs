use serde::Serialize;

use exam_core::model::{ScoreRecord, TaskId};

/// Aggregates for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub task_id: TaskId,
    pub sessions: usize,
    pub best_pct: u32,
    pub average_pct: u32,
    pub latest: ScoreRecord,
}

/// Score history rolled up per task, tasks in the order they were first practiced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub tasks: Vec<TaskSummary>,
    pub total_sessions: usize,
    pub average_pct: u32,
}

impl Dashboard {
    /// `records` must be oldest first; the last record of a task is its `latest`.
    #[must_use]
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        let mut groups: Vec<(&TaskId, Vec<&ScoreRecord>)> = Vec::new();
        for record in records {
            match groups.iter().position(|(id, _)| *id == record.task_id()) {
                Some(index) => groups[index].1.push(record),
                None => groups.push((record.task_id(), vec![record])),
            }
        }

        let tasks = groups
            .into_iter()
            .filter_map(|(task_id, group)| {
                let latest = (*group.last()?).clone();
                Some(TaskSummary {
                    task_id: task_id.clone(),
                    sessions: group.len(),
                    best_pct: group.iter().map(|r| r.pct()).max().unwrap_or(0),
                    average_pct: rounded_mean(group.iter().map(|r| r.pct())),
                    latest,
                })
            })
            .collect();

        Self {
            tasks,
            total_sessions: records.len(),
            average_pct: rounded_mean(records.iter().map(ScoreRecord::pct)),
        }
    }

    #[must_use]
    pub fn task(&self, task_id: &TaskId) -> Option<&TaskSummary> {
        self.tasks.iter().find(|t| &t.task_id == task_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }
}

/// Mean rounded half up; 0 for no values.
fn rounded_mean(values: impl Iterator<Item = u32>) -> u32 {
    let (sum, count) = values.fold((0_u64, 0_u64), |(sum, count), v| {
        (sum + u64::from(v), count + 1)
    });
    if count == 0 {
        return 0;
    }
    u32::try_from((2 * sum + count) / (2 * count)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::fixed_now;

    fn record(task: &str, correct: u32, total: u32) -> ScoreRecord {
        ScoreRecord::new(TaskId::new(task).unwrap(), fixed_now(), correct, total, 0).unwrap()
    }

    #[test]
    fn empty_history() {
        let dashboard = Dashboard::from_records(&[]);
        assert!(dashboard.is_empty());
        assert!(dashboard.tasks.is_empty());
        assert_eq!(dashboard.average_pct, 0);
    }

    #[test]
    fn groups_in_first_seen_order() {
        let records = vec![
            record("toeic/part6", 1, 2),
            record("toeic/part5", 3, 4),
            record("toeic/part6", 2, 2),
            record("toeic/part6", 0, 4),
        ];
        let dashboard = Dashboard::from_records(&records);

        let order: Vec<&str> = dashboard.tasks.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(order, vec!["toeic/part6", "toeic/part5"]);

        let part6 = dashboard.task(&TaskId::new("toeic/part6").unwrap()).unwrap();
        assert_eq!(part6.sessions, 3);
        assert_eq!(part6.best_pct, 100);
        // (50 + 100 + 0) / 3 = 50
        assert_eq!(part6.average_pct, 50);
        assert_eq!(part6.latest.pct(), 0);

        assert_eq!(dashboard.total_sessions, 4);
        // (50 + 75 + 100 + 0) / 4 = 56.25
        assert_eq!(dashboard.average_pct, 56);
    }

    #[test]
    fn averages_round_half_up() {
        assert_eq!(rounded_mean([1_u32, 2].into_iter()), 2);
        assert_eq!(rounded_mean([67_u32, 78, 100].into_iter()), 82);
    }
}
