use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::models::okr::progress_percent;
use crate::models::{Okr, OkrStatus, Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_okrs: usize,
    pub completed_tasks: usize,
    /// Rounded mean of every OKR's progress; 0 without OKRs.
    pub overall_progress: i32,
    /// Tasks created since Monday 00:00 UTC.
    pub weekly_progress: PeriodProgress,
    /// Tasks created since the 1st of the month, 00:00 UTC.
    pub monthly_progress: PeriodProgress,
    pub upcoming_reminders: usize,
}

pub fn compute_dashboard_stats(
    okrs: &[Okr],
    tasks: &[Task],
    upcoming_reminders: usize,
    now: DateTime<Utc>,
) -> DashboardStats {
    let active_okrs = okrs.iter().filter(|o| o.status == OkrStatus::Active).count();
    let completed_tasks = tasks.iter().filter(|t| t.status == TaskStatus::Completed).count();

    let overall_progress = if okrs.is_empty() {
        0
    } else {
        let sum: i64 = okrs.iter().map(|o| i64::from(o.progress)).sum();
        (sum as f64 / okrs.len() as f64).round() as i32
    };

    let today = now.date_naive();
    DashboardStats {
        active_okrs,
        completed_tasks,
        overall_progress,
        weekly_progress: progress_since(tasks, week_start(today)),
        monthly_progress: progress_since(tasks, month_start(today)),
        upcoming_reminders,
    }
}

fn week_start(today: NaiveDate) -> DateTime<Utc> {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    midnight(monday)
}

fn month_start(today: NaiveDate) -> DateTime<Utc> {
    midnight(today - Days::new(u64::from(today.day0())))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn progress_since(tasks: &[Task], since: DateTime<Utc>) -> PeriodProgress {
    let in_period: Vec<&Task> = tasks.iter().filter(|t| t.created_at >= since).collect();
    let completed = in_period
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    PeriodProgress {
        completed,
        total: in_period.len(),
        percentage: progress_percent(completed, in_period.len()),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::{EvidenceKind, TaskLevel};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn okr(status: OkrStatus, progress: i32) -> Okr {
        Okr {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: "d".into(),
            target_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            objective: "o".into(),
            key_results: vec![],
            status,
            progress,
            created_at: at(2025, 1, 1, 0),
            updated_at: at(2025, 1, 1, 0),
        }
    }

    fn task(status: TaskStatus, created_at: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            okr_id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            deadline: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            evidence_hint: EvidenceKind::Text,
            level: TaskLevel::Easy,
            status,
            completed_at: None,
            proof_url: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_empty_dashboard() {
        let s = compute_dashboard_stats(&[], &[], 0, at(2025, 7, 16, 12));
        assert_eq!(s.overall_progress, 0);
        assert_eq!(s.weekly_progress, PeriodProgress { completed: 0, total: 0, percentage: 0 });
    }

    #[test]
    fn test_counts_and_periods() {
        // Wednesday 2025-07-16; week starts Monday 07-14, month on 07-01
        let now = at(2025, 7, 16, 12);
        let okrs = [
            okr(OkrStatus::Active, 50),
            okr(OkrStatus::Active, 25),
            okr(OkrStatus::Completed, 100),
        ];
        let tasks = [
            task(TaskStatus::Completed, at(2025, 7, 14, 0)), // week + month
            task(TaskStatus::Pending, at(2025, 7, 15, 9)),   // week + month
            task(TaskStatus::Completed, at(2025, 7, 13, 23)), // month only
            task(TaskStatus::Completed, at(2025, 6, 30, 23)), // neither
        ];
        let s = compute_dashboard_stats(&okrs, &tasks, 4, now);

        assert_eq!(s.active_okrs, 2);
        assert_eq!(s.completed_tasks, 3);
        assert_eq!(s.overall_progress, 58);
        assert_eq!(s.weekly_progress, PeriodProgress { completed: 1, total: 2, percentage: 50 });
        assert_eq!(s.monthly_progress, PeriodProgress { completed: 2, total: 3, percentage: 67 });
        assert_eq!(s.upcoming_reminders, 4);
    }

    #[test]
    fn test_monday_is_start_of_week() {
        let monday = at(2025, 7, 14, 8);
        assert_eq!(week_start(monday.date_naive()), at(2025, 7, 14, 0));
        let sunday = at(2025, 7, 20, 23);
        assert_eq!(week_start(sunday.date_naive()), at(2025, 7, 14, 0));
        assert_eq!(month_start(sunday.date_naive()), at(2025, 7, 1, 0));
    }

    #[test]
    fn test_serialized_field_names() {
        let s = compute_dashboard_stats(&[], &[], 2, at(2025, 7, 16, 12));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["upcomingReminders"], 2);
        assert!(v["weeklyProgress"].get("percentage").is_some());
        assert!(v.get("activeOkrs").is_some());
    }
}
