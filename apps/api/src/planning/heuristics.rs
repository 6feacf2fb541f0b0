//! Rule-based micro-task planner, used when the LLM produces no plan.

use chrono::{Duration, NaiveDate};

use crate::models::{EvidenceKind, TaskLevel};
use crate::planning::micro_tasks::{MicroTask, MAX_MICRO_TASKS};

const DEFAULT_ARTICLE_COUNT: usize = 3;
const DEFAULT_PROJECT_COUNT: usize = 5;

/// Builds a plan from keywords in the OKR description, scheduled from `today`.
///
/// - writing goals ("article"/"blog"): a research task and a writing task per article
/// - building goals ("project"/"coding"): one build task per project, two weeks apart
/// - anything else: plan, execute, review
pub fn heuristic_micro_tasks(description: &str, today: NaiveDate) -> Vec<MicroTask> {
    let lower = description.to_lowercase();

    if lower.contains("article") || lower.contains("blog") {
        // Two tasks per article.
        let count = count_before(&lower, &["article", "blog"])
            .unwrap_or(DEFAULT_ARTICLE_COUNT)
            .clamp(1, MAX_MICRO_TASKS / 2);
        (1..=count)
            .flat_map(|i| {
                let week = today + Duration::weeks(i as i64);
                [
                    task(
                        format!("Research for article {i}"),
                        week - Duration::days(2),
                        EvidenceKind::Text,
                        TaskLevel::Easy,
                    ),
                    task(
                        format!("Write and publish article {i}"),
                        week,
                        EvidenceKind::OtherUrl,
                        TaskLevel::Medium,
                    ),
                ]
            })
            .collect()
    } else if lower.contains("project") || lower.contains("coding") {
        let count = count_before(&lower, &["project", "coding"])
            .unwrap_or(DEFAULT_PROJECT_COUNT)
            .clamp(1, MAX_MICRO_TASKS);
        (1..=count)
            .map(|i| {
                task(
                    format!("Build and deploy project {i}"),
                    today + Duration::weeks(2 * i as i64),
                    EvidenceKind::GitUrl,
                    TaskLevel::Hard,
                )
            })
            .collect()
    } else {
        vec![
            task(
                "Plan and research the objective".to_string(),
                today + Duration::weeks(1),
                EvidenceKind::Text,
                TaskLevel::Easy,
            ),
            task(
                "Execute the core deliverables".to_string(),
                today + Duration::weeks(3),
                EvidenceKind::Pdf,
                TaskLevel::Hard,
            ),
            task(
                "Review progress and finalize".to_string(),
                today + Duration::weeks(4),
                EvidenceKind::Text,
                TaskLevel::Medium,
            ),
        ]
    }
}

fn task(title: String, due: NaiveDate, evidence_hint: EvidenceKind, level: TaskLevel) -> MicroTask {
    MicroTask {
        task: title,
        due: due.format("%Y-%m-%d").to_string(),
        evidence_hint,
        level,
    }
}

/// Finds the first number directly followed (after optional whitespace) by
/// one of `nouns`, e.g. "3 articles" or "2blog posts".
fn count_before(text: &str, nouns: &[&str]) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let number = &text[start..i];
        let rest = text[i..].trim_start();
        if nouns.iter().any(|n| rest.starts_with(n)) {
            if let Ok(n) = number.parse() {
                return Some(n);
            }
        }
    }
    None
}
