//! Five-pillar keyword check for resume-style submissions.

use serde::{Deserialize, Serialize};

use crate::models::{CheckKind, CheckResult};

pub struct Pillar {
    pub name: &'static str,
    /// What the pillar covers; shown to the user when it is missing.
    pub description: &'static str,
    /// Case-insensitive phrases that count as covering the pillar.
    pub variants: &'static [&'static str],
}

pub const PILLARS: &[Pillar] = &[
    Pillar {
        name: "Personal Background",
        description: "Who you are: a short profile or summary with contact details and where you are in your studies or career.",
        variants: &["personal background", "personal details", "personal information", "about me", "profile", "summary"],
    },
    Pillar {
        name: "Academic Background",
        description: "Your education: institution, degree, years and grades such as CGPA, plus relevant coursework.",
        variants: &["academic background", "academics", "education", "university", "college", "degree", "cgpa", "gpa"],
    },
    Pillar {
        name: "Projects",
        description: "Things you built: each project with its goal, your role, the tools used and a measurable result or link.",
        variants: &["project"],
    },
    Pillar {
        name: "Career Goals",
        description: "Where you are heading: the role or field you are targeting and what you want to achieve next.",
        variants: &["career goal", "career objective", "objective", "aspiration", "career plan"],
    },
    Pillar {
        name: "Co-curricular Activities",
        description: "What you do beyond coursework: clubs, volunteering, competitions and leadership roles.",
        variants: &["co-curricular", "cocurricular", "extracurricular", "extra-curricular", "activities", "volunteer", "clubs"],
    },
];

/// Each pillar present is worth this many points of the achievement score.
const POINTS_PER_PILLAR: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarGap {
    pub pillar: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarReport {
    pub present: Vec<String>,
    pub missing: Vec<String>,
    /// One entry per missing pillar, in pillar order.
    pub missing_descriptions: Vec<PillarGap>,
    /// 0..=100
    pub achievement_score: u32,
}

impl PillarReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn to_check(&self) -> CheckResult {
        let mut summary = format!(
            "Achievement score {}%. Present: {}. Missing: {}.",
            self.achievement_score,
            join_or_none(&self.present),
            join_or_none(&self.missing)
        );
        if self.is_complete() {
            return CheckResult::passed(CheckKind::Pillars, summary);
        }
        for gap in &self.missing_descriptions {
            summary.push_str(&format!("\n- {}: {}", gap.pillar, gap.description));
        }
        CheckResult::failed(CheckKind::Pillars, summary)
    }
}

pub fn check_pillars(text: &str) -> PillarReport {
    let lower = text.to_lowercase();
    let mut present = Vec::new();
    let mut missing = Vec::new();
    let mut missing_descriptions = Vec::new();
    for pillar in PILLARS {
        if pillar.variants.iter().any(|v| lower.contains(v)) {
            present.push(pillar.name.to_string());
        } else {
            missing.push(pillar.name.to_string());
            missing_descriptions.push(PillarGap {
                pillar: pillar.name.to_string(),
                description: pillar.description.to_string(),
            });
        }
    }
    let achievement_score = present.len() as u32 * POINTS_PER_PILLAR;
    PillarReport {
        present,
        missing,
        missing_descriptions,
        achievement_score,
    }
}

/// The pillar check only makes sense when the goal is a resume or CV.
pub fn pillars_apply(goal_texts: &[&str]) -> bool {
    goal_texts.iter().any(|t| {
        let lower = t.to_lowercase();
        lower.contains("resume")
            || lower.contains("résumé")
            || lower.contains("curriculum vitae")
            || lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|w| w == "cv")
    })
}

pub(crate) fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckStatus;

    const FULL_RESUME: &str = "\
        About Me: final-year student from Pune.\n\
        Education: B.Tech, CGPA 8.9\n\
        Projects: OKR tracker in Rust\n\
        Career Objective: backend engineer\n\
        Extracurricular: robotics club lead";

    #[test]
    fn test_full_resume_scores_100() {
        let r = check_pillars(FULL_RESUME);
        assert!(r.is_complete());
        assert_eq!(r.achievement_score, 100);
        assert!(r.missing_descriptions.is_empty());
        assert_eq!(r.to_check().status, CheckStatus::Passed);
    }

    #[test]
    fn test_missing_pillars_listed_in_order() {
        let r = check_pillars("EDUCATION\nMSc Physics\nPROJECTS\nPlasma sim");
        assert_eq!(r.present, vec!["Academic Background", "Projects"]);
        assert_eq!(
            r.missing,
            vec!["Personal Background", "Career Goals", "Co-curricular Activities"]
        );
        assert_eq!(r.achievement_score, 40);
        let check = r.to_check();
        assert_eq!(check.status, CheckStatus::Failed);
        assert!(check.summary.contains("Missing: Personal Background"));
        assert_eq!(r.missing_descriptions.len(), 3);
        assert_eq!(r.missing_descriptions[1].pillar, "Career Goals");
        assert!(check
            .summary
            .contains("- Career Goals: Where you are heading"));
    }

    #[test]
    fn test_nothing_found() {
        let r = check_pillars("lorem ipsum");
        assert_eq!(r.achievement_score, 0);
        assert!(r.to_check().summary.contains("Present: None"));
    }

    #[test]
    fn test_pillars_apply_to_resume_goals() {
        assert!(pillars_apply(&["Build a strong Resume", ""]));
        assert!(pillars_apply(&["Update my CV for placements"]));
        assert!(!pillars_apply(&["Publish 3 AI articles", "Write article 1"]));
        // "cv" must be a whole word
        assert!(!pillars_apply(&["Train a cvae model"]));
    }
}
