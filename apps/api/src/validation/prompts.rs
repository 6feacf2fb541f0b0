// Validation LLM prompt templates.
// Every pass/fail check appends llm_client::prompts::VERDICT_FORMAT to its prompt.

pub const CHECK_SYSTEM: &str = "\
You are a strict but fair reviewer of evidence submitted against personal OKRs. \
Judge only what the submission actually shows; never assume work that is not evidenced. \
You MUST respond with valid JSON only — no markdown fences, no explanations.";

pub const SEMANTIC_DRIFT_PROMPT: &str = r#"Compare the intent of an OKR with the content a user submitted as evidence for it.

OKR OBJECTIVE:
{objective}

OKR DESCRIPTION:
{okr_description}

TASK:
{task_title}

SUBMISSION CONTENT:
{content}

Decide whether the submission stays on the OKR's intent or has drifted to a different topic or goal.
Pass it when the submission clearly serves the objective and the task. Fail it when it is off-topic,
generic filler, or only loosely related.

"#;

pub const MEASURABILITY_PROMPT: &str = r#"Analyze this submission for measurability, outcome orientation and specificity.

SUBMISSION CONTENT:
{content}

HEURISTIC FINDINGS (lines flagged as vague by a keyword scan; may be empty):
{flagged}

Pass it when the submission states concrete, checkable outcomes (numbers, dates, named artifacts,
links, counts). Fail it when it relies on vague claims such as "improved", "worked on" or
"significant" without saying how much or what.

"#;

pub const EVIDENCE_MATCH_PROMPT: &str = r#"Check whether a submission is the kind of evidence the task asked for.

TASK:
{task_title}

EXPECTED EVIDENCE TYPE:
{evidence_hint}

SUBMITTED EVIDENCE TYPE:
{submission_type}

SUBMISSION CONTENT:
{content}

Pass it when the submitted evidence is an acceptable proof for this task given the expected type
(for example, a GitHub repository for a coding task, a published article link for a writing task).
Fail it when the evidence type or content cannot prove the task was done.

"#;

pub const SUGGESTIONS_SYSTEM: &str = "\
You are a supportive coach helping someone meet their OKR. \
Give short, concrete, actionable advice in plain text. No preamble.";

pub const SUGGESTIONS_PROMPT: &str = r#"A submission for the task below did not pass validation.

OKR OBJECTIVE:
{objective}

TASK:
{task_title}

FAILED CHECKS:
{failures}

SUBMISSION CONTENT:
{content}

Provide 2-3 specific improvements that would make this submission pass. One per line, each starting with "- "."#;

pub const OUTCOME_ANALYSIS_SYSTEM: &str = "\
You are an OKR analyst reviewing a resume against five pillars. \
Write plain text with the section headings given. No preamble.";

pub const OUTCOME_ANALYSIS_PROMPT: &str = r#"Based on the following 5-pillar resume validation results, provide an outcome analysis.

OKR OBJECTIVE:
{objective}

ACHIEVEMENT SCORE: {score}% (each pillar present is worth 20%)
PILLARS PRESENT: {present}
PILLARS MISSING: {missing}

Use exactly these sections:

Overall Achievement Score:
- the score and a one-line qualitative assessment

Strengths Analysis:
- what the present pillars do well

Areas for Improvement:
- the gaps left by the missing pillars

Strategic Recommendations:
- steps to add the missing pillars and strengthen the existing ones

Impact Assessment:
- current impact and potential impact once the gaps are closed"#;
