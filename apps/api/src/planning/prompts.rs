// Planning LLM prompt templates.
// All prompts for OKR parsing and micro-task decomposition are defined here.

pub const OKR_PARSE_SYSTEM: &str = "\
You are an expert OKR assistant. \
You turn free-form goal statements into a clean objective and measurable deliverables. \
You MUST respond with valid JSON only — no markdown fences, no explanations.";

pub const OKR_PARSE_PROMPT: &str = r#"Given the following user input:
"{okr_text}"

Extract and return a valid JSON object with:
1. "objective": A clean, clear statement of the goal.
2. "deliverables": A list (1-item final output) of measurable tasks required to complete the objective.
3. "deadline": A date (YYYY-MM-DD), quarter (Q1-Q4), or "Unspecified" if not mentioned.

Return ONLY the JSON object — nothing else, no code fences."#;

pub const MICRO_TASK_SYSTEM: &str = "\
You are an AI productivity assistant that plans realistic, evenly sized work. \
You MUST respond with a valid JSON array only — no markdown fences, no explanations.";

pub const MICRO_TASK_PROMPT: &str = r#"Break down the following OKR into no more than 10 micro-level tasks.

Each task must:
- Be small, specific, and actionable
- Be approximately equal in size and effort
- Be realistically scheduled:
  * Easy tasks (brainstorm, outline): 1-2 days
  * Medium tasks (draft): 2-3 days
  * Hard tasks (edit, coordinate): 3-4 days
- Not compress a large workload into one task
- Have a due date <= the overall OKR deadline: {okr_deadline}
- Be listed in ascending order of due date
- Use YYYY-MM-DD for due dates
- Include an `evidence_hint` selected only from:
  "text", "git-url", "youtube-url", "linkedIn-url", "screenshot", "other-url", "pdf"
- Include a `level`: "easy", "medium", or "hard"

Objective:
{objective}

Key Results:
{key_results}

Return EXACTLY this JSON:
[
  {
    "task": "string",
    "due": "YYYY-MM-DD",
    "evidence_hint": "text|git-url|youtube-url|linkedIn-url|screenshot|other-url|pdf",
    "level": "easy|medium|hard"
  }
]"#;
