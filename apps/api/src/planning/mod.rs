// OKR planning: parse a goal statement, decompose it into micro-tasks, store both.
// All LLM calls go through llm_client; the heuristic planner covers model failures.

pub mod handlers;
pub mod heuristics;
pub mod micro_tasks;
pub mod parser;
pub mod plan;
pub mod prompts;
pub mod tasks;
