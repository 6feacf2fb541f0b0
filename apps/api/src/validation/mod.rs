// Evidence validation: intake, keyword checks, LLM-judged checks, reports.
// A passing submission completes its task and moves the OKR's progress.

pub mod checks;
pub mod evidence;
pub mod handlers;
pub mod measurability;
pub mod pillars;
pub mod pipeline;
pub mod prompts;
pub mod report;
