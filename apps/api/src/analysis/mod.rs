// Resume analysis: deterministic scoring, keyword and section analysis,
// plus the orchestrator that asks the generation service for a narrative.

pub mod handlers;
pub mod keywords;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod scoring;
pub mod sections;
