//! Prompt domain
//!
//! Templates for the prompts sent at every stage of every topology.

mod template;

pub use template::PromptTemplate;
