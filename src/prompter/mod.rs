pub mod completion;
pub mod gemini;
pub mod languages;
pub mod prompts;
pub mod types;
pub mod validation;
