pub mod client;
pub mod prompt;

pub use client::{ChatStreamEvent, OpenAiModelClient};
pub use prompt::build_presentation_prompt;
