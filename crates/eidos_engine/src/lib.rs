pub mod engine;
pub mod llm;
pub mod respond;

pub use engine::{Engine, TurnOutcome};
pub use llm::{ChatCompletion, ChatMessage, CompletionParams, MockCompletion, Role};
pub use respond::GenerationGuidance;
