//! LLM client adapters.

mod openai;

pub use openai::{OpenAiCompatibleClient, OpenAiConfig};
