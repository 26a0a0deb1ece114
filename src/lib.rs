pub mod config;
pub mod error;
pub mod invoker;
pub mod ollama;
pub mod prompt;

pub use config::Config;
pub use error::PlanError;
pub use invoker::{ModelStatus, StoryToPlanInvoker, generate_plan};
pub use ollama::{GenerateRequest, GenerateResponse, OllamaClient};
pub use prompt::{Prompt, SAMPLE_USER_STORY, build_prompt};
