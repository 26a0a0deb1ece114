//! Send one story to a local Ollama server and print the plan.
//!
//! cargo run --example generate -- "As a shopper, I want to save my cart"

use std::error::Error;

use story_plan_agent::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use story_plan_agent::{SAMPLE_USER_STORY, generate_plan};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let story = std::env::args()
        .nth(1)
        .unwrap_or_else(|| SAMPLE_USER_STORY.to_string());
    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    let endpoint = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

    println!("Sending story to {model} at {endpoint}: {story}");
    let plan = generate_plan(&story, &model, &endpoint).await?;
    println!("{plan}");

    Ok(())
}
