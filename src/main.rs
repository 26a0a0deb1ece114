use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use story_plan_agent::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use story_plan_agent::{Config, SAMPLE_USER_STORY, StoryToPlanInvoker, build_prompt};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Turn a user story into a BDD test plan using a local Ollama model.
#[derive(Debug, Parser)]
#[command(name = "story-plan", version)]
struct Cli {
    /// User story text. Use `-` to read it from stdin.
    #[arg(env = "USER_STORY")]
    story: Option<String>,

    /// Read the user story from a file. Takes precedence over STORY.
    #[arg(long, value_name = "PATH")]
    story_file: Option<PathBuf>,

    /// Model to generate with.
    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the Ollama server.
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds for listing and generation.
    #[arg(long, env = "PLAN_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Fail instead of pulling a model the server does not have.
    #[arg(long)]
    no_pull: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_model(&self.model)
            .with_endpoint(&self.endpoint)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_pull_missing(!self.no_pull)
    }

    fn read_story(&self, mut stdin: impl Read) -> anyhow::Result<String> {
        if let Some(path) = &self.story_file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read story file {}", path.display()));
        }
        match self.story.as_deref() {
            Some("-") => {
                let mut buf = String::new();
                stdin
                    .read_to_string(&mut buf)
                    .context("failed to read story from stdin")?;
                Ok(buf)
            }
            Some(story) => Ok(story.to_string()),
            None => Ok(SAMPLE_USER_STORY.to_string()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // stdout carries only the plan
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let story = cli.read_story(std::io::stdin().lock())?;
    let prompt = build_prompt(&story)?;

    let invoker = StoryToPlanInvoker::new(cli.config()).context("invalid configuration")?;
    info!(story = %story.trim(), model = %invoker.config().model, "objective received");

    invoker
        .ensure_model()
        .await
        .with_context(|| format!("model '{}' is not usable", invoker.config().model))?;

    let plan = invoker
        .send(&prompt)
        .await
        .context("failed to generate test plan")?;

    info!("test plan generated");
    print!("{plan}");
    if !plan.ends_with('\n') {
        println!();
    }
    Ok(())
}
