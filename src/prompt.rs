use crate::error::PlanError;

/// Persona and output contract sent as the system prompt.
pub const SYSTEM_PROMPT: &str = "\
You are an elite QA Engineer and Business Analyst from a top-tier consulting firm.
Your task is to take a high-level user story and generate a comprehensive BDD test plan in Gherkin format.
The plan must be clear enough for a CEO to understand and detailed enough for a developer to implement.
CRITICALLY, you must identify not just the \"happy path\" but also negative paths and security-related edge cases.
Structure your output as a single Markdown block.
";

/// Story used when the caller does not supply one.
pub const SAMPLE_USER_STORY: &str =
    "As a user, I want to log in with my email and password so I can access my account.";

const STORY_HEADER: &str = "Write the BDD test plan for the following user story.\n\nUser story:\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub text: String,
}

/// Embed `story` verbatim in the instruction template.
pub fn build_prompt(story: &str) -> Result<Prompt, PlanError> {
    if story.trim().is_empty() {
        return Err(PlanError::EmptyStory);
    }

    Ok(Prompt {
        system: SYSTEM_PROMPT.to_string(),
        text: format!("{STORY_HEADER}{story}\n"),
    })
}
