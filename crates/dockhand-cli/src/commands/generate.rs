use dockhand_agent::prompt::opening_prompt;
use dockhand_agent::{AgentOutcome, ApiKey, DockerfileAgent, GeminiOracle, ToolSurface};
use dockhand_core::{DockhandConfig, ProjectScanner};
use std::path::{Path, PathBuf};

pub async fn generate(path: &Path, max_turns: Option<u32>, prime: bool) -> anyhow::Result<()> {
    let root = super::project_root(path)?;
    let recipe = generate_recipe(&root, max_turns, prime).await?;

    println!();
    println!("Dockerfile written: {}", recipe.display());
    Ok(())
}

/// Run the agent against `root` until it writes a recipe.
///
/// Finishing without a submission and running out of turns are both errors.
pub(crate) async fn generate_recipe(
    root: &Path,
    max_turns: Option<u32>,
    prime: bool,
) -> anyhow::Result<PathBuf> {
    let config = DockhandConfig::load(root)?;
    let api_key = ApiKey::load(&config.agent.api_key_env)?;
    let oracle = GeminiOracle::new(&config.agent, api_key)?;
    let surface = ToolSurface::new(root)?;

    let context = if prime {
        Some(ProjectScanner::new(root).analyze()?)
    } else {
        None
    };
    let prompt = opening_prompt(surface.root(), context.as_ref());

    let agent = DockerfileAgent::new(oracle)
        .with_max_turns(max_turns.unwrap_or(config.agent.max_turns));
    tracing::info!(
        model = %config.agent.model,
        max_turns = agent.max_turns(),
        prime,
        "generating Dockerfile"
    );

    match agent.run(&surface, prompt).await? {
        AgentOutcome::Submitted { path, turns } => {
            tracing::info!(turns, "Dockerfile submitted");
            Ok(path)
        }
        AgentOutcome::Finished { text, turns } => {
            anyhow::bail!(
                "agent stopped after {turns} turn(s) without writing a Dockerfile:\n{}",
                text.trim()
            )
        }
        AgentOutcome::Exhausted { turns } => {
            anyhow::bail!(
                "no Dockerfile after {turns} turn(s).\n\
                 Raise the limit with --max-turns or agent.max_turns in dockhand.toml."
            )
        }
    }
}
