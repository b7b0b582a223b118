use super::generate::generate_recipe;
use dockhand_build::BuildRunner;
use dockhand_core::{DockhandConfig, RECIPE_FILE_NAME};
use std::path::Path;

/// Generate the recipe when needed, then build.
pub async fn build(
    path: &Path,
    tag: Option<&str>,
    regenerate: bool,
    max_turns: Option<u32>,
    quiet: bool,
) -> anyhow::Result<()> {
    let root = super::project_root(path)?;
    let config = DockhandConfig::load(&root)?;
    let recipe = root.join(RECIPE_FILE_NAME);

    if regenerate || !recipe.exists() {
        if !quiet {
            println!("Generating {RECIPE_FILE_NAME}...");
        }
        generate_recipe(&root, max_turns, false).await?;
    } else if !quiet {
        println!("Using existing {}", recipe.display());
    }

    let runner = BuildRunner::new(&root, &config.build);
    let result = if quiet {
        runner.build(tag).await
    } else {
        println!("Building image...");
        runner.build_streaming(tag, |line| println!("{line}")).await
    };

    if !result.success {
        anyhow::bail!(
            "{}",
            result.error.unwrap_or_else(|| "build failed".to_owned())
        );
    }

    if quiet {
        if let Some(name) = tag.map(str::to_owned).or(result.image_id) {
            println!("{name}");
        }
        return Ok(());
    }

    println!();
    match (tag, result.image_id.as_deref()) {
        (Some(tag), Some(id)) => println!("Built: {tag} ({id})"),
        (Some(tag), None) => println!("Built: {tag}"),
        (None, Some(id)) => println!("Built: {id}"),
        (None, None) => println!("Built (image id not reported)"),
    }
    Ok(())
}
