use dockhand_core::ProjectScanner;
use std::path::Path;

pub fn analyze(path: &Path) -> anyhow::Result<()> {
    let context = ProjectScanner::new(path).analyze()?;

    println!("Project: {}", context.root.display());
    println!("Total files: {}", context.total_files());

    println!();
    println!("Top extensions:");
    let top = context.top_extensions(super::TOP_EXTENSIONS);
    if top.is_empty() {
        println!("  (none)");
    }
    for (ext, count) in top {
        println!("  {ext}: {count}");
    }

    println!();
    println!("Config files found:");
    if context.config_files.is_empty() {
        println!("  (none)");
    }
    for name in context.config_files.keys() {
        println!("  {name}");
    }

    Ok(())
}
