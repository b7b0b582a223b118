use dockhand_core::ProjectContext;
use std::path::Path;

/// Standing instructions for the oracle.
pub const SYSTEM_PROMPT: &str = r#"You are an expert at creating Dockerfiles for containerizing applications.

You have tools to explore the project. Follow this process:
1. Call list_directory with path="." to see the project structure
2. Read key config files (package.json, requirements.txt, go.mod, Cargo.toml, etc.)
3. Check for existing Dockerfile or .dockerignore if needed
4. When you understand the project, call write_dockerfile with the complete Dockerfile

Rules for the Dockerfile:
- Only COPY files that actually exist in the project
- Use minimal base images (alpine variants when possible)
- Multi-stage builds ONLY for compiled languages (Go, Rust, Java, C/C++)
- For interpreted languages (Python, Node.js, Ruby): use single-stage builds
- Order layers for caching: copy dependency manifests first, install deps, then copy source
- Set a sensible WORKDIR (e.g., /app)
- Expose the correct port based on the project config
- Use CMD for the main process (avoid ENTRYPOINT unless strictly needed)
- Run as non-root user when practical
- Keep it simple and correct

Output ONLY the Dockerfile content when calling write_dockerfile, no markdown or explanations."#;

/// The task prompt that opens a conversation.
///
/// With a scanned `context`, the project summary is inlined so the oracle can
/// skip most of its exploration.
pub fn opening_prompt(project_root: &Path, context: Option<&ProjectContext>) -> String {
    let task = format!(
        "Generate a Dockerfile for the project at: {}",
        project_root.display()
    );
    match context {
        Some(ctx) => format!("{task}\n\nProject overview:\n\n{}", ctx.summary()),
        None => task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn opening_prompt_names_the_root() {
        let prompt = opening_prompt(Path::new("/srv/app"), None);
        assert_eq!(prompt, "Generate a Dockerfile for the project at: /srv/app");
    }

    #[test]
    fn opening_prompt_inlines_context_summary() {
        let ctx = ProjectContext {
            root: PathBuf::from("/srv/app"),
            file_tree: vec!["main.go".to_owned()],
            extensions: BTreeMap::from([(".go".to_owned(), 1)]),
            config_files: BTreeMap::new(),
        };
        let prompt = opening_prompt(Path::new("/srv/app"), Some(&ctx));
        assert!(prompt.starts_with("Generate a Dockerfile for the project at: /srv/app"));
        assert!(prompt.contains("Project overview:"));
        assert!(prompt.contains("  main.go"));
    }

    #[test]
    fn system_prompt_mentions_every_tool() {
        for name in ["list_directory", "read_file", "write_dockerfile"] {
            assert!(SYSTEM_PROMPT.contains(name), "{name}");
        }
    }
}
